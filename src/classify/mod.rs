//! Outbound data classification and context gating.
//!
//! Inbound scanning (the [`scanner`](crate::scanner) module) decides how
//! much to trust what comes IN. This module decides what is allowed to go
//! OUT: every piece of content gets a [`DataTier`], every destination is a
//! [`MessageContext`], and [`DataClassifier::filter_for_context`] redacts
//! anything whose tier the destination does not admit.

pub mod classifier;
pub mod context;
mod rules;

pub use classifier::{ClassificationResult, DataClassifier, DataHint, DataTier};
pub use context::MessageContext;
