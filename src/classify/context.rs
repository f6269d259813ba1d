//! Conversation contexts and the tier gate matrix.

use serde::{Deserialize, Serialize};

use crate::classify::classifier::DataTier;

/// Where an outbound message is headed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageContext {
    /// Direct message with the bot's owner
    OwnerDirect,
    /// Direct message with anyone else
    OtherDirect,
    /// Multi-party group chat
    Group,
    /// Broadcast channel
    Channel,
    /// Outside the organization entirely
    External,
}

impl MessageContext {
    /// Whether data of the given tier may be sent in this context.
    ///
    /// CONFIDENTIAL reaches only the owner DM. INTERNAL additionally
    /// reaches groups and channels. PUBLIC goes anywhere.
    pub fn allows(self, tier: DataTier) -> bool {
        match tier {
            DataTier::Public => true,
            DataTier::Internal => matches!(
                self,
                MessageContext::OwnerDirect | MessageContext::Group | MessageContext::Channel
            ),
            DataTier::Confidential => matches!(self, MessageContext::OwnerDirect),
        }
    }

    /// Human-readable sharing policy for this context, suitable for
    /// inclusion in an agent's system prompt.
    pub fn policy_description(self) -> &'static str {
        match self {
            MessageContext::OwnerDirect => {
                "All data tiers allowed (owner DM).\n\
                 You may share confidential, internal, and public information."
            }
            MessageContext::OtherDirect => {
                "Public data only (non-owner DM).\n\
                 DO NOT share any internal or confidential information."
            }
            MessageContext::Group => {
                "Internal and public data only (group chat).\n\
                 DO NOT share: financial details, personal emails, CRM contacts, deal values.\n\
                 OK to share: strategic notes, system health, tool outputs."
            }
            MessageContext::Channel => {
                "Internal and public data only (channel).\n\
                 DO NOT share any confidential information."
            }
            MessageContext::External => {
                "Public data only (external context).\n\
                 DO NOT share any internal or confidential information.\n\
                 Redact all financial figures, personal data, and strategic information."
            }
        }
    }
}

impl std::fmt::Display for MessageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MessageContext::OwnerDirect => "owner_direct",
            MessageContext::OtherDirect => "other_direct",
            MessageContext::Group => "group",
            MessageContext::Channel => "channel",
            MessageContext::External => "external",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for MessageContext {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "owner_direct" => Ok(MessageContext::OwnerDirect),
            "other_direct" => Ok(MessageContext::OtherDirect),
            "group" => Ok(MessageContext::Group),
            "channel" => Ok(MessageContext::Channel),
            "external" => Ok(MessageContext::External),
            _ => Err(format!("unknown message context: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_matrix() {
        use DataTier::*;
        use MessageContext::*;

        let cases = [
            (OwnerDirect, Public, true),
            (OwnerDirect, Internal, true),
            (OwnerDirect, Confidential, true),
            (OtherDirect, Public, true),
            (OtherDirect, Internal, false),
            (OtherDirect, Confidential, false),
            (Group, Public, true),
            (Group, Internal, true),
            (Group, Confidential, false),
            (Channel, Public, true),
            (Channel, Internal, true),
            (Channel, Confidential, false),
            (External, Public, true),
            (External, Internal, false),
            (External, Confidential, false),
        ];
        for (context, tier, expected) in cases {
            assert_eq!(
                context.allows(tier),
                expected,
                "{:?} should {}allow {:?}",
                context,
                if expected { "" } else { "not " },
                tier
            );
        }
    }

    #[test]
    fn test_confidential_only_reaches_owner() {
        let allowed: Vec<_> = [
            MessageContext::OwnerDirect,
            MessageContext::OtherDirect,
            MessageContext::Group,
            MessageContext::Channel,
            MessageContext::External,
        ]
        .into_iter()
        .filter(|c| c.allows(DataTier::Confidential))
        .collect();
        assert_eq!(allowed, vec![MessageContext::OwnerDirect]);
    }

    #[test]
    fn test_policy_wording() {
        assert!(MessageContext::OwnerDirect
            .policy_description()
            .starts_with("All data tiers allowed (owner DM)."));
        assert!(MessageContext::Group
            .policy_description()
            .contains("DO NOT share: financial details, personal emails, CRM contacts, deal values."));
        assert!(MessageContext::External
            .policy_description()
            .contains("Redact all financial figures"));
        assert!(MessageContext::OtherDirect
            .policy_description()
            .contains("Public data only (non-owner DM)."));
    }

    #[test]
    fn test_context_round_trip() {
        for context in [
            MessageContext::OwnerDirect,
            MessageContext::OtherDirect,
            MessageContext::Group,
            MessageContext::Channel,
            MessageContext::External,
        ] {
            let parsed: MessageContext = context.to_string().parse().unwrap();
            assert_eq!(parsed, context);
        }
        assert!("smoke_signal".parse::<MessageContext>().is_err());
    }
}
