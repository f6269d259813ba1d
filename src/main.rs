//! ClawGuard - Content trust boundary for chat-automation agents
//!
//! Command-line front end: scan external content for injection attempts,
//! classify outbound text into sensitivity tiers, and inspect the sharing
//! policy for a destination context.

use anyhow::Result;
use clap::{Parser, Subcommand};
use clawguard::{
    boundary::ContentSource,
    classify::{DataClassifier, DataHint, MessageContext},
    config::GuardConfig,
    scanner::{ContentScanner, ScanOptions},
};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clawguard")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Content trust boundary for chat-automation agents")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CLAWGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan external content and print the verdict
    Scan {
        /// File to scan; reads stdin when omitted
        file: Option<PathBuf>,

        /// Content source: email, webhook, dm, tool_output, document
        #[arg(short, long, default_value = "document")]
        source: String,

        /// Sender identity shown in the boundary attribution
        #[arg(long)]
        sender: Option<String>,

        /// Subject line shown in the boundary attribution
        #[arg(long)]
        subject: Option<String>,

        /// Quarantine threshold override (0-100)
        #[arg(short, long)]
        threshold: Option<u8>,

        /// Print the full verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify text into a data tier
    Classify {
        /// Text to classify; reads stdin when omitted
        text: Option<String>,

        /// Producer hint: crm, financial, email, health, config, tool_output, general
        #[arg(long)]
        hint: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Filter a message for a destination context
    Filter {
        /// Message to filter
        text: String,

        /// Destination: owner_direct, other_direct, group, channel, external
        #[arg(long)]
        context: String,
    },

    /// Print the sharing policy for a context
    Policy {
        /// Destination: owner_direct, other_direct, group, channel, external
        #[arg(long)]
        context: String,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("clawguard={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => GuardConfig::load(path)?,
        None => GuardConfig::default(),
    };

    match cli.command {
        Commands::Scan {
            file,
            source,
            sender,
            subject,
            threshold,
            json,
        } => {
            let quarantined = run_scan(config, file, &source, sender, subject, threshold, json)?;
            if quarantined {
                std::process::exit(1);
            }
        }
        Commands::Classify { text, hint, json } => {
            run_classify(text, hint.as_deref(), json)?;
        }
        Commands::Filter { text, context } => {
            run_filter(&text, &context)?;
        }
        Commands::Policy { context } => {
            run_policy(&context)?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

fn run_scan(
    config: GuardConfig,
    file: Option<PathBuf>,
    source: &str,
    sender: Option<String>,
    subject: Option<String>,
    threshold: Option<u8>,
    json: bool,
) -> Result<bool> {
    let source: ContentSource = source.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let content = read_input(file)?;

    let scanner = ContentScanner::with_config(config.scanner)?;
    let mut options = ScanOptions::new(source);
    options.sender = sender;
    options.subject = subject;
    options.quarantine_threshold = threshold;

    let verdict = scanner.scan_sync(&content, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        println!("risk score:  {}", verdict.risk_score);
        println!("confidence:  {}", verdict.confidence);
        println!("quarantined: {}", verdict.quarantined);
        if !verdict.findings.is_empty() {
            println!("findings:");
            for finding in &verdict.findings {
                println!(
                    "  [{}/{}] {}: {}",
                    finding.category, finding.severity, finding.rule, finding.description
                );
            }
        }
    }

    Ok(verdict.quarantined)
}

fn run_classify(text: Option<String>, hint: Option<&str>, json: bool) -> Result<()> {
    let content = match text {
        Some(text) => text,
        None => read_input(None)?,
    };
    let hint = hint
        .map(|h| h.parse::<DataHint>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let classifier = DataClassifier::new()?;
    let result = classifier.classify(&content, hint);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("tier:       {}", result.tier);
        println!("confidence: {}", result.confidence);
        if !result.detected_patterns.is_empty() {
            println!("patterns:   {}", result.detected_patterns.join(", "));
        }
    }

    Ok(())
}

fn run_filter(text: &str, context: &str) -> Result<()> {
    let context: MessageContext = context.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let classifier = DataClassifier::new()?;
    println!("{}", classifier.filter_for_context(text, context, None));
    Ok(())
}

fn run_policy(context: &str) -> Result<()> {
    let context: MessageContext = context.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    println!("{}", context.policy_description());
    Ok(())
}

fn show_config(config: Option<&GuardConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
