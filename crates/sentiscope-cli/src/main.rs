use std::io::Read;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sentiscope_classifier::{
    BackendKind, BackendRegistry, BackendSelection, ClassifierConfig, FailurePolicy,
    SentimentAggregator,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sentiscope-cli")]
#[command(about = "Classify text sentiment with every configured backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify TEXT (or stdin when omitted) and print the per-backend results.
    Classify {
        text: Option<String>,
        #[arg(long)]
        no_vader: bool,
        #[arg(long)]
        no_neural: bool,
        #[arg(long)]
        no_domain: bool,
        /// Abort on the first backend failure.
        #[arg(long)]
        fail_fast: bool,
        /// Print compact JSON on one line.
        #[arg(long)]
        compact: bool,
    },
    /// List the backends and whether each one is available.
    Backends,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = sentiscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let classifier_config = ClassifierConfig::from_app_config(&config);
    let registry = BackendRegistry::from_config(&classifier_config)?;

    match cli.command {
        Commands::Classify {
            text,
            no_vader,
            no_neural,
            no_domain,
            fail_fast,
            compact,
        } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            let selection = disable_backends(
                registry.available_selection(classifier_config.selection),
                no_vader,
                no_neural,
                no_domain,
            );
            let policy = if fail_fast {
                FailurePolicy::FailFast
            } else {
                classifier_config.policy
            };

            let mut aggregator = SentimentAggregator::new(selection, &registry)?.with_policy(policy);
            let backends: Vec<_> = aggregator.backends().map(|kind| kind.model_name()).collect();
            tracing::info!(?backends, ?policy, chars = text.chars().count(), "classifying text");
            let analysis = aggregator.classify(&text).await?;
            if !analysis.has_predictions() {
                anyhow::bail!("every sentiment backend failed");
            }

            let output = if compact {
                serde_json::to_string(analysis.outcomes())?
            } else {
                serde_json::to_string_pretty(analysis.outcomes())?
            };
            println!("{output}");
        }
        Commands::Backends => {
            for kind in BackendKind::ALL {
                let status = if registry.is_available(kind) {
                    "available"
                } else {
                    "unavailable"
                };
                let enabled = if classifier_config.selection.is_enabled(kind) {
                    "enabled"
                } else {
                    "disabled"
                };
                println!("{:<8} {status:<12} {enabled}", kind.model_name());
            }
        }
    }

    Ok(())
}

fn disable_backends(
    selection: BackendSelection,
    no_vader: bool,
    no_neural: bool,
    no_domain: bool,
) -> BackendSelection {
    selection
        .with(BackendKind::Vader, selection.vader && !no_vader)
        .with(BackendKind::Neural, selection.neural && !no_neural)
        .with(BackendKind::Domain, selection.domain && !no_domain)
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read text from stdin")?;
    Ok(text.trim_end_matches(['\n', '\r']).to_string())
}
