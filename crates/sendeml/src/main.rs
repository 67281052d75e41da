//! `SendEML` - send `.eml` files to an SMTP server
//!
//! Each argument names a JSON settings file describing one batch. Batches
//! run one after another; a failing batch is reported and the next one runs.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;

use std::path::Path;

use sendeml_core::{BatchReport, Settings, send_batch};
use sendeml_smtp::SessionConfig;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Action;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sendeml=info,sendeml_core=info,sendeml_smtp=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_level(false),
        )
        .init();

    let mut args = std::env::args();
    let program = args
        .next()
        .as_deref()
        .and_then(|arg| Path::new(arg).file_name()?.to_str().map(str::to_string))
        .unwrap_or_else(|| "sendeml".to_string());
    let args: Vec<String> = args.collect();

    match cli::parse_args(&args) {
        Action::Usage => match cli::usage(&program) {
            Ok(text) => println!("{text}"),
            Err(e) => error!("Failed to render settings sample: {e}"),
        },
        Action::Version => println!("{}", cli::version()),
        Action::Send(json_files) => {
            let config = SessionConfig::default();
            for json_file in json_files {
                process_json_file(json_file, &config).await;
            }
        }
    }
}

async fn process_json_file(json_file: &str, config: &SessionConfig) {
    match run_batch(json_file, config).await {
        Ok(report) => debug!(
            "{json_file}: {} sent, {} skipped, {} failed",
            report.sent.len(),
            report.skipped.len(),
            report.failed.len()
        ),
        Err(e) => error!("{json_file}: {e}"),
    }
}

async fn run_batch(json_file: &str, config: &SessionConfig) -> sendeml_core::Result<BatchReport> {
    let settings = Settings::load(json_file).await?;
    send_batch(&settings, config).await
}
