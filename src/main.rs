//! GlassCoder PAD relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                glasscoder-pad                 │
//!                    │                                               │
//!   PAD source       │  ┌──────────┐   ┌─────────┐   ┌───────────┐  │
//!   (TCP, JSON)  ────┼─▶│   pad    │──▶│ Update  │──▶│   relay   │──┼──▶ GlassCoder
//!                    │  │ receiver │   │         │   │ processor │  │    POST /json_pad
//!                    │  └──────────┘   └─────────┘   └───────────┘  │
//!                    │        ▲                            │         │
//!                    │  ┌─────┴────┐               ┌──────▼──────┐  │
//!                    │  │  config  │               │observability│  │
//!                    │  │  (INI)   │               │ logs+metrics│  │
//!                    │  └──────────┘               └─────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use glasscoder_pad::cli::Cli;
use glasscoder_pad::config::{load_config, GlasscoderConfig};
use glasscoder_pad::lifecycle::{signals, Shutdown};
use glasscoder_pad::observability::{logging, metrics};
use glasscoder_pad::pad::Receiver;
use glasscoder_pad::relay::UpdateProcessor;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_or_exit();
    logging::init_logging(&cli.log_level);

    tracing::info!("glasscoder-pad v{} starting", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = cli.metrics_address {
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(metrics_address = %addr, error = %e, "Failed to start metrics endpoint");
        }
    }

    let config = load_config(&cli.config)?;

    match GlasscoderConfig::from_profile(&config) {
        Ok(Some(glasscoder)) => {
            tracing::info!(
                config = %cli.config.display(),
                update_url = %glasscoder.update_url,
                lines = glasscoder.lines.len(),
                "Configuration loaded"
            );
            for (n, line) in glasscoder.unescaped_literal_lines() {
                tracing::warn!(
                    line = n,
                    key = %line.key,
                    template = %line.value,
                    "Template text contains '\"' or '\\' outside wildcards; posted JSON will be invalid"
                );
            }
        }
        Ok(None) => tracing::warn!(
            config = %cli.config.display(),
            "No [Glasscoder] section; updates will be ignored"
        ),
        Err(e) => tracing::warn!(
            config = %cli.config.display(),
            error = %e,
            "Configuration incomplete; updates will be rejected"
        ),
    }

    let shutdown = Shutdown::new();
    let _signal_task = signals::spawn_signal_listener(shutdown.clone());

    let receiver = Receiver::new(config);
    let processor = UpdateProcessor::new();

    receiver
        .start(&cli.hostname, cli.port, &processor, shutdown.subscribe())
        .await?;

    Ok(())
}
