//! Update processor: one PAD update in, at most one encoder POST out.
//!
//! # Responsibilities
//! - Read the `[Glasscoder]` and `[LineN]` sections for every update
//! - Resolve each line's template with JSON escaping
//! - Honour the `[Glasscoder]` processing predicate
//! - POST the payload to `{UpdateUrl}/json_pad` and log the outcome
//!
//! # Design Decisions
//! - Fire-and-forget: no retries, no queueing
//! - Any HTTP response counts as delivered, whatever its status
//! - Only transport errors are failures; they are logged, never propagated

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use crate::config::schema::GLASSCODER_SECTION;
use crate::config::{GlasscoderConfig, SchemaError};
use crate::observability::metrics;
use crate::pad::{Escape, PadHandler, Severity, Update};
use crate::relay::payload::MetadataPayload;

/// Path appended to `UpdateUrl`.
pub const JSON_PAD_PATH: &str = "/json_pad";

/// What happened to an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No `[Glasscoder]` section; nothing done.
    Unconfigured,
    /// The processing predicate rejected the update.
    Filtered,
    /// The encoder answered with this status code.
    Delivered(u16),
    /// The configuration was incomplete; nothing sent.
    InvalidConfig,
    /// The request never got a response.
    TransportFailed,
}

/// Error type for a single processing attempt.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("invalid configuration: {0}")]
    Config(#[from] SchemaError),

    #[error("update failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Relays PAD updates to a Glasscoder encoder.
#[derive(Debug, Clone, Default)]
pub struct UpdateProcessor {
    client: reqwest::Client,
}

impl UpdateProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Process one update. Failures are logged through the update and
    /// reported in the outcome, never returned.
    pub async fn process(&self, update: &Update<'_>) -> ProcessOutcome {
        match self.try_process(update).await {
            Ok(outcome) => {
                if let Some(reason) = skip_reason(outcome) {
                    metrics::record_update_skipped(reason);
                }
                outcome
            }
            Err(e @ ProcessError::Config(_)) => {
                metrics::record_update_skipped("invalid_config");
                update.syslog(Severity::Warning, &e.to_string());
                ProcessOutcome::InvalidConfig
            }
            Err(e @ ProcessError::Transport(_)) => {
                metrics::record_post("transport_error");
                update.syslog(Severity::Warning, &e.to_string());
                ProcessOutcome::TransportFailed
            }
        }
    }

    async fn try_process(&self, update: &Update<'_>) -> Result<ProcessOutcome, ProcessError> {
        if !update.config().has_section(GLASSCODER_SECTION) {
            return Ok(ProcessOutcome::Unconfigured);
        }

        // Filtered updates stay silent, even with an incomplete configuration
        if !update.should_be_processed(GLASSCODER_SECTION) {
            tracing::debug!("Update filtered by [Glasscoder] settings");
            return Ok(ProcessOutcome::Filtered);
        }

        let Some(config) = GlasscoderConfig::from_profile(update.config())? else {
            return Ok(ProcessOutcome::Unconfigured);
        };
        let payload = build_payload(&config, update);

        let url = format!("{}{}", config.update_url, JSON_PAD_PATH);
        tracing::debug!(url = %url, fields = payload.len(), "Posting metadata");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_json())
            .send()
            .await?;

        let status = response.status().as_u16();
        metrics::record_post("response");
        update.syslog(
            Severity::Info,
            &format!("update sent to {url}, status code: {status}"),
        );
        Ok(ProcessOutcome::Delivered(status))
    }
}

impl PadHandler for UpdateProcessor {
    async fn on_update(&self, update: &Update<'_>) {
        self.process(update).await;
    }
}

/// Resolve every line mapping against the update, in line order.
pub fn build_payload(config: &GlasscoderConfig, update: &Update<'_>) -> MetadataPayload {
    let mut payload = MetadataPayload::new();
    for line in &config.lines {
        payload.push(
            line.key.clone(),
            update.resolve_pad_fields(&line.value, Escape::Json),
        );
    }
    payload
}

fn skip_reason(outcome: ProcessOutcome) -> Option<&'static str> {
    match outcome {
        ProcessOutcome::Unconfigured => Some("unconfigured"),
        ProcessOutcome::Filtered => Some("filtered"),
        _ => None,
    }
}
