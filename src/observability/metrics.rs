//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pad_updates_received_total` (counter): decoded PAD updates
//! - `pad_documents_rejected_total` (counter): documents that failed to decode
//! - `pad_updates_skipped_total` (counter): updates not posted, by reason
//! - `pad_posts_total` (counter): POST attempts, by outcome
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_update_received() {
    metrics::counter!("pad_updates_received_total").increment(1);
}

pub fn record_document_rejected() {
    metrics::counter!("pad_documents_rejected_total").increment(1);
}

/// `reason`: `unconfigured`, `filtered` or `invalid_config`.
pub fn record_update_skipped(reason: &'static str) {
    metrics::counter!("pad_updates_skipped_total", "reason" => reason).increment(1);
}

/// `outcome`: `response` or `transport_error`.
pub fn record_post(outcome: &'static str) {
    metrics::counter!("pad_posts_total", "outcome" => outcome).increment(1);
}
