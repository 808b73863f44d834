//! GlassCoder PAD relay library.
//!
//! Receives Rivendell PAD updates over TCP and forwards the configured
//! now-playing fields to a GlassCoder encoder as `POST {UpdateUrl}/json_pad`.

pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod pad;
pub mod relay;

pub use config::Profile;
pub use lifecycle::Shutdown;
pub use pad::{Receiver, Update};
pub use relay::UpdateProcessor;
