//! Glasscoder relay subsystem.
//!
//! # Data Flow
//! ```text
//! Update (from pad::Receiver)
//!     → processor.rs (config check, predicate, POST)
//!     → payload.rs ({"Metadata": {...}} in line order)
//!     → encoder: POST {UpdateUrl}/json_pad
//! ```

pub mod payload;
pub mod processor;

pub use payload::MetadataPayload;
pub use processor::{ProcessError, ProcessOutcome, UpdateProcessor, JSON_PAD_PATH};
