//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → Init logging → Load config → Connect receiver
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Receiver stops reading → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - An update being processed finishes before shutdown is observed
//! - A closed PAD connection is an error exit, a signal is a clean one

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
