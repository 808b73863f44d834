//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (INI)
//!     → loader.rs (read from disk)
//!     → ini.rs (parse into an ordered Profile)
//!     → Profile (immutable, owned by the entry point)
//!     → lent to every PAD update
//!     → schema.rs (typed Glasscoder / LineN view, read per update)
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup and never reloaded
//! - The Profile stays untyped so per-section predicates can read any key
//! - Missing required keys are reported when an update is processed, not at load

pub mod ini;
pub mod loader;
pub mod schema;

pub use ini::{IniError, Profile, Section};
pub use loader::{load_config, ConfigError};
pub use schema::{GlasscoderConfig, LineMapping, SchemaError};
