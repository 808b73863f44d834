//! PAD (Program-Associated Data) subsystem.
//!
//! # Data Flow
//! ```text
//! PAD source (TCP)
//!     → receiver.rs (connect, frame `\r\n\r\n` documents)
//!     → types.rs (decode JSON into PadData)
//!     → update.rs (Update: config + fields + predicate + syslog)
//!     → PadHandler::on_update (one call per update, in order)
//!
//! Inside a handler:
//!     update.resolve_pad_fields(template, escape)
//!         → fields.rs (wildcard scan)
//!         → escape.rs (None / Xml / Url / Json)
//! ```

pub mod escape;
pub mod fields;
pub mod log;
pub mod receiver;
pub mod types;
pub mod update;

pub use escape::Escape;
pub use fields::{PadField, PadType};
pub use log::{PadLog, Severity, TracingLog};
pub use receiver::{PadHandler, Receiver, ReceiverError};
pub use types::{PadData, PadEvent, PadMessage};
pub use update::Update;
