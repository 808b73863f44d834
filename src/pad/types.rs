//! PAD document definitions.
//!
//! The PAD source emits one JSON document per update:
//!
//! ```text
//! {
//!     "padUpdate": {
//!         "dateTime": "...", "hostName": "...", "machine": 1, "onairFlag": true,
//!         "service": { "name": "..." },
//!         "log": { "name": "..." },
//!         "now": { "title": "...", "artist": "...", ... },
//!         "next": null
//!     }
//! }
//! ```
//!
//! Missing members and explicit `null`s both read as absent.

use serde::{Deserialize, Serialize};

/// Top-level PAD document.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PadMessage {
    #[serde(rename = "padUpdate")]
    pub pad_update: PadData,
}

/// Contents of a single PAD update.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PadData {
    pub date_time: Option<String>,
    pub host_name: Option<String>,
    pub short_host_name: Option<String>,

    /// Log machine that produced the update (1 = Main, 2 = Aux 1, 3 = Aux 2, 101+ = virtual).
    pub machine: u32,

    pub onair_flag: bool,
    pub mode: Option<String>,
    pub service: Option<ServiceInfo>,
    pub log: Option<LogInfo>,

    /// Event now playing.
    pub now: Option<PadEvent>,

    /// Event up next.
    pub next: Option<PadEvent>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub program_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogInfo {
    pub name: Option<String>,
}

/// A now or next event: one cart on the log.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PadEvent {
    pub start_date_time: Option<String>,
    pub line_number: Option<i64>,
    pub line_id: Option<i64>,
    pub cart_number: Option<u32>,
    pub cart_type: Option<String>,
    pub cut_number: Option<u32>,

    /// Length in milliseconds.
    pub length: Option<u64>,

    pub year: Option<u32>,
    pub group_name: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub publisher: Option<String>,
    pub composer: Option<String>,
    pub album: Option<String>,
    pub label: Option<String>,
    pub client: Option<String>,
    pub agency: Option<String>,
    pub conductor: Option<String>,
    pub user_defined: Option<String>,
    pub song_id: Option<String>,
    pub outcue: Option<String>,
    pub description: Option<String>,
    pub isrc: Option<String>,
    pub isci: Option<String>,
    pub recording_mb_id: Option<String>,
    pub release_mb_id: Option<String>,
    pub external_event_id: Option<String>,
    pub external_data: Option<String>,
    pub external_annc_type: Option<String>,
}
