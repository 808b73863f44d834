//! A single PAD update as seen by a handler.

use std::fmt;

use crate::config::Profile;
use crate::pad::escape::Escape;
use crate::pad::fields::{self, PadType};
use crate::pad::log::{PadLog, Severity};
use crate::pad::types::{PadData, PadEvent};

/// Section key selecting which "null" updates a section accepts.
pub const PROCESS_NULL_UPDATES_KEY: &str = "ProcessNullUpdates";

/// One PAD update, valid for the duration of a single handler call.
///
/// Borrows the configuration and log sink owned by the receiver.
pub struct Update<'a> {
    data: PadData,
    config: &'a Profile,
    log: &'a dyn PadLog,
}

impl<'a> Update<'a> {
    pub fn new(data: PadData, config: &'a Profile, log: &'a dyn PadLog) -> Self {
        Self { data, config, log }
    }

    /// The configuration the receiver was started with.
    pub fn config(&self) -> &'a Profile {
        self.config
    }

    /// Raw update contents.
    pub fn data(&self) -> &PadData {
        &self.data
    }

    pub fn date_time(&self) -> Option<&str> {
        self.data.date_time.as_deref()
    }

    pub fn host_name(&self) -> Option<&str> {
        self.data.host_name.as_deref()
    }

    pub fn short_host_name(&self) -> Option<&str> {
        self.data.short_host_name.as_deref()
    }

    /// Log machine number.
    pub fn machine(&self) -> u32 {
        self.data.machine
    }

    pub fn onair_flag(&self) -> bool {
        self.data.onair_flag
    }

    pub fn mode(&self) -> Option<&str> {
        self.data.mode.as_deref()
    }

    pub fn service_name(&self) -> Option<&str> {
        self.data.service.as_ref()?.name.as_deref()
    }

    pub fn log_name(&self) -> Option<&str> {
        self.data.log.as_ref()?.name.as_deref()
    }

    pub fn event(&self, pad_type: PadType) -> Option<&PadEvent> {
        match pad_type {
            PadType::Now => self.data.now.as_ref(),
            PadType::Next => self.data.next.as_ref(),
        }
    }

    /// True if the update carries the given event.
    pub fn has_pad_type(&self, pad_type: PadType) -> bool {
        self.event(pad_type).is_some()
    }

    /// Substitute the wildcards in `template` with this update's fields.
    pub fn resolve_pad_fields(&self, template: &str, escape: Escape) -> String {
        fields::resolve(
            template,
            self.event(PadType::Now),
            self.event(PadType::Next),
            escape,
        )
    }

    /// Decide whether the handler configured by `section` should act on this update.
    ///
    /// Checks `ProcessNullUpdates` (0 = always, 1 = needs now, 2 = needs next,
    /// 3 = needs both) and then the per-log key for this update's machine
    /// (`MasterLog`, `Aux1Log`, `Aux2Log`, `VirtualLogN`): `Yes`, `No` or `Onair`.
    pub fn should_be_processed(&self, section: &str) -> bool {
        if !self.config.has_section(section) {
            return false;
        }

        let present = match self
            .config
            .get_int(section, PROCESS_NULL_UPDATES_KEY)
            .unwrap_or(0)
        {
            1 => self.has_pad_type(PadType::Now),
            2 => self.has_pad_type(PadType::Next),
            3 => self.has_pad_type(PadType::Now) && self.has_pad_type(PadType::Next),
            _ => true,
        };
        if !present {
            return false;
        }

        let Some(key) = log_selection_key(self.data.machine) else {
            return true;
        };
        match self.config.get(section, &key) {
            Some(value) if value.trim().eq_ignore_ascii_case("no") => false,
            Some(value) if value.trim().eq_ignore_ascii_case("onair") => self.onair_flag(),
            _ => true,
        }
    }

    /// Log a message through the receiver's sink.
    pub fn syslog(&self, severity: Severity, message: &str) {
        self.log.log(severity, message);
    }
}

impl fmt::Debug for Update<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("machine", &self.data.machine)
            .field("onair", &self.data.onair_flag)
            .field("now", &self.data.now.is_some())
            .field("next", &self.data.next.is_some())
            .finish()
    }
}

/// Configuration key that enables a section for a given log machine.
fn log_selection_key(machine: u32) -> Option<String> {
    match machine {
        1 => Some("MasterLog".to_string()),
        2 => Some("Aux1Log".to_string()),
        3 => Some("Aux2Log".to_string()),
        n if n >= 101 => Some(format!("VirtualLog{n}")),
        _ => None,
    }
}
