//! Wildcard resolution against PAD events.
//!
//! # Syntax
//! - `%` + code inserts a field of the now-playing event (`%t` → title)
//! - the same code in uppercase reads the next event (`%T`, `%WI`)
//! - `%%` inserts a literal `%`
//! - unknown codes are copied through untouched
//!
//! # Design Decisions
//! - Single left-to-right scan: substituted text is never rescanned
//! - Only substituted values are escaped, never the template text
//! - Absent events and absent fields resolve to the empty string

use crate::pad::escape::Escape;
use crate::pad::types::PadEvent;

/// Which of the two events an update carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadType {
    Now,
    Next,
}

/// A PAD event field addressable from a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadField {
    Artist,
    Label,
    Client,
    Agency,
    GroupName,
    Length,
    Description,
    CutNumber,
    Album,
    Composer,
    CartNumber,
    Outcue,
    Publisher,
    Conductor,
    SongId,
    Title,
    UserDefined,
    ExternalEventId,
    Year,
    Isrc,
    Isci,
    RecordingMbId,
    ReleaseMbId,
}

impl PadField {
    /// Look up a field by its lowercase wildcard code.
    pub fn from_code(code: &str) -> Option<Self> {
        let field = match code {
            "a" => PadField::Artist,
            "b" => PadField::Label,
            "c" => PadField::Client,
            "e" => PadField::Agency,
            "g" => PadField::GroupName,
            "h" => PadField::Length,
            "i" => PadField::Description,
            "j" => PadField::CutNumber,
            "l" => PadField::Album,
            "m" => PadField::Composer,
            "n" => PadField::CartNumber,
            "o" => PadField::Outcue,
            "p" => PadField::Publisher,
            "r" => PadField::Conductor,
            "s" => PadField::SongId,
            "t" => PadField::Title,
            "u" => PadField::UserDefined,
            "x" => PadField::ExternalEventId,
            "y" => PadField::Year,
            "wi" => PadField::Isrc,
            "wc" => PadField::Isci,
            "wm" => PadField::RecordingMbId,
            "wr" => PadField::ReleaseMbId,
            _ => return None,
        };
        Some(field)
    }

    /// Render this field of `event` as text. Zero numbers render empty.
    pub fn value(self, event: &PadEvent) -> String {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let number = |v: Option<u64>| match v {
            Some(n) if n != 0 => n.to_string(),
            _ => String::new(),
        };

        match self {
            PadField::Artist => text(&event.artist),
            PadField::Label => text(&event.label),
            PadField::Client => text(&event.client),
            PadField::Agency => text(&event.agency),
            PadField::GroupName => text(&event.group_name),
            PadField::Length => number(event.length),
            PadField::Description => text(&event.description),
            PadField::CutNumber => number(event.cut_number.map(u64::from)),
            PadField::Album => text(&event.album),
            PadField::Composer => text(&event.composer),
            PadField::CartNumber => number(event.cart_number.map(u64::from)),
            PadField::Outcue => text(&event.outcue),
            PadField::Publisher => text(&event.publisher),
            PadField::Conductor => text(&event.conductor),
            PadField::SongId => text(&event.song_id),
            PadField::Title => text(&event.title),
            PadField::UserDefined => text(&event.user_defined),
            PadField::ExternalEventId => text(&event.external_event_id),
            PadField::Year => number(event.year.map(u64::from)),
            PadField::Isrc => text(&event.isrc),
            PadField::Isci => text(&event.isci),
            PadField::RecordingMbId => text(&event.recording_mb_id),
            PadField::ReleaseMbId => text(&event.release_mb_id),
        }
    }
}

/// Parse the wildcard code at the start of `rest` (the text after `%`).
///
/// Returns the field, which event it reads, and how many bytes it consumed.
fn parse_wildcard(rest: &str) -> Option<(PadField, PadType, usize)> {
    // Two-letter codes win over their one-letter prefixes
    for len in [2, 1] {
        let Some(code) = rest.get(..len) else {
            continue;
        };
        let lower = code.to_ascii_lowercase();
        let pad_type = if code == lower {
            PadType::Now
        } else if code == code.to_ascii_uppercase() {
            PadType::Next
        } else {
            continue;
        };
        if let Some(field) = PadField::from_code(&lower) {
            return Some((field, pad_type, len));
        }
    }
    None
}

/// Substitute every wildcard in `template`.
pub fn resolve(
    template: &str,
    now: Option<&PadEvent>,
    next: Option<&PadEvent>,
    escape: Escape,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(stripped) = after.strip_prefix('%') {
            out.push('%');
            rest = stripped;
            continue;
        }

        match parse_wildcard(after) {
            Some((field, pad_type, len)) => {
                let event = match pad_type {
                    PadType::Now => now,
                    PadType::Next => next,
                };
                if let Some(event) = event {
                    out.push_str(&escape.apply(&field.value(event)));
                }
                rest = &after[len..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
