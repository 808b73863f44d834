//! Typed views over the relay configuration.
//!
//! The file itself is free-form INI; this module reads the sections the
//! relay cares about:
//!
//! ```text
//! [Glasscoder]
//! UpdateUrl=http://encoder:8080
//!
//! [Line1]
//! Key=title
//! Value=%t
//!
//! [Line2]
//! Key=artist
//! Value=%a
//! ```

use thiserror::Error;

use crate::config::ini::Profile;

/// Section naming the target encoder.
pub const GLASSCODER_SECTION: &str = "Glasscoder";

pub const UPDATE_URL_KEY: &str = "UpdateUrl";
pub const LINE_KEY_KEY: &str = "Key";
pub const LINE_VALUE_KEY: &str = "Value";

/// Prefix of the numbered metadata mapping sections.
pub const LINE_SECTION_PREFIX: &str = "Line";

/// Error type for configuration that parses but is missing required values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("section [{section}] is missing {key}")]
    MissingKey { section: String, key: &'static str },
}

/// One `[LineN]` mapping: a JSON field name and the template that fills it.
///
/// Only the substituted field values are JSON-escaped. Literal text in
/// `value` is copied into the body as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMapping {
    pub key: String,
    pub value: String,
}

impl LineMapping {
    /// True if the template's literal text holds a `"` or `\`, which would
    /// make the request body invalid JSON.
    pub fn has_unescaped_literal(&self) -> bool {
        self.value.contains(['"', '\\'])
    }
}

/// The `[Glasscoder]` settings plus its line mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlasscoderConfig {
    /// Base URL of the encoder.
    pub update_url: String,

    /// Metadata mappings, in line order.
    pub lines: Vec<LineMapping>,
}

impl GlasscoderConfig {
    /// Read the relay settings from a profile.
    ///
    /// Returns `Ok(None)` when there is no `[Glasscoder]` section.
    pub fn from_profile(profile: &Profile) -> Result<Option<Self>, SchemaError> {
        if !profile.has_section(GLASSCODER_SECTION) {
            return Ok(None);
        }

        let update_url = required(profile, GLASSCODER_SECTION, UPDATE_URL_KEY)?;
        let lines = line_mappings(profile)?;

        Ok(Some(Self { update_url, lines }))
    }

    /// Lines whose templates cannot produce valid JSON.
    pub fn unescaped_literal_lines(&self) -> impl Iterator<Item = (usize, &LineMapping)> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.has_unescaped_literal())
            .map(|(i, line)| (i + 1, line))
    }
}

/// Read `[Line1]`, `[Line2]`, ... stopping at the first missing index.
pub fn line_mappings(profile: &Profile) -> Result<Vec<LineMapping>, SchemaError> {
    let mut lines = Vec::new();
    let mut n = 1;
    loop {
        let section = format!("{LINE_SECTION_PREFIX}{n}");
        if !profile.has_section(&section) {
            break;
        }
        lines.push(LineMapping {
            key: required(profile, &section, LINE_KEY_KEY)?,
            value: required(profile, &section, LINE_VALUE_KEY)?,
        });
        n += 1;
    }
    Ok(lines)
}

fn required(profile: &Profile, section: &str, key: &'static str) -> Result<String, SchemaError> {
    profile
        .get(section, key)
        .map(str::to_string)
        .ok_or_else(|| SchemaError::MissingKey {
            section: section.to_string(),
            key,
        })
}
