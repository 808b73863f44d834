//! INI document parsing.
//!
//! # Dialect
//! - `[Section]` headers; section names are case-sensitive
//! - `key = value` or `key: value`; keys are case-insensitive
//! - Full-line `#` and `;` comments
//! - Indented lines continue the previous value
//! - `[DEFAULT]` supplies fallback values for every section
//!
//! # Design Decisions
//! - Section order is preserved (line mappings are read by index)
//! - Strict: duplicate sections and duplicate keys are errors
//! - Every error carries the 1-based line number it was found on

use thiserror::Error;

/// Name of the section holding fallback values.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Error type for INI parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IniError {
    /// A key/value pair appeared before the first section header.
    #[error("line {line}: option outside of any section")]
    MissingSectionHeader { line: usize },

    /// The same section header appeared twice.
    #[error("line {line}: duplicate section [{name}]")]
    DuplicateSection { line: usize, name: String },

    /// The same key appeared twice in one section.
    #[error("line {line}: duplicate option '{key}' in section [{section}]")]
    DuplicateOption {
        line: usize,
        section: String,
        key: String,
    },

    /// The line is not a header, option, comment or continuation.
    #[error("line {line}: cannot parse '{text}'")]
    Syntax { line: usize, text: String },
}

/// A named group of key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    /// Keys are stored lowercased.
    entries: Vec<(String, String)>,
}

impl Section {
    /// Create an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// The section name as written in its header.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a value by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Keys in file order, lowercased.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    fn value_mut(&mut self, key: &str) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn insert(&mut self, key: String, value: String) {
        self.entries.push((key, value));
    }
}

/// Where parsed options are currently being written.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    Defaults,
    Section(usize),
}

/// A parsed INI document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    defaults: Section,
    sections: Vec<Section>,
}

impl Profile {
    /// Parse an INI document.
    pub fn parse(text: &str) -> Result<Self, IniError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut profile = Profile {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        };
        let mut cursor: Option<Cursor> = None;
        let mut last_key: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Continuation of the previous value
            let indented = raw.starts_with(|c: char| c.is_whitespace());
            if indented {
                if let (Some(cur), Some(key)) = (cursor, last_key.as_deref()) {
                    if let Some(value) = profile.target_mut(cur).value_mut(key) {
                        value.push('\n');
                        value.push_str(trimmed);
                    }
                    continue;
                }
            }

            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                cursor = Some(profile.open_section(name, line)?);
                last_key = None;
                continue;
            }

            let Some(split) = trimmed.find(['=', ':']) else {
                return Err(IniError::Syntax {
                    line,
                    text: trimmed.to_string(),
                });
            };
            let key = trimmed[..split].trim().to_lowercase();
            let value = trimmed[split + 1..].trim().to_string();
            if key.is_empty() {
                return Err(IniError::Syntax {
                    line,
                    text: trimmed.to_string(),
                });
            }

            let cur = cursor.ok_or(IniError::MissingSectionHeader { line })?;
            let target = profile.target_mut(cur);
            if target.contains_key(&key) {
                return Err(IniError::DuplicateOption {
                    line,
                    section: target.name().to_string(),
                    key,
                });
            }
            target.insert(key.clone(), value);
            last_key = Some(key);
        }

        Ok(profile)
    }

    fn open_section(&mut self, name: &str, line: usize) -> Result<Cursor, IniError> {
        if name == DEFAULT_SECTION {
            return Ok(Cursor::Defaults);
        }
        if self.has_section(name) {
            return Err(IniError::DuplicateSection {
                line,
                name: name.to_string(),
            });
        }
        self.sections.push(Section::new(name));
        Ok(Cursor::Section(self.sections.len() - 1))
    }

    fn target_mut(&mut self, cursor: Cursor) -> &mut Section {
        match cursor {
            Cursor::Defaults => &mut self.defaults,
            Cursor::Section(idx) => &mut self.sections[idx],
        }
    }

    /// True if a section with this exact name exists. `DEFAULT` is never a section.
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Sections in file order, excluding `DEFAULT`.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Fallback values from the `DEFAULT` section.
    pub fn defaults(&self) -> &Section {
        &self.defaults
    }

    /// Look up `key` in `section`, falling back to `DEFAULT`.
    ///
    /// Returns `None` when the section itself does not exist.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let section = self.section(section)?;
        section.get(key).or_else(|| self.defaults.get(key))
    }

    /// Look up an integer value. Unparseable values read as absent.
    pub fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        self.get(section, key)?.trim().parse().ok()
    }
}
