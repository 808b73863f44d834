//! Escaping of substituted PAD field values.

use std::fmt::Write;

/// How substituted field values are escaped for the target format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Escape {
    #[default]
    None,
    /// XML/HTML entities.
    Xml,
    /// Percent-encoding; `/` and unreserved characters pass through.
    Url,
    /// JSON string contents, ready to sit between double quotes.
    Json,
}

impl Escape {
    /// Escape `value` for this mode.
    pub fn apply(self, value: &str) -> String {
        match self {
            Escape::None => value.to_string(),
            Escape::Xml => escape_xml(value),
            Escape::Url => escape_url(value),
            Escape::Json => escape_json(value),
        }
    }
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_url(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b'/') {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

fn escape_json(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_owned()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        assert_eq!(Escape::None.apply("a\"b<c>"), "a\"b<c>");
    }

    #[test]
    fn test_xml() {
        assert_eq!(
            Escape::Xml.apply(r#"Tom & Jerry's <"Show">"#),
            "Tom &amp; Jerry&apos;s &lt;&quot;Show&quot;&gt;"
        );
    }

    #[test]
    fn test_url() {
        assert_eq!(Escape::Url.apply("a b/c?d=é"), "a%20b/c%3Fd%3D%C3%A9");
        assert_eq!(Escape::Url.apply("A-z_0.9~"), "A-z_0.9~");
    }

    #[test]
    fn test_json_round_trips_through_parser() {
        let original = "He said \"hi\"\\ then\nleft\t\u{01}";
        let escaped = Escape::Json.apply(original);
        assert_eq!(escaped, "He said \\\"hi\\\"\\\\ then\\nleft\\t\\u0001");

        let decoded: String = serde_json::from_str(&format!("\"{escaped}\"")).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_json_control_characters() {
        assert_eq!(Escape::Json.apply("\u{08}\u{0c}\r"), "\\b\\f\\r");
        assert_eq!(Escape::Json.apply("del\u{7f}"), "del\u{7f}");
        assert_eq!(Escape::Json.apply(""), "");
    }

    #[test]
    fn test_json_keeps_unicode() {
        assert_eq!(Escape::Json.apply("Beyoncé ☃"), "Beyoncé ☃");
    }
}
