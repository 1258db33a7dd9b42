//! Text preparation for the Moodle templates
//!
//! Templates substitute values unescaped, so every value goes through
//! [`xml_text`] before it reaches a template context.

use quick_xml::escape::{escape, partial_escape};
use unicode_normalization::UnicodeNormalization;

/// Escape text for an XML element or attribute value
pub fn xml_text(text: &str) -> String {
    escape(text).into_owned()
}

/// Escape plain text for inclusion in HTML markup (`<`, `>` and `&` only)
pub fn html_text(text: &str) -> String {
    partial_escape(text).into_owned()
}

const TYPOGRAPHY_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{FFFD}', ""),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2026}', "..."),
];

/// Compose to NFC, then replace typographic characters that older Moodle
/// installations mangle
pub fn normalize_typography(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.nfc() {
        match TYPOGRAPHY_REPLACEMENTS.iter().find(|(from, _)| *from == ch) {
            Some((_, to)) => out.push_str(to),
            None => out.push(ch),
        }
    }
    out
}

/// Escape an answer for a cloze `{...}` gap
///
/// `}`, `#`, `~`, `/`, `"` and `\` are operators inside a gap.
pub fn cloze_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '}' | '#' | '~' | '/' | '"') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Join non-empty HTML fragments, one per line
pub fn join_html<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter(|part| !part.as_ref().trim().is_empty())
        .map(|part| part.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Final form of a piece of content: optional typography pass, then XML escape
pub fn content(text: &str, normalize: bool) -> String {
    if normalize {
        xml_text(&normalize_typography(text))
    } else {
        xml_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_text() {
        assert_eq!(xml_text("<p>a & b</p>"), "&lt;p&gt;a &amp; b&lt;/p&gt;");
    }

    #[test]
    fn test_normalize_typography() {
        assert_eq!(
            normalize_typography("\u{201C}It\u{2019}s\u{201D} \u{2013} wait\u{2026}\u{FFFD}"),
            "\"It's\" - wait..."
        );
    }

    #[test]
    fn test_normalize_typography_composes_nfc() {
        // e + combining acute accent
        assert_eq!(normalize_typography("caf\u{0065}\u{0301}"), "caf\u{00E9}");
        assert_eq!(normalize_typography("\u{00C5}ngstr\u{00F6}m"), "\u{00C5}ngstr\u{00F6}m");
    }

    #[test]
    fn test_html_text_keeps_quotes() {
        assert_eq!(html_text("a<b & \"c\""), "a&lt;b &amp; \"c\"");
    }

    #[test]
    fn test_cloze_escape() {
        assert_eq!(cloze_escape("a/b}c#d~e\"f\\g"), "a\\/b\\}c\\#d\\~e\\\"f\\\\g");
        assert_eq!(cloze_escape("Paris"), "Paris");
    }

    #[test]
    fn test_join_html_skips_blank_parts() {
        assert_eq!(join_html(["<p>a</p>", "  ", "<p>b</p>"]), "<p>a</p>\n<p>b</p>");
    }
}
