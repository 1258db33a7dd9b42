//! XML parsing layer for QTI documents
//!
//! Thin helpers around roxmltree: input preparation, attribute access with
//! schema-shaped errors, and verbatim markup extraction. Element names are
//! matched by local name so namespace prefixes do not matter.

use roxmltree::{Document, Node, ParsingOptions};

use super::errors::{ElementPath, ParseError};

// ============================================================================
// DOCUMENT
// ============================================================================

/// Strip a byte-order mark
pub fn prepare_input(xml: &str) -> &str {
    xml.strip_prefix('\u{feff}').unwrap_or(xml)
}

/// Parse prepared XML text into a roxmltree document
///
/// DOCTYPE declarations (including internal subsets) are accepted and ignored.
pub fn parse_xml(text: &str) -> Result<Document<'_>, ParseError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options)
        .map_err(|e| ParseError::MalformedDocument(format!("XML parse error: {}", e)))
}

// ============================================================================
// NAVIGATION
// ============================================================================

/// Element children of a node, in document order
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// Path of a child element, labelled with its identifier attribute if any
pub fn child_path(parent: &ElementPath, node: Node) -> ElementPath {
    parent.child(node.tag_name().name(), node.attribute("identifier"))
}

pub fn is_qti_element(node: Node) -> bool {
    node.is_element() && node.tag_name().name().starts_with("qti-")
}

/// Error for an element that is not allowed inside its container
pub fn unexpected_element(path: &ElementPath, container: &str) -> ParseError {
    let name = path
        .segments()
        .last()
        .map(String::as_str)
        .unwrap_or("element");
    ParseError::schema(path, format!("unexpected element {} inside {}", name, container))
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// Trimmed attribute value; empty values count as absent
pub fn optional_attr(node: Node, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn required_attr(node: Node, name: &str, path: &ElementPath) -> Result<String, ParseError> {
    optional_attr(node, name).ok_or_else(|| {
        ParseError::schema(path, format!("missing required attribute '{}'", name))
    })
}

/// Required attribute restricted to an enumeration
pub fn enum_attr<T>(
    node: Node,
    name: &str,
    path: &ElementPath,
    parse: fn(&str) -> Option<T>,
    allowed: &[&str],
) -> Result<T, ParseError> {
    let value = required_attr(node, name, path)?;
    parse(&value).ok_or_else(|| {
        ParseError::schema(
            path,
            format!(
                "attribute '{}' has unrecognized value '{}' (expected one of: {})",
                name,
                value,
                allowed.join(", ")
            ),
        )
    })
}

/// Parse a decimal number (scores, bounds)
pub fn parse_decimal(value: &str, path: &ElementPath, what: &str) -> Result<f64, ParseError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ParseError::schema(path, format!("{} '{}' is not a decimal number", what, value))
        })
}

pub fn optional_decimal_attr(
    node: Node,
    name: &str,
    path: &ElementPath,
) -> Result<Option<f64>, ParseError> {
    optional_attr(node, name)
        .map(|value| parse_decimal(&value, path, &format!("attribute '{}'", name)))
        .transpose()
}

pub fn optional_u32_attr(
    node: Node,
    name: &str,
    path: &ElementPath,
) -> Result<Option<u32>, ParseError> {
    optional_attr(node, name)
        .map(|value| {
            value.parse::<u32>().map_err(|_| {
                ParseError::schema(
                    path,
                    format!("attribute '{}' value '{}' is not a non-negative integer", name, value),
                )
            })
        })
        .transpose()
}

pub fn optional_bool_attr(
    node: Node,
    name: &str,
    path: &ElementPath,
) -> Result<Option<bool>, ParseError> {
    optional_attr(node, name)
        .map(|value| match value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ParseError::schema(
                path,
                format!("attribute '{}' value '{}' is not a boolean", name, value),
            )),
        })
        .transpose()
}

// ============================================================================
// TEXT AND MARKUP
// ============================================================================

/// Concatenated text of all descendant text nodes, trimmed
pub fn text_content(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Source text of the whole element, exactly as written
pub fn outer_markup(node: Node) -> String {
    node.document().input_text()[node.range()].to_string()
}

/// Source text between the start and end tag, trimmed
pub fn inner_markup(node: Node) -> String {
    let outer = &node.document().input_text()[node.range()];

    let Some(open_end) = start_tag_end(outer) else {
        return String::new();
    };
    if outer[..open_end].ends_with("/>") {
        return String::new();
    }

    match outer.rfind("</") {
        Some(close_start) if close_start >= open_end => outer[open_end..close_start].trim().to_string(),
        _ => String::new(),
    }
}

/// Byte offset just past the `>` closing the start tag (quote-aware)
fn start_tag_end(markup: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, ch) in markup.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '>') => return Some(idx + 1),
            (None, _) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_input_strips_bom_and_doctype() {
        let xml = "\u{feff}<?xml version=\"1.0\"?>\n<!DOCTYPE qti>\n<root/>";
        let prepared = prepare_input(xml);
        assert!(!prepared.contains("DOCTYPE"));
        assert!(prepared.starts_with("<?xml"));
        assert!(parse_xml(&prepared).is_ok());
    }

    #[test]
    fn test_malformed_input() {
        let err = parse_xml("<root><unclosed></root>").unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument(_)));
    }

    #[test]
    fn test_inner_markup_is_verbatim() {
        let xml = r#"<choice identifier="A" data-x="a>b">Use <b>bold</b> &amp; <i>italic</i></choice>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(
            inner_markup(doc.root_element()),
            "Use <b>bold</b> &amp; <i>italic</i>"
        );
    }

    #[test]
    fn test_inner_markup_of_empty_elements() {
        let doc = Document::parse("<r><a/><b></b></r>").unwrap();
        let children: Vec<_> = element_children(doc.root_element()).collect();
        assert_eq!(inner_markup(children[0]), "");
        assert_eq!(inner_markup(children[1]), "");
    }

    #[test]
    fn test_outer_markup() {
        let doc = Document::parse("<r><p class=\"x\">Hi <b>there</b></p></r>").unwrap();
        let p = element_children(doc.root_element()).next().unwrap();
        assert_eq!(outer_markup(p), "<p class=\"x\">Hi <b>there</b></p>");
    }

    #[test]
    fn test_attribute_helpers() {
        let doc = Document::parse(
            r#"<e mode=" Linear " empty="" n="3" flag="true" score="x1"/>"#,
        )
        .unwrap();
        let node = doc.root_element();
        let path = ElementPath::root("e", None);

        assert_eq!(optional_attr(node, "mode").as_deref(), Some("Linear"));
        assert_eq!(optional_attr(node, "empty"), None);
        assert!(required_attr(node, "empty", &path).is_err());
        assert_eq!(optional_u32_attr(node, "n", &path).unwrap(), Some(3));
        assert_eq!(optional_bool_attr(node, "flag", &path).unwrap(), Some(true));
        assert!(optional_decimal_attr(node, "score", &path).is_err());
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let doc = Document::parse("<v> A<b>B</b> </v>").unwrap();
        assert_eq!(text_content(doc.root_element()), "AB");
    }
}
