//! QTI element conversion logic
//!
//! Top-down structural walk: each builder reads and validates the attributes
//! of its element, then matches the children against the entity types allowed
//! at that level. Unknown children are schema violations; recognized QTI
//! elements the metamodel does not represent are skipped.

use roxmltree::Node;

use super::body::build_question_body;
use super::errors::{ElementPath, ParseError};
use super::parser::{
    child_path, element_children, enum_attr, inner_markup, optional_attr, optional_bool_attr,
    optional_decimal_attr, parse_decimal, parse_xml, prepare_input, required_attr, text_content,
    unexpected_element,
};
use super::resolver::ItemResolver;
use crate::models::{
    BaseType, Cardinality, MapEntry, ModalFeedback, NavigationMode, OutcomeDeclaration, Question,
    ResponseDeclaration, ScoreMapping, SectionEntry, ShowHide, SubmissionMode, TestDefinition,
    TestPart, TestSection,
};

/// Recognized test/part/section level elements without a metamodel counterpart
pub const TEST_LEVEL_SKIPPED: &[&str] = &[
    "qti-outcome-declaration",
    "qti-time-limits",
    "qti-outcome-processing",
    "qti-test-feedback",
    "qti-rubric-block",
    "qti-item-session-control",
    "qti-pre-condition",
    "qti-branch-rule",
    "qti-selection",
    "qti-ordering",
    "qti-stylesheet",
];

/// Recognized item level elements without a metamodel counterpart
pub const ITEM_LEVEL_SKIPPED: &[&str] = &[
    "qti-template-declaration",
    "qti-template-processing",
    "qti-response-processing",
    "qti-stylesheet",
    "qti-companion-materials-info",
];

/// State shared by the builders of one document
pub struct BuildContext<'r> {
    pub resolver: Option<&'r dyn ItemResolver>,
}

impl<'r> BuildContext<'r> {
    pub fn new(resolver: Option<&'r dyn ItemResolver>) -> Self {
        Self { resolver }
    }
}

fn skip(path: &ElementPath) {
    log::debug!("Skipping unmodelled element {}", path);
}

// ============================================================================
// TEST STRUCTURE
// ============================================================================

/// Build the root `qti-assessment-test`
pub fn build_test_definition(
    root: Node,
    ctx: &BuildContext,
) -> Result<TestDefinition, ParseError> {
    let tag = root.tag_name().name();
    let path = ElementPath::root(tag, root.attribute("identifier"));

    if tag != "qti-assessment-test" {
        return Err(ParseError::schema(
            &path,
            format!("expected root element qti-assessment-test, found {}", tag),
        ));
    }

    let identifier = required_attr(root, "identifier", &path)?;
    let title = required_attr(root, "title", &path)?;

    let mut parts = Vec::new();
    for child in element_children(root) {
        let child_path = child_path(&path, child);
        match child.tag_name().name() {
            "qti-test-part" => parts.push(build_test_part(child, &child_path, ctx)?),
            name if TEST_LEVEL_SKIPPED.contains(&name) => skip(&child_path),
            _ => return Err(unexpected_element(&child_path, "qti-assessment-test")),
        }
    }

    if parts.is_empty() {
        return Err(ParseError::schema(
            &path,
            "a test needs at least one qti-test-part",
        ));
    }

    Ok(TestDefinition {
        identifier,
        title,
        parts,
    })
}

fn build_test_part(
    node: Node,
    path: &ElementPath,
    ctx: &BuildContext,
) -> Result<TestPart, ParseError> {
    let identifier = required_attr(node, "identifier", path)?;
    let navigation_mode = enum_attr(
        node,
        "navigation-mode",
        path,
        NavigationMode::parse,
        NavigationMode::ALLOWED,
    )?;
    let submission_mode = enum_attr(
        node,
        "submission-mode",
        path,
        SubmissionMode::parse,
        SubmissionMode::ALLOWED,
    )?;

    let mut sections = Vec::new();
    for child in element_children(node) {
        let child_path = child_path(path, child);
        match child.tag_name().name() {
            "qti-assessment-section" => sections.push(build_section(child, &child_path, ctx)?),
            name if TEST_LEVEL_SKIPPED.contains(&name) => skip(&child_path),
            _ => return Err(unexpected_element(&child_path, "qti-test-part")),
        }
    }

    Ok(TestPart {
        identifier,
        navigation_mode,
        submission_mode,
        sections,
    })
}

fn build_section(
    node: Node,
    path: &ElementPath,
    ctx: &BuildContext,
) -> Result<TestSection, ParseError> {
    let identifier = required_attr(node, "identifier", path)?;
    let title = required_attr(node, "title", path)?;
    let visibility = match optional_attr(node, "visible") {
        None => ShowHide::Show,
        Some(value) => ShowHide::from_visible(&value).ok_or_else(|| {
            ParseError::schema(
                path,
                format!(
                    "attribute 'visible' has unrecognized value '{}' (expected one of: true, false)",
                    value
                ),
            )
        })?,
    };

    let mut entries = Vec::new();
    for child in element_children(node) {
        let child_path = child_path(path, child);
        match child.tag_name().name() {
            "qti-assessment-section" => {
                entries.push(SectionEntry::Section(build_section(child, &child_path, ctx)?))
            }
            "qti-assessment-item" => {
                entries.push(SectionEntry::Question(build_question(child, &child_path, None)?))
            }
            "qti-assessment-item-ref" => {
                entries.push(SectionEntry::Question(build_item_ref(child, &child_path, ctx)?))
            }
            name if TEST_LEVEL_SKIPPED.contains(&name) => skip(&child_path),
            _ => return Err(unexpected_element(&child_path, "qti-assessment-section")),
        }
    }

    Ok(TestSection {
        identifier,
        title,
        visibility,
        entries,
    })
}

/// Resolve an external item through the caller's resolver and build it
fn build_item_ref(
    node: Node,
    path: &ElementPath,
    ctx: &BuildContext,
) -> Result<Question, ParseError> {
    let identifier = required_attr(node, "identifier", path)?;
    let href = required_attr(node, "href", path)?;

    let resolver = ctx.resolver.ok_or_else(|| {
        ParseError::schema(
            path,
            format!("item reference '{}' cannot be resolved without an item resolver", href),
        )
    })?;
    let text = resolver.resolve(&href).ok_or_else(|| {
        ParseError::schema(path, format!("item reference '{}' could not be resolved", href))
    })?;

    let prepared = prepare_input(&text);
    let doc = parse_xml(&prepared).map_err(|e| match e {
        ParseError::MalformedDocument(message) => {
            ParseError::MalformedDocument(format!("{} (in referenced item '{}')", message, href))
        }
        other => other,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "qti-assessment-item" {
        return Err(ParseError::schema(
            path,
            format!("'{}' does not contain a qti-assessment-item", href),
        ));
    }

    log::debug!("Resolved item reference {} -> {}", identifier, href);
    build_question(root, path, Some(&identifier))
}

// ============================================================================
// ITEMS
// ============================================================================

/// Build a question from a `qti-assessment-item` element.
///
/// `identifier_override` is used for referenced items, which take the
/// identifier of the reference that pulled them in.
pub fn build_question(
    node: Node,
    path: &ElementPath,
    identifier_override: Option<&str>,
) -> Result<Question, ParseError> {
    let identifier = match identifier_override {
        Some(id) => id.to_string(),
        None => required_attr(node, "identifier", path)?,
    };
    let title = optional_attr(node, "title").unwrap_or_else(|| identifier.clone());

    let mut responses = Vec::new();
    let mut outcomes = Vec::new();
    let mut feedbacks = Vec::new();
    let mut body = None;

    for child in element_children(node) {
        let child_path = child_path(path, child);
        match child.tag_name().name() {
            "qti-response-declaration" => {
                responses.push(build_response_declaration(child, &child_path)?)
            }
            "qti-outcome-declaration" => {
                outcomes.push(build_outcome_declaration(child, &child_path)?)
            }
            "qti-item-body" => {
                if body.is_some() {
                    return Err(ParseError::schema(
                        &child_path,
                        "an item has exactly one qti-item-body",
                    ));
                }
                body = Some(build_question_body(child, &child_path)?);
            }
            "qti-modal-feedback" => feedbacks.push(build_modal_feedback(child, &child_path)?),
            name if ITEM_LEVEL_SKIPPED.contains(&name) => skip(&child_path),
            _ => return Err(unexpected_element(&child_path, "qti-assessment-item")),
        }
    }

    let body = body.ok_or_else(|| {
        ParseError::schema(path, "missing required element qti-item-body")
    })?;

    Ok(Question {
        identifier,
        title,
        body,
        responses,
        outcomes,
        feedbacks,
    })
}

// ============================================================================
// DECLARATIONS
// ============================================================================

fn build_response_declaration(
    node: Node,
    path: &ElementPath,
) -> Result<ResponseDeclaration, ParseError> {
    let identifier = required_attr(node, "identifier", path)?;
    let cardinality = enum_attr(node, "cardinality", path, Cardinality::parse, Cardinality::ALLOWED)?;
    let base_type = enum_attr(node, "base-type", path, BaseType::parse, BaseType::ALLOWED)?;

    let mut correct_values = Vec::new();
    let mut has_correct_response = false;
    let mut mapping = None;

    for child in element_children(node) {
        let child_path = child_path(path, child);
        match child.tag_name().name() {
            "qti-correct-response" => {
                has_correct_response = true;
                correct_values = build_values(child, &child_path)?;
            }
            "qti-mapping" => mapping = Some(build_mapping(child, &child_path, base_type)?),
            "qti-default-value" | "qti-area-mapping" => skip(&child_path),
            _ => return Err(unexpected_element(&child_path, "qti-response-declaration")),
        }
    }

    if has_correct_response && correct_values.is_empty() {
        return Err(ParseError::schema(
            path,
            "qti-correct-response holds no qti-value",
        ));
    }

    if let Some(value) = correct_values.iter().find(|v| !base_type.accepts(v)) {
        return Err(ParseError::schema(
            path,
            format!("correct value '{}' is not a valid {}", value, base_type.as_str()),
        ));
    }

    if cardinality == Cardinality::Single && correct_values.len() > 1 {
        return Err(ParseError::schema(
            path,
            format!(
                "single cardinality permits exactly one correct value, found {}",
                correct_values.len()
            ),
        ));
    }

    Ok(ResponseDeclaration {
        identifier,
        cardinality,
        base_type,
        correct_values,
        mapping,
    })
}

fn build_values(node: Node, path: &ElementPath) -> Result<Vec<String>, ParseError> {
    let mut values = Vec::new();
    for child in element_children(node) {
        match child.tag_name().name() {
            "qti-value" => values.push(text_content(child)),
            _ => return Err(unexpected_element(&child_path(path, child), "qti-correct-response")),
        }
    }
    Ok(values)
}

fn build_mapping(
    node: Node,
    path: &ElementPath,
    base_type: BaseType,
) -> Result<ScoreMapping, ParseError> {
    let default_value = optional_decimal_attr(node, "default-value", path)?.unwrap_or(0.0);
    let lower_bound = optional_decimal_attr(node, "lower-bound", path)?;
    let upper_bound = optional_decimal_attr(node, "upper-bound", path)?;

    let mut entries = Vec::new();
    for child in element_children(node) {
        let child_path = child_path(path, child);
        if child.tag_name().name() != "qti-map-entry" {
            return Err(unexpected_element(&child_path, "qti-mapping"));
        }

        let key = required_attr(child, "map-key", &child_path)?;
        if !base_type.accepts(&key) {
            return Err(ParseError::schema(
                &child_path,
                format!("map-key '{}' is not a valid {}", key, base_type.as_str()),
            ));
        }
        let raw_value = required_attr(child, "mapped-value", &child_path)?;
        let value = parse_decimal(&raw_value, &child_path, "mapped-value")?;
        let case_sensitive = optional_bool_attr(child, "case-sensitive", &child_path)?.unwrap_or(true);

        entries.push(MapEntry {
            key,
            value,
            case_sensitive,
        });
    }

    Ok(ScoreMapping {
        default_value,
        lower_bound,
        upper_bound,
        entries,
    })
}

fn build_outcome_declaration(
    node: Node,
    path: &ElementPath,
) -> Result<OutcomeDeclaration, ParseError> {
    Ok(OutcomeDeclaration {
        identifier: required_attr(node, "identifier", path)?,
        cardinality: enum_attr(node, "cardinality", path, Cardinality::parse, Cardinality::ALLOWED)?,
        base_type: optional_attr(node, "base-type"),
    })
}

fn build_modal_feedback(node: Node, path: &ElementPath) -> Result<ModalFeedback, ParseError> {
    let outcome_identifier = required_attr(node, "outcome-identifier", path)?;
    let identifier = required_attr(node, "identifier", path)?;

    // Generators emit both spellings
    let raw_show_hide = optional_attr(node, "show-hide")
        .or_else(|| optional_attr(node, "showHide"))
        .ok_or_else(|| ParseError::schema(path, "missing required attribute 'show-hide'"))?;
    let show_hide = ShowHide::parse(&raw_show_hide).ok_or_else(|| {
        ParseError::schema(
            path,
            format!(
                "attribute 'show-hide' has unrecognized value '{}' (expected one of: show, hide)",
                raw_show_hide
            ),
        )
    })?;

    let content = match element_children(node).find(|n| n.tag_name().name() == "qti-content-body") {
        Some(content_body) => inner_markup(content_body),
        None => inner_markup(node),
    };

    Ok(ModalFeedback {
        outcome_identifier,
        identifier,
        show_hide,
        title: optional_attr(node, "title"),
        content,
    })
}
