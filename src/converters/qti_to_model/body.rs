//! Item body conversion
//!
//! The body mixes HTML content with QTI interactions. HTML is kept verbatim;
//! block interactions become choice / extended-text blocks, and HTML blocks
//! holding inline interactions become gap-fill blocks split around each gap.

use roxmltree::Node;

use super::errors::{ElementPath, ParseError};
use super::parser::{
    child_path, element_children, inner_markup, is_qti_element, optional_bool_attr,
    optional_u32_attr, outer_markup, required_attr, unexpected_element,
};
use crate::models::{
    Choice, ChoiceBlock, ChoiceKind, ContentBlock, ExtendedTextBlock, GapFillBlock, GapSegment,
    QuestionBody,
};

const BLOCK_INTERACTIONS: &[&str] = &[
    "qti-choice-interaction",
    "qti-order-interaction",
    "qti-extended-text-interaction",
];

const INLINE_INTERACTIONS: &[&str] = &[
    "qti-text-entry-interaction",
    "qti-inline-choice-interaction",
];

/// Build the body of an item from `qti-item-body`
pub fn build_question_body(node: Node, path: &ElementPath) -> Result<QuestionBody, ParseError> {
    let mut blocks = Vec::new();
    collect_blocks(node, path, &mut blocks)?;
    Ok(QuestionBody::new(blocks))
}

fn collect_blocks(
    container: Node,
    path: &ElementPath,
    blocks: &mut Vec<ContentBlock>,
) -> Result<(), ParseError> {
    for child in container.children() {
        if child.is_text() {
            let text = child.text().unwrap_or("").trim();
            if !text.is_empty() {
                blocks.push(ContentBlock::Prompt(
                    quick_xml::escape::escape(text).into_owned(),
                ));
            }
            continue;
        }
        if !child.is_element() {
            continue;
        }

        let child_path = child_path(path, child);
        let name = child.tag_name().name();

        if name == "qti-choice-interaction" {
            blocks.push(ContentBlock::Choice(build_choice_block(child, &child_path, ChoiceKind::Choice)?));
        } else if name == "qti-order-interaction" {
            blocks.push(ContentBlock::Choice(build_choice_block(child, &child_path, ChoiceKind::Order)?));
        } else if name == "qti-extended-text-interaction" {
            blocks.push(ContentBlock::ExtendedText(build_extended_text(child, &child_path)?));
        } else if is_qti_element(child) {
            return Err(ParseError::schema(
                &child_path,
                format!("unsupported interaction or element {} in item body", name),
            ));
        } else if contains_any(child, BLOCK_INTERACTIONS) {
            // HTML wrapper around block interactions: flatten it
            collect_blocks(child, &child_path, blocks)?;
        } else if contains_any(child, INLINE_INTERACTIONS) {
            blocks.push(ContentBlock::GapFill(build_gap_fill(child, &child_path)?));
        } else if let Some(stray) = child.descendants().find(|n| is_qti_element(*n)) {
            let stray_path = child_path.child(stray.tag_name().name(), stray.attribute("identifier"));
            return Err(ParseError::schema(
                &stray_path,
                format!("unsupported element {} in item body", stray.tag_name().name()),
            ));
        } else {
            blocks.push(ContentBlock::Prompt(outer_markup(child)));
        }
    }
    Ok(())
}

fn contains_any(node: Node, names: &[&str]) -> bool {
    node.descendants()
        .any(|n| n.is_element() && names.contains(&n.tag_name().name()))
}

// ============================================================================
// BLOCK INTERACTIONS
// ============================================================================

fn build_choice_block(
    node: Node,
    path: &ElementPath,
    kind: ChoiceKind,
) -> Result<ChoiceBlock, ParseError> {
    let container = node.tag_name().name();
    let response_identifier = required_attr(node, "response-identifier", path)?;
    let shuffle = optional_bool_attr(node, "shuffle", path)?.unwrap_or(false);
    let max_choices = optional_u32_attr(node, "max-choices", path)?;
    let min_choices = optional_u32_attr(node, "min-choices", path)?;

    let mut prompt = None;
    let mut choices: Vec<Choice> = Vec::new();

    for child in element_children(node) {
        let child_path = child_path(path, child);
        match child.tag_name().name() {
            "qti-prompt" => prompt = Some(inner_markup(child)),
            "qti-simple-choice" => {
                let choice = build_choice(child, &child_path, &choices)?;
                choices.push(choice);
            }
            _ => return Err(unexpected_element(&child_path, container)),
        }
    }

    if choices.is_empty() {
        return Err(ParseError::schema(
            path,
            format!("{} has no qti-simple-choice", container),
        ));
    }

    Ok(ChoiceBlock {
        response_identifier,
        kind,
        prompt,
        choices,
        shuffle,
        max_choices,
        min_choices,
    })
}

/// Build one choice, rejecting identifiers already used in the block
fn build_choice(node: Node, path: &ElementPath, siblings: &[Choice]) -> Result<Choice, ParseError> {
    let identifier = required_attr(node, "identifier", path)?;
    if siblings.iter().any(|c| c.identifier == identifier) {
        return Err(ParseError::schema(
            path,
            format!("duplicate choice identifier '{}'", identifier),
        ));
    }
    Ok(Choice {
        identifier,
        text: inner_markup(node),
    })
}

fn build_extended_text(node: Node, path: &ElementPath) -> Result<ExtendedTextBlock, ParseError> {
    let response_identifier = required_attr(node, "response-identifier", path)?;
    let expected_lines = optional_u32_attr(node, "expected-lines", path)?;

    let mut prompt = None;
    for child in element_children(node) {
        match child.tag_name().name() {
            "qti-prompt" => prompt = Some(inner_markup(child)),
            _ => {
                return Err(unexpected_element(
                    &child_path(path, child),
                    "qti-extended-text-interaction",
                ))
            }
        }
    }

    Ok(ExtendedTextBlock {
        response_identifier,
        prompt,
        expected_lines,
    })
}

// ============================================================================
// GAP FILL
// ============================================================================

/// Split an HTML block around its inline interactions
fn build_gap_fill(node: Node, path: &ElementPath) -> Result<GapFillBlock, ParseError> {
    let input = node.document().input_text();
    let block_range = node.range();
    let mut cursor = block_range.start;
    let mut segments = Vec::new();

    for descendant in node.descendants().filter(|n| is_qti_element(*n)) {
        let name = descendant.tag_name().name();
        let range = descendant.range();

        if range.start < cursor {
            // Inside a gap already consumed (e.g. qti-inline-choice)
            continue;
        }
        let gap_path = child_path(path, descendant);
        if !INLINE_INTERACTIONS.contains(&name) {
            return Err(ParseError::schema(
                &gap_path,
                format!("unsupported element {} in gap-fill text", name),
            ));
        }

        if range.start > cursor {
            segments.push(GapSegment::Text(input[cursor..range.start].to_string()));
        }
        segments.push(build_gap(descendant, &gap_path)?);
        cursor = range.end;
    }

    if block_range.end > cursor {
        segments.push(GapSegment::Text(input[cursor..block_range.end].to_string()));
    }

    Ok(GapFillBlock { segments })
}

fn build_gap(node: Node, path: &ElementPath) -> Result<GapSegment, ParseError> {
    let response_identifier = required_attr(node, "response-identifier", path)?;

    if node.tag_name().name() == "qti-text-entry-interaction" {
        return Ok(GapSegment::TextEntry {
            response_identifier,
            expected_length: optional_u32_attr(node, "expected-length", path)?,
        });
    }

    let mut choices: Vec<Choice> = Vec::new();
    for child in element_children(node) {
        let choice_path = child_path(path, child);
        match child.tag_name().name() {
            "qti-inline-choice" => {
                let choice = build_choice(child, &choice_path, &choices)?;
                choices.push(choice);
            }
            _ => return Err(unexpected_element(&choice_path, "qti-inline-choice-interaction")),
        }
    }

    if choices.is_empty() {
        return Err(ParseError::schema(
            path,
            "qti-inline-choice-interaction has no qti-inline-choice",
        ));
    }

    Ok(GapSegment::InlineChoice {
        response_identifier,
        choices,
    })
}
