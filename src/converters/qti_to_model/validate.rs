//! Whole-tree checks run once the metamodel is complete
//!
//! - structural identifiers (test, parts, sections, items) are unique
//! - every body reference has exactly one response declaration
//! - identifier-typed correct values and map keys name existing choices
//! - every modal feedback refers to a declared outcome

use std::collections::HashMap;

use super::errors::{ElementPath, ParseError};
use crate::models::{
    BaseType, Choice, GapSegment, Question, ResponseDeclaration, SectionEntry, TestDefinition,
    TestSection,
};

pub fn validate_test(test: &TestDefinition) -> Result<(), ParseError> {
    let root = ElementPath::root("qti-assessment-test", Some(&test.identifier));
    let mut registry = IdentifierRegistry::default();
    registry.register(&test.identifier, &root)?;

    for part in &test.parts {
        let part_path = root.child("qti-test-part", Some(&part.identifier));
        registry.register(&part.identifier, &part_path)?;
        for section in &part.sections {
            validate_section(section, &part_path, &mut registry)?;
        }
    }
    Ok(())
}

fn validate_section(
    section: &TestSection,
    parent: &ElementPath,
    registry: &mut IdentifierRegistry,
) -> Result<(), ParseError> {
    let path = parent.child("qti-assessment-section", Some(&section.identifier));
    registry.register(&section.identifier, &path)?;

    for entry in &section.entries {
        match entry {
            SectionEntry::Section(child) => validate_section(child, &path, registry)?,
            SectionEntry::Question(question) => {
                let question_path = path.child("qti-assessment-item", Some(&question.identifier));
                registry.register(&question.identifier, &question_path)?;
                validate_question(question, &question_path)?;
            }
        }
    }
    Ok(())
}

/// Tracks where each structural identifier was first used
#[derive(Default)]
struct IdentifierRegistry {
    seen: HashMap<String, ElementPath>,
}

impl IdentifierRegistry {
    fn register(&mut self, identifier: &str, path: &ElementPath) -> Result<(), ParseError> {
        if let Some(first) = self.seen.get(identifier) {
            return Err(ParseError::schema(
                path,
                format!("duplicate identifier '{}' (already used at {})", identifier, first),
            ));
        }
        self.seen.insert(identifier.to_string(), path.clone());
        Ok(())
    }
}

// ============================================================================
// QUESTION LEVEL
// ============================================================================

pub fn validate_question(question: &Question, path: &ElementPath) -> Result<(), ParseError> {
    for (idx, decl) in question.responses.iter().enumerate() {
        if question.responses[..idx].iter().any(|d| d.identifier == decl.identifier) {
            return Err(ParseError::dangling(
                &path.child("qti-response-declaration", Some(&decl.identifier)),
                &decl.identifier,
                format!("response identifier '{}' is declared more than once", decl.identifier),
            ));
        }
    }

    for (idx, outcome) in question.outcomes.iter().enumerate() {
        if question.outcomes[..idx].iter().any(|o| o.identifier == outcome.identifier) {
            return Err(ParseError::schema(
                &path.child("qti-outcome-declaration", Some(&outcome.identifier)),
                format!("outcome identifier '{}' is declared more than once", outcome.identifier),
            ));
        }
    }

    let body_path = path.child("qti-item-body", None);
    for identifier in question.body.referenced_responses() {
        if question.response(identifier).is_none() {
            return Err(ParseError::dangling(
                &body_path,
                identifier,
                format!("item body references undeclared response identifier '{}'", identifier),
            ));
        }
    }

    for block in question.body.choice_blocks() {
        if let Some(decl) = question.response(&block.response_identifier) {
            check_choice_values(decl, &block.choices, path)?;
        }
    }
    for gap_fill in question.body.gap_fill_blocks() {
        for gap in gap_fill.gaps() {
            if let GapSegment::InlineChoice { response_identifier, choices } = gap {
                if let Some(decl) = question.response(response_identifier) {
                    check_choice_values(decl, choices, path)?;
                }
            }
        }
    }

    for feedback in &question.feedbacks {
        if question.outcome(&feedback.outcome_identifier).is_none() {
            return Err(ParseError::dangling(
                &path.child("qti-modal-feedback", Some(&feedback.identifier)),
                &feedback.outcome_identifier,
                format!(
                    "modal feedback references undeclared outcome identifier '{}'",
                    feedback.outcome_identifier
                ),
            ));
        }
    }

    Ok(())
}

/// Identifier-typed values bound to a choice set must name one of its choices
fn check_choice_values(
    decl: &ResponseDeclaration,
    choices: &[Choice],
    question_path: &ElementPath,
) -> Result<(), ParseError> {
    if decl.base_type != BaseType::Identifier {
        return Ok(());
    }

    let is_choice = |value: &str| choices.iter().any(|c| c.identifier == value);
    let decl_path = question_path.child("qti-response-declaration", Some(&decl.identifier));

    if let Some(value) = decl.correct_values.iter().find(|v| !is_choice(v.as_str())) {
        return Err(ParseError::dangling(
            &decl_path,
            value,
            format!("correct value '{}' does not name a choice of '{}'", value, decl.identifier),
        ));
    }

    if let Some(mapping) = &decl.mapping {
        if let Some(entry) = mapping.entries.iter().find(|e| !is_choice(e.key.as_str())) {
            return Err(ParseError::dangling(
                &decl_path,
                &entry.key,
                format!("map-key '{}' does not name a choice of '{}'", entry.key, decl.identifier),
            ));
        }
    }

    Ok(())
}
