//! Score normalization
//!
//! QTI scores are absolute; Moodle answers carry a percentage of the
//! question's grade. Each choice score is divided by the maximum achievable
//! score (the denominator), which also becomes the question's default grade.
//! For multiple cardinality the maximum achievable score is the sum of the
//! positive correct scores, so correct fractions add up to 100 rather than the
//! best correct choice reaching 100 alone.

use super::errors::RenderError;
use crate::models::{Cardinality, Choice, ResponseDeclaration};

/// Normalized scoring of one choice set
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceScoring {
    /// Percent fraction per choice, in choice order, within [-100, 100]
    pub fractions: Vec<f64>,
    /// Maximum achievable raw score
    pub denominator: f64,
}

/// Compute per-choice fractions for a response bound to `choices`
pub fn choice_fractions(
    decl: &ResponseDeclaration,
    choices: &[Choice],
) -> Result<ChoiceScoring, RenderError> {
    let scores: Vec<f64> = choices.iter().map(|c| decl.score_of(&c.identifier)).collect();

    // Without a declared correct response every choice counts as creditable
    let creditable: Vec<f64> = choices
        .iter()
        .zip(&scores)
        .filter(|(choice, _)| !decl.has_correct_response() || decl.is_correct(&choice.identifier))
        .map(|(_, score)| *score)
        .collect();

    let mut denominator = match decl.cardinality {
        Cardinality::Multiple => creditable.iter().filter(|s| **s > 0.0).sum::<f64>(),
        _ => creditable.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    };
    if let Some(upper) = decl.mapping.as_ref().and_then(|m| m.upper_bound) {
        denominator = denominator.min(upper);
    }

    if denominator.is_nan() || denominator <= 0.0 {
        return Err(RenderError::unsupported(format!(
            "response '{}' has no positive achievable score",
            decl.identifier
        )));
    }

    // The mapping lower bound floors the score of any single selection
    let floor = decl
        .mapping
        .as_ref()
        .and_then(|m| m.lower_bound)
        .unwrap_or(f64::NEG_INFINITY);
    let fractions = scores
        .iter()
        .map(|score| (score.max(floor) / denominator * 100.0).clamp(-100.0, 100.0))
        .collect();

    Ok(ChoiceScoring {
        fractions,
        denominator,
    })
}

/// Format a percent fraction for an `answer fraction` attribute
pub fn format_fraction(fraction: f64) -> String {
    let rounded = (fraction * 100_000.0).round() / 100_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{:.5}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a grade or penalty the way Moodle exports them
pub fn format_grade(value: f64) -> String {
    format!("{:.7}", value)
}
