//! Type definitions for Moodle rendering
//!
//! - Public API types (RenderResult, RenderSettings, warnings, failures)
//! - Quiz-level mode pairs used by the degradation policy

use serde::{Deserialize, Serialize};

use super::errors::RenderError;
use crate::models::{NavigationMode, SubmissionMode};

// ============================================================================
// SETTINGS
// ============================================================================

/// Navigation/submission pair of a test part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuizModes {
    pub navigation: NavigationMode,
    pub submission: SubmissionMode,
}

impl QuizModes {
    pub fn new(navigation: NavigationMode, submission: SubmissionMode) -> Self {
        Self {
            navigation,
            submission,
        }
    }

    /// Moodle `navmethod`
    pub fn navmethod(&self) -> &'static str {
        match self.navigation {
            NavigationMode::Linear => "sequential",
            NavigationMode::Nonlinear => "free",
        }
    }

    /// Moodle `preferredbehaviour`
    pub fn preferred_behaviour(&self) -> &'static str {
        match self.submission {
            SubmissionMode::Individual => "immediatefeedback",
            SubmissionMode::Simultaneous => "deferredfeedback",
        }
    }
}

impl std::fmt::Display for QuizModes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}+{:?}", self.navigation, self.submission)
    }
}

/// Configuration options for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Mode pairs the target quiz cannot honor
    pub unsupported_mode_pairs: Vec<QuizModes>,

    /// Pair used in place of an unsupported one
    pub mode_fallback: QuizModes,

    /// Whether the target Moodle has the `ordering` question type installed
    pub ordering_supported: bool,

    /// Category under which the test's categories are created
    pub category_root: String,

    /// Moodle `answernumbering` for choice questions (abc, ABCD, 123, none, ...)
    pub answer_numbering: String,

    /// Penalty factor for each incorrect try
    pub penalty: f64,

    /// Replace curly quotes, long dashes and ellipses with ASCII forms
    pub normalize_typography: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            unsupported_mode_pairs: vec![QuizModes::new(
                NavigationMode::Nonlinear,
                SubmissionMode::Simultaneous,
            )],
            mode_fallback: QuizModes::new(NavigationMode::Linear, SubmissionMode::Individual),
            ordering_supported: false,
            category_root: "$course$/top".to_string(),
            answer_numbering: "abc".to_string(),
            penalty: 0.3333333,
            normalize_typography: false,
        }
    }
}

impl RenderSettings {
    /// Load settings from YAML; missing fields take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load settings from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Modes actually applied for a requested pair
    pub fn effective_modes(&self, requested: QuizModes) -> QuizModes {
        if self.unsupported_mode_pairs.contains(&requested) {
            self.mode_fallback
        } else {
            requested
        }
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Non-fatal issue found while rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RenderWarning {
    /// A test part's mode pair was replaced by the configured fallback
    ModeDowngraded {
        part_identifier: String,
        requested: QuizModes,
        applied: QuizModes,
    },

    /// A modal feedback could only be attached with looser conditions
    FeedbackApproximated {
        question_identifier: String,
        feedback_identifier: String,
        reason: String,
    },
}

/// A question left out of the output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionFailure {
    pub question_identifier: String,
    pub error: RenderError,
}

impl QuestionFailure {
    /// Human-readable reason for the failure
    pub fn reason(&self) -> String {
        match &self.error {
            RenderError::UnsupportedConstruct(message) | RenderError::TemplateError(message) => {
                message.clone()
            }
        }
    }
}

/// Result of rendering a test definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResult {
    /// Moodle quiz XML covering every successfully mapped question
    pub moodle_xml: String,

    /// Non-fatal issues, in document order
    pub warnings: Vec<RenderWarning>,

    /// Questions that could not be mapped
    pub failures: Vec<QuestionFailure>,

    /// Number of question blocks in `moodle_xml`
    pub rendered_questions: usize,
}

impl RenderResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Partial-success report (everything except the XML itself)
    pub fn report_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&serde_json::json!({
            "rendered_questions": self.rendered_questions,
            "failures": self.failures,
            "warnings": self.warnings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_degradation_policy() {
        let settings = RenderSettings::default();
        let requested = QuizModes::new(NavigationMode::Nonlinear, SubmissionMode::Simultaneous);
        let applied = settings.effective_modes(requested);

        assert_eq!(applied.navmethod(), "sequential");
        assert_eq!(applied.preferred_behaviour(), "immediatefeedback");

        let free = QuizModes::new(NavigationMode::Nonlinear, SubmissionMode::Individual);
        assert_eq!(settings.effective_modes(free), free);
        assert_eq!(free.navmethod(), "free");
    }

    #[test]
    fn test_settings_from_yaml_keep_defaults() {
        let settings = RenderSettings::from_yaml_str(
            "ordering_supported: true\nunsupported_mode_pairs: []\n",
        )
        .unwrap();
        assert!(settings.ordering_supported);
        assert!(settings.unsupported_mode_pairs.is_empty());
        assert_eq!(settings.category_root, "$course$/top");
        assert_eq!(settings.answer_numbering, "abc");
    }

    #[test]
    fn test_settings_from_json() {
        let settings = RenderSettings::from_json_str(
            r#"{"mode_fallback": {"navigation": "nonlinear", "submission": "individual"}, "penalty": 0.1}"#,
        )
        .unwrap();
        assert_eq!(settings.mode_fallback.navigation, NavigationMode::Nonlinear);
        assert_eq!(settings.penalty, 0.1);
        assert!(!settings.ordering_supported);
    }

    #[test]
    fn test_failure_reason() {
        let failure = QuestionFailure {
            question_identifier: "Q1".to_string(),
            error: RenderError::unsupported("ordering disabled"),
        };
        assert_eq!(failure.reason(), "ordering disabled");
    }
}
