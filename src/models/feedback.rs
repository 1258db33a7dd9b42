//! Modal feedback and show/hide polarity

use serde::{Deserialize, Serialize};

/// Show/hide polarity, shared by feedback and section visibility
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShowHide {
    Show,
    Hide,
}

impl ShowHide {
    /// Parse a `show-hide` attribute value ("show" / "hide")
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "show" => Some(ShowHide::Show),
            "hide" => Some(ShowHide::Hide),
            _ => None,
        }
    }

    /// Parse a section `visible` attribute value ("true" / "false")
    pub fn from_visible(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(ShowHide::Show),
            "false" | "0" => Some(ShowHide::Hide),
            _ => None,
        }
    }

    pub fn is_shown(&self) -> bool {
        matches!(self, ShowHide::Show)
    }
}

/// Feedback shown (or hidden) when an outcome takes a given value
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModalFeedback {
    /// Outcome variable the feedback is conditioned on
    pub outcome_identifier: String,
    /// Outcome value that triggers the feedback
    pub identifier: String,
    pub show_hide: ShowHide,
    pub title: Option<String>,
    /// Feedback body, verbatim markup
    pub content: String,
}

impl ModalFeedback {
    /// True when the feedback is displayed on a match of its trigger value
    pub fn shows_on_match(&self) -> bool {
        self.show_hide.is_shown()
    }
}
