//! Modal feedback routing
//!
//! QTI feedback is conditioned on an outcome value; Moodle only has fixed
//! slots (general, combined correct/partial/incorrect, per answer). Each
//! feedback is attached to the slots whose display condition matches its
//! trigger, falling back to general feedback with a warning when the target
//! question type has no matching slot.

use super::text::{join_html, xml_text};
use super::types::RenderWarning;
use crate::models::{Choice, ModalFeedback, Question};

/// Moodle combined-feedback slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinedSlot {
    Correct,
    PartiallyCorrect,
    Incorrect,
}

impl CombinedSlot {
    const ALL: [CombinedSlot; 3] = [
        CombinedSlot::Correct,
        CombinedSlot::PartiallyCorrect,
        CombinedSlot::Incorrect,
    ];

    fn from_trigger(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "correct" => Some(CombinedSlot::Correct),
            "partially_correct" | "partiallycorrect" => Some(CombinedSlot::PartiallyCorrect),
            "incorrect" => Some(CombinedSlot::Incorrect),
            _ => None,
        }
    }
}

/// Feedback slots offered by a Moodle question type
#[derive(Debug, Clone, Copy)]
pub struct FeedbackTargets<'a> {
    /// Choices of the question, used to recognize choice triggers
    pub choices: &'a [Choice],
    /// Whether answers carry their own feedback
    pub per_choice: bool,
    /// Whether the type has combined feedback
    pub combined: bool,
}

impl<'a> FeedbackTargets<'a> {
    /// General feedback only (cloze, essay, description)
    pub fn general_only() -> Self {
        Self {
            choices: &[],
            per_choice: false,
            combined: false,
        }
    }
}

/// Feedback HTML per slot, before XML escaping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutedFeedback {
    general: Vec<String>,
    correct: Vec<String>,
    partially_correct: Vec<String>,
    incorrect: Vec<String>,
    per_choice: Vec<Vec<String>>,
}

impl RoutedFeedback {
    fn new(choice_count: usize) -> Self {
        Self {
            per_choice: vec![Vec::new(); choice_count],
            ..Self::default()
        }
    }

    fn slot_mut(&mut self, slot: CombinedSlot) -> &mut Vec<String> {
        match slot {
            CombinedSlot::Correct => &mut self.correct,
            CombinedSlot::PartiallyCorrect => &mut self.partially_correct,
            CombinedSlot::Incorrect => &mut self.incorrect,
        }
    }

    pub fn general(&self) -> String {
        join_html(&self.general)
    }

    pub fn combined(&self, slot: CombinedSlot) -> String {
        match slot {
            CombinedSlot::Correct => join_html(&self.correct),
            CombinedSlot::PartiallyCorrect => join_html(&self.partially_correct),
            CombinedSlot::Incorrect => join_html(&self.incorrect),
        }
    }

    /// Feedback for the choice at `index`
    pub fn choice(&self, index: usize) -> String {
        self.per_choice
            .get(index)
            .map(|items| join_html(items))
            .unwrap_or_default()
    }
}

/// Route every modal feedback of `question` into the slots of `targets`
pub fn route_feedback(
    question: &Question,
    targets: FeedbackTargets,
) -> (RoutedFeedback, Vec<RenderWarning>) {
    let mut routed = RoutedFeedback::new(targets.choices.len());
    let mut warnings = Vec::new();

    for feedback in &question.feedbacks {
        let html = feedback_html(feedback);
        let shown = feedback.shows_on_match();
        let trigger = feedback.identifier.as_str();

        let choice_index = targets.choices.iter().position(|c| c.identifier == trigger);
        let slot = CombinedSlot::from_trigger(trigger);

        let approximation = match (choice_index, slot) {
            (Some(index), _) if targets.per_choice => {
                for (i, items) in routed.per_choice.iter_mut().enumerate() {
                    if (i == index) == shown {
                        items.push(html.clone());
                    }
                }
                None
            }
            (None, Some(slot)) if targets.combined => {
                for other in CombinedSlot::ALL {
                    if (other == slot) == shown {
                        routed.slot_mut(other).push(html.clone());
                    }
                }
                None
            }
            (Some(_), _) => {
                routed.general.push(html);
                Some("question type has no per-answer feedback; shown as general feedback")
            }
            (None, Some(_)) => {
                routed.general.push(html);
                Some("question type has no combined feedback; shown as general feedback")
            }
            (None, None) => {
                routed.general.push(html);
                (!shown).then_some("hide feedback shown unconditionally as general feedback")
            }
        };

        if let Some(reason) = approximation {
            log::warn!(
                "Question {}: feedback '{}' approximated: {}",
                question.identifier,
                trigger,
                reason
            );
            warnings.push(RenderWarning::FeedbackApproximated {
                question_identifier: question.identifier.clone(),
                feedback_identifier: feedback.identifier.clone(),
                reason: reason.to_string(),
            });
        }
    }

    (routed, warnings)
}

fn feedback_html(feedback: &ModalFeedback) -> String {
    match &feedback.title {
        Some(title) => format!("<p><strong>{}</strong></p>\n{}", xml_text(title), feedback.content),
        None => feedback.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionBody, ShowHide};

    fn question_with(feedbacks: Vec<(&str, ShowHide)>) -> Question {
        Question {
            identifier: "Q1".to_string(),
            title: "Q1".to_string(),
            body: QuestionBody::default(),
            responses: Vec::new(),
            outcomes: Vec::new(),
            feedbacks: feedbacks
                .into_iter()
                .map(|(trigger, show_hide)| ModalFeedback {
                    outcome_identifier: "FEEDBACK".to_string(),
                    identifier: trigger.to_string(),
                    show_hide,
                    title: None,
                    content: format!("<p>{}</p>", trigger),
                })
                .collect(),
        }
    }

    fn abc() -> Vec<Choice> {
        ["A", "B", "C"]
            .iter()
            .map(|id| Choice {
                identifier: id.to_string(),
                text: id.to_string(),
            })
            .collect()
    }

    fn choice_targets(choices: &[Choice]) -> FeedbackTargets<'_> {
        FeedbackTargets {
            choices,
            per_choice: true,
            combined: true,
        }
    }

    #[test]
    fn test_choice_feedback_show_and_hide() {
        let choices = abc();
        let question = question_with(vec![("A", ShowHide::Show), ("B", ShowHide::Hide)]);
        let (routed, warnings) = route_feedback(&question, choice_targets(&choices));

        assert!(warnings.is_empty());
        assert_eq!(routed.choice(0), "<p>A</p>\n<p>B</p>");
        assert_eq!(routed.choice(1), "");
        assert_eq!(routed.choice(2), "<p>B</p>");
        assert_eq!(routed.general(), "");
    }

    #[test]
    fn test_combined_feedback_hide_selects_complement() {
        let choices = abc();
        let question = question_with(vec![("correct", ShowHide::Show), ("incorrect", ShowHide::Hide)]);
        let (routed, _) = route_feedback(&question, choice_targets(&choices));

        assert_eq!(routed.combined(CombinedSlot::Correct), "<p>correct</p>\n<p>incorrect</p>");
        assert_eq!(routed.combined(CombinedSlot::PartiallyCorrect), "<p>incorrect</p>");
        assert_eq!(routed.combined(CombinedSlot::Incorrect), "");
    }

    #[test]
    fn test_other_triggers_become_general_feedback() {
        let choices = abc();
        let question = question_with(vec![("SEEN", ShowHide::Show)]);
        let (routed, warnings) = route_feedback(&question, choice_targets(&choices));
        assert_eq!(routed.general(), "<p>SEEN</p>");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_general_only_types_warn() {
        let question = question_with(vec![("correct", ShowHide::Show), ("X", ShowHide::Hide)]);
        let (routed, warnings) = route_feedback(&question, FeedbackTargets::general_only());

        assert_eq!(routed.general(), "<p>correct</p>\n<p>X</p>");
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            &warnings[1],
            RenderWarning::FeedbackApproximated { feedback_identifier, .. } if feedback_identifier == "X"
        ));
    }

    #[test]
    fn test_title_is_prepended() {
        let mut question = question_with(vec![("A", ShowHide::Show)]);
        question.feedbacks[0].title = Some("Well done & more".to_string());
        let (routed, _) = route_feedback(&question, FeedbackTargets::general_only());
        assert_eq!(
            routed.general(),
            "<p><strong>Well done &amp; more</strong></p>\n<p>A</p>"
        );
    }
}
