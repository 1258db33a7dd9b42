//! Questions (assessment items) and their bodies

use serde::{Deserialize, Serialize};

use super::feedback::ModalFeedback;
use super::response::{OutcomeDeclaration, ResponseDeclaration};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Question {
    pub identifier: String,
    pub title: String,
    pub body: QuestionBody,
    pub responses: Vec<ResponseDeclaration>,
    pub outcomes: Vec<OutcomeDeclaration>,
    pub feedbacks: Vec<ModalFeedback>,
}

impl Question {
    /// Look up a response declaration by identifier
    pub fn response(&self, identifier: &str) -> Option<&ResponseDeclaration> {
        self.responses.iter().find(|r| r.identifier == identifier)
    }

    /// Look up an outcome declaration by identifier
    pub fn outcome(&self, identifier: &str) -> Option<&OutcomeDeclaration> {
        self.outcomes.iter().find(|o| o.identifier == identifier)
    }
}

/// Ordered content of a question
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct QuestionBody {
    pub blocks: Vec<ContentBlock>,
}

impl QuestionBody {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self { blocks }
    }

    /// Response identifiers referenced by interactions, in document order
    pub fn referenced_responses(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for block in &self.blocks {
            match block {
                ContentBlock::Prompt(_) => {}
                ContentBlock::Choice(choice) => ids.push(choice.response_identifier.as_str()),
                ContentBlock::ExtendedText(text) => ids.push(text.response_identifier.as_str()),
                ContentBlock::GapFill(gap_fill) => {
                    ids.extend(gap_fill.gaps().map(|gap| gap.response_identifier()));
                }
            }
        }
        ids
    }

    pub fn choice_blocks(&self) -> impl Iterator<Item = &ChoiceBlock> {
        self.blocks.iter().filter_map(|block| match block {
            ContentBlock::Choice(choice) => Some(choice),
            _ => None,
        })
    }

    pub fn gap_fill_blocks(&self) -> impl Iterator<Item = &GapFillBlock> {
        self.blocks.iter().filter_map(|block| match block {
            ContentBlock::GapFill(gap_fill) => Some(gap_fill),
            _ => None,
        })
    }

    pub fn extended_text_blocks(&self) -> impl Iterator<Item = &ExtendedTextBlock> {
        self.blocks.iter().filter_map(|block| match block {
            ContentBlock::ExtendedText(text) => Some(text),
            _ => None,
        })
    }
}

/// One block of a question body
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Prompt or stimulus text, verbatim markup
    Prompt(String),
    Choice(ChoiceBlock),
    GapFill(GapFillBlock),
    ExtendedText(ExtendedTextBlock),
}

/// Which QTI interaction produced a choice block
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceKind {
    Choice,
    Order,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChoiceBlock {
    pub response_identifier: String,
    pub kind: ChoiceKind,
    pub prompt: Option<String>,
    /// Choices in document order; identifiers are unique within the block
    pub choices: Vec<Choice>,
    pub shuffle: bool,
    pub max_choices: Option<u32>,
    pub min_choices: Option<u32>,
}

impl ChoiceBlock {
    pub fn choice(&self, identifier: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.identifier == identifier)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Choice {
    pub identifier: String,
    /// Choice label, verbatim markup
    pub text: String,
}

/// Text with inline gaps, e.g. a paragraph holding text-entry interactions
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GapFillBlock {
    pub segments: Vec<GapSegment>,
}

impl GapFillBlock {
    pub fn gaps(&self) -> impl Iterator<Item = &GapSegment> {
        self.segments
            .iter()
            .filter(|segment| !matches!(segment, GapSegment::Text(_)))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GapSegment {
    /// Verbatim markup between gaps
    Text(String),
    TextEntry {
        response_identifier: String,
        expected_length: Option<u32>,
    },
    InlineChoice {
        response_identifier: String,
        choices: Vec<Choice>,
    },
}

impl GapSegment {
    /// Response identifier of a gap; empty for text segments
    pub fn response_identifier(&self) -> &str {
        match self {
            GapSegment::Text(_) => "",
            GapSegment::TextEntry { response_identifier, .. }
            | GapSegment::InlineChoice { response_identifier, .. } => response_identifier,
        }
    }
}

/// Free-text (essay) response area
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtendedTextBlock {
    pub response_identifier: String,
    pub prompt: Option<String>,
    pub expected_lines: Option<u32>,
}
