//! Test structure: definition, parts and sections

use serde::{Deserialize, Serialize};

use super::feedback::ShowHide;
use super::question::Question;

/// Whether candidates may revisit earlier items
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    Linear,
    Nonlinear,
}

impl NavigationMode {
    pub const ALLOWED: &'static [&'static str] = &["linear", "nonlinear"];

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(NavigationMode::Linear),
            "nonlinear" => Some(NavigationMode::Nonlinear),
            _ => None,
        }
    }
}

/// When candidate responses are submitted
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionMode {
    Individual,
    Simultaneous,
}

impl SubmissionMode {
    pub const ALLOWED: &'static [&'static str] = &["individual", "simultaneous"];

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "individual" => Some(SubmissionMode::Individual),
            "simultaneous" => Some(SubmissionMode::Simultaneous),
            _ => None,
        }
    }
}

/// Root of a parsed assessment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TestDefinition {
    pub identifier: String,
    pub title: String,
    /// At least one part
    pub parts: Vec<TestPart>,
}

impl TestDefinition {
    /// All questions, depth-first in document order
    pub fn questions(&self) -> Vec<&Question> {
        let mut questions = Vec::new();
        for part in &self.parts {
            for section in &part.sections {
                section.collect_questions(&mut questions);
            }
        }
        questions
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TestPart {
    pub identifier: String,
    pub navigation_mode: NavigationMode,
    pub submission_mode: SubmissionMode,
    pub sections: Vec<TestSection>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TestSection {
    pub identifier: String,
    pub title: String,
    pub visibility: ShowHide,
    /// Questions and nested sections, in document order
    pub entries: Vec<SectionEntry>,
}

impl TestSection {
    /// Questions directly inside this section
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.entries.iter().filter_map(|entry| match entry {
            SectionEntry::Question(question) => Some(question),
            SectionEntry::Section(_) => None,
        })
    }

    /// Sections directly inside this section
    pub fn subsections(&self) -> impl Iterator<Item = &TestSection> {
        self.entries.iter().filter_map(|entry| match entry {
            SectionEntry::Section(section) => Some(section),
            SectionEntry::Question(_) => None,
        })
    }

    fn collect_questions<'a>(&'a self, out: &mut Vec<&'a Question>) {
        for entry in &self.entries {
            match entry {
                SectionEntry::Question(question) => out.push(question),
                SectionEntry::Section(section) => section.collect_questions(out),
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionEntry {
    Question(Question),
    Section(TestSection),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionBody;

    fn question(id: &str) -> Question {
        Question {
            identifier: id.to_string(),
            title: id.to_string(),
            body: QuestionBody::default(),
            responses: Vec::new(),
            outcomes: Vec::new(),
            feedbacks: Vec::new(),
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(NavigationMode::parse("NonLinear"), Some(NavigationMode::Nonlinear));
        assert_eq!(NavigationMode::parse("free"), None);
        assert_eq!(SubmissionMode::parse("simultaneous"), Some(SubmissionMode::Simultaneous));
    }

    #[test]
    fn test_questions_are_collected_depth_first() {
        let inner = TestSection {
            identifier: "S2".to_string(),
            title: "Inner".to_string(),
            visibility: ShowHide::Show,
            entries: vec![SectionEntry::Question(question("Q2"))],
        };
        let outer = TestSection {
            identifier: "S1".to_string(),
            title: "Outer".to_string(),
            visibility: ShowHide::Show,
            entries: vec![
                SectionEntry::Question(question("Q1")),
                SectionEntry::Section(inner),
                SectionEntry::Question(question("Q3")),
            ],
        };
        let test = TestDefinition {
            identifier: "T".to_string(),
            title: "Test".to_string(),
            parts: vec![TestPart {
                identifier: "P".to_string(),
                navigation_mode: NavigationMode::Linear,
                submission_mode: SubmissionMode::Individual,
                sections: vec![outer],
            }],
        };

        let ids: Vec<&str> = test.questions().iter().map(|q| q.identifier.as_str()).collect();
        assert_eq!(ids, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(test.parts[0].sections[0].questions().count(), 2);
        assert_eq!(test.parts[0].sections[0].subsections().count(), 1);
    }
}
