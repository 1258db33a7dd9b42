//! Moodle XML template rendering
//!
//! One fixed Mustache template per output block. Contexts hold fully
//! resolved, already escaped values: templates only use triple-brace
//! substitution and list iteration, never conditionals.
//!
//! ## Templates
//!
//! - `quiz.xml.mustache` - document frame around the rendered blocks
//! - `part-category.xml.mustache` - category opened by a test part, with quiz modes
//! - `section-category.xml.mustache` - category opened by a visible section
//! - one template per question type (`multichoice`, `ordering`, `cloze`,
//!   `essay`, `description`)

use serde::Serialize;

use super::errors::RenderError;

/// Template selection for Moodle output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodleTemplate {
    Quiz,
    PartCategory,
    SectionCategory,
    MultiChoice,
    Ordering,
    Cloze,
    Essay,
    Description,
}

// ============================================================================
// CONTEXTS
// ============================================================================

/// Document frame
#[derive(Debug, Clone, Serialize)]
pub struct QuizContext {
    pub blocks: Vec<BlockContext>,
}

/// One rendered block (category or question)
#[derive(Debug, Clone, Serialize)]
pub struct BlockContext {
    pub xml: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryContext {
    /// Category path, segments joined with `/`
    pub path: String,
    pub info: String,
    pub idnumber: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartCategoryContext {
    pub category: CategoryContext,
    pub navmethod: String,
    pub preferredbehaviour: String,
}

/// Fields shared by every question type
#[derive(Debug, Clone, Serialize)]
pub struct QuestionHeader {
    pub name: String,
    pub questiontext: String,
    pub generalfeedback: String,
    pub defaultgrade: String,
    pub penalty: String,
    pub idnumber: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedFeedbackContext {
    pub correct: String,
    pub partiallycorrect: String,
    pub incorrect: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerContext {
    pub fraction: String,
    pub text: String,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiChoiceContext {
    pub header: QuestionHeader,
    pub single: String,
    pub shuffleanswers: String,
    pub answernumbering: String,
    pub feedback: CombinedFeedbackContext,
    pub answers: Vec<AnswerContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderedItemContext {
    /// 1-based position in the correct order
    pub position: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderingContext {
    pub header: QuestionHeader,
    pub feedback: CombinedFeedbackContext,
    pub answers: Vec<OrderedItemContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClozeContext {
    pub header: QuestionHeader,
}

#[derive(Debug, Clone, Serialize)]
pub struct EssayContext {
    pub header: QuestionHeader,
    pub responsefieldlines: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescriptionContext {
    pub header: QuestionHeader,
}

// ============================================================================
// RENDERING
// ============================================================================

/// Get template content by type
pub fn get_template_content(template_type: MoodleTemplate) -> &'static str {
    match template_type {
        MoodleTemplate::Quiz => include_str!("templates/quiz.xml.mustache"),
        MoodleTemplate::PartCategory => include_str!("templates/part-category.xml.mustache"),
        MoodleTemplate::SectionCategory => include_str!("templates/section-category.xml.mustache"),
        MoodleTemplate::MultiChoice => include_str!("templates/multichoice.xml.mustache"),
        MoodleTemplate::Ordering => include_str!("templates/ordering.xml.mustache"),
        MoodleTemplate::Cloze => include_str!("templates/cloze.xml.mustache"),
        MoodleTemplate::Essay => include_str!("templates/essay.xml.mustache"),
        MoodleTemplate::Description => include_str!("templates/description.xml.mustache"),
    }
}

/// Render one Moodle block using a template
pub fn render_moodle<T: Serialize>(
    template_type: MoodleTemplate,
    context: &T,
) -> Result<String, RenderError> {
    let template_content = get_template_content(template_type);
    let template = mustache::compile_str(template_content)?;
    Ok(template.render_to_string(context)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str) -> QuestionHeader {
        QuestionHeader {
            name: name.to_string(),
            questiontext: "&lt;p&gt;Text&lt;/p&gt;".to_string(),
            generalfeedback: String::new(),
            defaultgrade: "1.0000000".to_string(),
            penalty: "0.3333333".to_string(),
            idnumber: "Q1".to_string(),
        }
    }

    #[test]
    fn test_all_templates_compile() {
        for template in [
            MoodleTemplate::Quiz,
            MoodleTemplate::PartCategory,
            MoodleTemplate::SectionCategory,
            MoodleTemplate::MultiChoice,
            MoodleTemplate::Ordering,
            MoodleTemplate::Cloze,
            MoodleTemplate::Essay,
            MoodleTemplate::Description,
        ] {
            assert!(mustache::compile_str(get_template_content(template)).is_ok());
        }
    }

    #[test]
    fn test_values_are_not_escaped_again() {
        let context = DescriptionContext {
            header: header("A &amp; B"),
        };
        let rendered = render_moodle(MoodleTemplate::Description, &context).unwrap();
        assert!(rendered.contains("<text>A &amp; B</text>"));
        assert!(rendered.contains("<text>&lt;p&gt;Text&lt;/p&gt;</text>"));
        assert!(rendered.contains("<question type=\"description\">"));
    }

    #[test]
    fn test_answers_are_iterated() {
        let context = MultiChoiceContext {
            header: header("Capital"),
            single: "true".to_string(),
            shuffleanswers: "false".to_string(),
            answernumbering: "abc".to_string(),
            feedback: CombinedFeedbackContext {
                correct: String::new(),
                partiallycorrect: String::new(),
                incorrect: String::new(),
            },
            answers: vec![
                AnswerContext {
                    fraction: "100".to_string(),
                    text: "Paris".to_string(),
                    feedback: "Yes".to_string(),
                },
                AnswerContext {
                    fraction: "0".to_string(),
                    text: "Lyon".to_string(),
                    feedback: String::new(),
                },
            ],
        };
        let rendered = render_moodle(MoodleTemplate::MultiChoice, &context).unwrap();
        assert!(rendered.contains("<answer fraction=\"100\" format=\"html\">"));
        assert!(rendered.contains("<answer fraction=\"0\" format=\"html\">"));
        assert!(rendered.contains("<text>Yes</text>"));
        assert!(rendered.contains("<single>true</single>"));
    }
}
