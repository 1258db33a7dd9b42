//! Metamodel to Moodle XML renderer
//!
//! Walks a parsed [`TestDefinition`] and produces a Moodle quiz XML document.
//!
//! # Overview
//!
//! - Each test part opens a category carrying its quiz modes
//!   (`navmethod`, `preferredbehaviour`), degraded per [`RenderSettings`]
//! - Each visible section opens a nested category; hidden sections add
//!   their questions to the enclosing one
//! - Each question is mapped independently: an unsupported question lands in
//!   the failure list while the rest of the document is still rendered
//!
//! # Basic Usage
//!
//! ```ignore
//! use qti_moodle::converters::model_to_moodle::{render, RenderSettings};
//!
//! let result = render(&test, &RenderSettings::default())?;
//! for failure in &result.failures {
//!     eprintln!("{}: {}", failure.question_identifier, failure.reason());
//! }
//! std::fs::write("quiz.xml", &result.moodle_xml)?;
//! ```

pub mod errors;
pub mod types;
pub mod text;
pub mod scoring;
pub mod feedback;
pub mod templates;
pub mod mapper;

pub use errors::RenderError;
pub use types::{QuestionFailure, QuizModes, RenderResult, RenderSettings, RenderWarning};

use crate::models::{Question, SectionEntry, TestDefinition, TestPart, TestSection};
use mapper::map_question;
use templates::{
    render_moodle, BlockContext, CategoryContext, MoodleTemplate, PartCategoryContext, QuizContext,
};
use text::{content, xml_text};

/// Render a test definition as Moodle quiz XML.
///
/// # Returns
///
/// * `Ok(RenderResult)` - XML for every mappable question plus failures and warnings
/// * `Err(RenderError)` - a document-level template failed (internal error)
pub fn render(doc: &TestDefinition, settings: &RenderSettings) -> Result<RenderResult, RenderError> {
    let mut ctx = RenderContext::new(doc, settings);
    for part in &doc.parts {
        ctx.render_part(part)?;
    }
    ctx.finish()
}

/// Escape a category path segment (`/` separates segments, `//` is a literal slash)
fn category_segment(name: &str) -> String {
    name.replace('/', "//")
}

/// A category block, kept so it can be re-emitted when questions return to it
#[derive(Debug, Clone)]
struct Category {
    path: String,
    xml: String,
}

/// State accumulated during one `render` call
struct RenderContext<'a> {
    doc: &'a TestDefinition,
    settings: &'a RenderSettings,
    blocks: Vec<BlockContext>,
    current_category: Option<String>,
    warnings: Vec<RenderWarning>,
    failures: Vec<QuestionFailure>,
    rendered_questions: usize,
}

impl<'a> RenderContext<'a> {
    fn new(doc: &'a TestDefinition, settings: &'a RenderSettings) -> Self {
        Self {
            doc,
            settings,
            blocks: Vec::new(),
            current_category: None,
            warnings: Vec::new(),
            failures: Vec::new(),
            rendered_questions: 0,
        }
    }

    fn render_part(&mut self, part: &TestPart) -> Result<(), RenderError> {
        let requested = QuizModes::new(part.navigation_mode, part.submission_mode);
        let applied = self.settings.effective_modes(requested);
        if applied != requested {
            log::warn!(
                "Test part {}: {} is not supported, using {}",
                part.identifier,
                requested,
                applied
            );
            self.warnings.push(RenderWarning::ModeDowngraded {
                part_identifier: part.identifier.clone(),
                requested,
                applied,
            });
        }

        let path = format!(
            "{}/{}/{}",
            self.settings.category_root,
            category_segment(&self.doc.title),
            category_segment(&part.identifier)
        );
        let xml = render_moodle(
            MoodleTemplate::PartCategory,
            &PartCategoryContext {
                category: CategoryContext {
                    path: xml_text(&path),
                    info: content(&self.doc.title, self.settings.normalize_typography),
                    idnumber: xml_text(&part.identifier),
                },
                navmethod: applied.navmethod().to_string(),
                preferredbehaviour: applied.preferred_behaviour().to_string(),
            },
        )?;
        let category = Category { path, xml };
        self.open_category(&category);

        for section in &part.sections {
            self.render_section(section, &category)?;
        }
        Ok(())
    }

    fn render_section(&mut self, section: &TestSection, parent: &Category) -> Result<(), RenderError> {
        let own;
        let category = if section.visibility.is_shown() {
            let path = format!("{}/{}", parent.path, category_segment(&section.title));
            let xml = render_moodle(
                MoodleTemplate::SectionCategory,
                &CategoryContext {
                    path: xml_text(&path),
                    info: content(&section.title, self.settings.normalize_typography),
                    idnumber: xml_text(&section.identifier),
                },
            )?;
            own = Category { path, xml };
            self.open_category(&own);
            &own
        } else {
            log::debug!("Section {} is hidden; questions join {}", section.identifier, parent.path);
            parent
        };

        for entry in &section.entries {
            match entry {
                SectionEntry::Question(question) => self.render_question(question, category),
                SectionEntry::Section(child) => self.render_section(child, category)?,
            }
        }
        Ok(())
    }

    /// Emit a category block unless it is already the current category
    fn open_category(&mut self, category: &Category) {
        if self.current_category.as_deref() == Some(category.path.as_str()) {
            return;
        }
        self.blocks.push(BlockContext {
            xml: category.xml.clone(),
        });
        self.current_category = Some(category.path.clone());
    }

    fn render_question(&mut self, question: &Question, category: &Category) {
        let rendered = map_question(question, self.settings)
            .and_then(|mapping| Ok((mapping.question.render()?, mapping)));

        match rendered {
            Ok((xml, mapping)) => {
                log::debug!(
                    "Question {} rendered as {}",
                    question.identifier,
                    mapping.question.type_name()
                );
                self.open_category(category);
                self.blocks.push(BlockContext { xml });
                self.warnings.extend(mapping.warnings);
                self.rendered_questions += 1;
            }
            Err(error) => {
                log::warn!("Question {} skipped: {}", question.identifier, error);
                self.failures.push(QuestionFailure {
                    question_identifier: question.identifier.clone(),
                    error,
                });
            }
        }
    }

    fn finish(self) -> Result<RenderResult, RenderError> {
        let moodle_xml = render_moodle(MoodleTemplate::Quiz, &QuizContext { blocks: self.blocks })?;

        log::info!(
            "Rendered Moodle quiz for '{}': {} question(s), {} failure(s), {} warning(s)",
            self.doc.identifier,
            self.rendered_questions,
            self.failures.len(),
            self.warnings.len()
        );

        Ok(RenderResult {
            moodle_xml,
            warnings: self.warnings,
            failures: self.failures,
            rendered_questions: self.rendered_questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_segment_escapes_slashes() {
        assert_eq!(category_segment("Part 1/2"), "Part 1//2");
        assert_eq!(category_segment("Plain"), "Plain");
    }
}
