//! Question mapping
//!
//! Turns one metamodel question into the resolved template context of its
//! Moodle question type. Classification is by the interactions in the body:
//!
//! | Body                                  | Moodle type                |
//! |---------------------------------------|----------------------------|
//! | one choice block, single cardinality  | `multichoice`, single      |
//! | one choice block, multiple            | `multichoice`, multiple    |
//! | one choice/order block, ordered       | `ordering` (if enabled)    |
//! | gap-fill blocks only                  | `cloze`                    |
//! | one extended-text block               | `essay`                    |
//! | no interaction                        | `description`              |
//!
//! Anything else is an `UnsupportedConstruct` for that question.

use super::errors::RenderError;
use super::feedback::{route_feedback, CombinedSlot, FeedbackTargets, RoutedFeedback};
use super::scoring::{choice_fractions, format_fraction, format_grade};
use super::templates::{
    render_moodle, AnswerContext, ClozeContext, CombinedFeedbackContext, DescriptionContext,
    EssayContext, MoodleTemplate, MultiChoiceContext, OrderedItemContext, OrderingContext,
    QuestionHeader,
};
use super::text::{cloze_escape, content, html_text, join_html, xml_text};
use super::types::{RenderSettings, RenderWarning};
use crate::models::{
    BaseType, Cardinality, Choice, ChoiceBlock, ChoiceKind, ContentBlock, ExtendedTextBlock,
    GapSegment, Question, ResponseDeclaration,
};

/// Default height of the essay response editor, in lines
const ESSAY_RESPONSE_LINES: u32 = 15;

/// Resolved context of one question, by Moodle type
#[derive(Debug, Clone)]
pub enum MappedQuestion {
    MultiChoice(MultiChoiceContext),
    Ordering(OrderingContext),
    Cloze(ClozeContext),
    Essay(EssayContext),
    Description(DescriptionContext),
}

impl MappedQuestion {
    /// Moodle question type name
    pub fn type_name(&self) -> &'static str {
        match self {
            MappedQuestion::MultiChoice(_) => "multichoice",
            MappedQuestion::Ordering(_) => "ordering",
            MappedQuestion::Cloze(_) => "cloze",
            MappedQuestion::Essay(_) => "essay",
            MappedQuestion::Description(_) => "description",
        }
    }

    pub fn render(&self) -> Result<String, RenderError> {
        match self {
            MappedQuestion::MultiChoice(ctx) => render_moodle(MoodleTemplate::MultiChoice, ctx),
            MappedQuestion::Ordering(ctx) => render_moodle(MoodleTemplate::Ordering, ctx),
            MappedQuestion::Cloze(ctx) => render_moodle(MoodleTemplate::Cloze, ctx),
            MappedQuestion::Essay(ctx) => render_moodle(MoodleTemplate::Essay, ctx),
            MappedQuestion::Description(ctx) => render_moodle(MoodleTemplate::Description, ctx),
        }
    }
}

/// A mapped question plus the warnings raised while mapping it
#[derive(Debug, Clone)]
pub struct QuestionMapping {
    pub question: MappedQuestion,
    pub warnings: Vec<RenderWarning>,
}

/// Map one question to its Moodle question type
pub fn map_question(
    question: &Question,
    settings: &RenderSettings,
) -> Result<QuestionMapping, RenderError> {
    let choice_blocks: Vec<&ChoiceBlock> = question.body.choice_blocks().collect();
    let gap_fill_count = question.body.gap_fill_blocks().count();
    let essays: Vec<&ExtendedTextBlock> = question.body.extended_text_blocks().collect();

    match (choice_blocks.as_slice(), gap_fill_count, essays.as_slice()) {
        ([], 0, []) => Ok(map_description(question, settings)),
        ([block], 0, []) => map_choice(question, block, settings),
        ([], n, []) if n > 0 => map_cloze(question, settings),
        ([], 0, [essay]) => map_essay(question, essay, settings),
        _ => Err(RenderError::unsupported(format!(
            "question '{}' combines {} choice, {} gap-fill and {} extended-text interaction(s)",
            question.identifier,
            choice_blocks.len(),
            gap_fill_count,
            essays.len()
        ))),
    }
}

fn declaration<'q>(
    question: &'q Question,
    identifier: &str,
) -> Result<&'q ResponseDeclaration, RenderError> {
    question.response(identifier).ok_or_else(|| {
        RenderError::unsupported(format!("response '{}' is not declared", identifier))
    })
}

// ============================================================================
// SHARED PIECES
// ============================================================================

/// Body markup with each interaction replaced by its prompt
fn prompt_html(question: &Question) -> String {
    join_html(question.body.blocks.iter().filter_map(|block| match block {
        ContentBlock::Prompt(html) => Some(html.as_str()),
        ContentBlock::Choice(choice) => choice.prompt.as_deref(),
        ContentBlock::ExtendedText(essay) => essay.prompt.as_deref(),
        ContentBlock::GapFill(_) => None,
    }))
}

fn header(
    question: &Question,
    questiontext: &str,
    routed: &RoutedFeedback,
    defaultgrade: f64,
    settings: &RenderSettings,
) -> QuestionHeader {
    let normalize = settings.normalize_typography;
    QuestionHeader {
        name: content(&question.title, normalize),
        questiontext: content(questiontext, normalize),
        generalfeedback: content(&routed.general(), normalize),
        defaultgrade: format_grade(defaultgrade),
        penalty: format_grade(settings.penalty),
        idnumber: xml_text(&question.identifier),
    }
}

fn combined_feedback(routed: &RoutedFeedback, settings: &RenderSettings) -> CombinedFeedbackContext {
    let normalize = settings.normalize_typography;
    CombinedFeedbackContext {
        correct: content(&routed.combined(CombinedSlot::Correct), normalize),
        partiallycorrect: content(&routed.combined(CombinedSlot::PartiallyCorrect), normalize),
        incorrect: content(&routed.combined(CombinedSlot::Incorrect), normalize),
    }
}

fn flag(value: bool) -> String {
    let text = if value { "true" } else { "false" };
    text.to_string()
}

// ============================================================================
// CHOICE QUESTIONS
// ============================================================================

fn map_choice(
    question: &Question,
    block: &ChoiceBlock,
    settings: &RenderSettings,
) -> Result<QuestionMapping, RenderError> {
    let decl = declaration(question, &block.response_identifier)?;
    if decl.base_type != BaseType::Identifier {
        return Err(RenderError::unsupported(format!(
            "choice response '{}' has base type {}, expected identifier",
            decl.identifier,
            decl.base_type.as_str()
        )));
    }

    match (decl.cardinality, block.kind) {
        (Cardinality::Ordered, _) => map_ordering(question, block, decl, settings),
        (cardinality, ChoiceKind::Order) => Err(RenderError::unsupported(format!(
            "order interaction bound to {} response '{}'",
            cardinality.as_str(),
            decl.identifier
        ))),
        (Cardinality::Single, ChoiceKind::Choice) => {
            map_multichoice(question, block, decl, true, settings)
        }
        (Cardinality::Multiple, ChoiceKind::Choice) => {
            map_multichoice(question, block, decl, false, settings)
        }
    }
}

fn map_multichoice(
    question: &Question,
    block: &ChoiceBlock,
    decl: &ResponseDeclaration,
    single: bool,
    settings: &RenderSettings,
) -> Result<QuestionMapping, RenderError> {
    let scoring = choice_fractions(decl, &block.choices)?;
    let (routed, warnings) = route_feedback(
        question,
        FeedbackTargets {
            choices: &block.choices,
            per_choice: true,
            combined: true,
        },
    );

    let normalize = settings.normalize_typography;
    let answers = block
        .choices
        .iter()
        .zip(&scoring.fractions)
        .enumerate()
        .map(|(index, (choice, fraction))| AnswerContext {
            fraction: format_fraction(*fraction),
            text: content(&choice.text, normalize),
            feedback: content(&routed.choice(index), normalize),
        })
        .collect();

    let context = MultiChoiceContext {
        header: header(question, &prompt_html(question), &routed, scoring.denominator, settings),
        single: flag(single),
        shuffleanswers: flag(block.shuffle),
        answernumbering: xml_text(&settings.answer_numbering),
        feedback: combined_feedback(&routed, settings),
        answers,
    };

    Ok(QuestionMapping {
        question: MappedQuestion::MultiChoice(context),
        warnings,
    })
}

fn map_ordering(
    question: &Question,
    block: &ChoiceBlock,
    decl: &ResponseDeclaration,
    settings: &RenderSettings,
) -> Result<QuestionMapping, RenderError> {
    if !settings.ordering_supported {
        return Err(RenderError::unsupported(format!(
            "ordered response '{}' needs the Moodle ordering question type, which is not enabled",
            decl.identifier
        )));
    }

    // The correct order must be a permutation of the choices
    let ordered: Vec<&Choice> = decl
        .correct_values
        .iter()
        .filter_map(|value| block.choice(value))
        .collect();
    let is_permutation = ordered.len() == block.choices.len()
        && block
            .choices
            .iter()
            .all(|c| decl.correct_values.iter().filter(|v| **v == c.identifier).count() == 1);
    if !is_permutation {
        return Err(RenderError::unsupported(format!(
            "correct order of '{}' does not list every choice exactly once",
            decl.identifier
        )));
    }

    let (routed, warnings) = route_feedback(
        question,
        FeedbackTargets {
            choices: &block.choices,
            per_choice: false,
            combined: true,
        },
    );

    let normalize = settings.normalize_typography;
    let answers = ordered
        .iter()
        .enumerate()
        .map(|(index, choice)| OrderedItemContext {
            position: (index + 1).to_string(),
            text: content(&choice.text, normalize),
        })
        .collect();

    let defaultgrade = decl
        .mapping
        .as_ref()
        .and_then(|m| m.upper_bound)
        .filter(|bound| *bound > 0.0)
        .unwrap_or(1.0);

    let context = OrderingContext {
        header: header(question, &prompt_html(question), &routed, defaultgrade, settings),
        feedback: combined_feedback(&routed, settings),
        answers,
    };

    Ok(QuestionMapping {
        question: MappedQuestion::Ordering(context),
        warnings,
    })
}

// ============================================================================
// CLOZE
// ============================================================================

fn map_cloze(
    question: &Question,
    settings: &RenderSettings,
) -> Result<QuestionMapping, RenderError> {
    let mut parts = Vec::new();
    for block in &question.body.blocks {
        match block {
            ContentBlock::Prompt(html) => parts.push(html.clone()),
            ContentBlock::GapFill(gap_fill) => {
                let mut text = String::new();
                for segment in &gap_fill.segments {
                    match segment {
                        GapSegment::Text(html) => text.push_str(html),
                        gap => text.push_str(&cloze_gap(question, gap)?),
                    }
                }
                parts.push(text);
            }
            ContentBlock::Choice(_) | ContentBlock::ExtendedText(_) => {}
        }
    }

    let (routed, warnings) = route_feedback(question, FeedbackTargets::general_only());
    let gap_count = question
        .body
        .gap_fill_blocks()
        .map(|block| block.gaps().count())
        .sum::<usize>();

    let context = ClozeContext {
        header: header(question, &join_html(&parts), &routed, gap_count as f64, settings),
    };

    Ok(QuestionMapping {
        question: MappedQuestion::Cloze(context),
        warnings,
    })
}

/// Embedded-answer syntax for one gap, e.g. `{1:SHORTANSWER_C:=Paris}`
fn cloze_gap(question: &Question, gap: &GapSegment) -> Result<String, RenderError> {
    let decl = declaration(question, gap.response_identifier())?;
    if decl.cardinality != Cardinality::Single {
        return Err(RenderError::unsupported(format!(
            "gap '{}' has {} cardinality; embedded answers take one value",
            decl.identifier,
            decl.cardinality.as_str()
        )));
    }

    let (kind, candidates, keep_all) = match gap {
        GapSegment::InlineChoice { choices, .. } => {
            if decl.base_type != BaseType::Identifier {
                return Err(RenderError::unsupported(format!(
                    "inline choice response '{}' has base type {}, expected identifier",
                    decl.identifier,
                    decl.base_type.as_str()
                )));
            }
            ("MULTICHOICE", choices.clone(), true)
        }
        GapSegment::TextEntry { .. } => {
            let kind = if decl.base_type.is_numeric() {
                "NUMERICAL"
            } else if case_insensitive(decl) {
                "SHORTANSWER"
            } else {
                "SHORTANSWER_C"
            };
            (kind, text_entry_candidates(decl), false)
        }
        GapSegment::Text(_) => return Ok(String::new()),
    };

    if candidates.is_empty() {
        return Err(RenderError::unsupported(format!(
            "gap '{}' declares no acceptable answer",
            decl.identifier
        )));
    }

    let scoring = choice_fractions(decl, &candidates)?;
    let answers: Vec<String> = candidates
        .iter()
        .zip(&scoring.fractions)
        .filter(|(_, fraction)| keep_all || **fraction > 0.0)
        .map(|(candidate, fraction)| {
            let prefix = match format_fraction(*fraction).as_str() {
                "100" => "=".to_string(),
                "0" => String::new(),
                other => format!("%{}%", other),
            };
            format!("{}{}", prefix, cloze_escape(&candidate.text))
        })
        .collect();

    Ok(format!("{{1:{}:{}}}", kind, answers.join("~")))
}

/// Correct values first, then any other mapped keys, as HTML text
fn text_entry_candidates(decl: &ResponseDeclaration) -> Vec<Choice> {
    let mapped = decl.mapping.iter().flat_map(|m| m.entries.iter().map(|e| &e.key));
    let mut candidates: Vec<Choice> = Vec::new();
    for value in decl.correct_values.iter().chain(mapped) {
        if candidates.iter().all(|c| &c.identifier != value) {
            candidates.push(Choice {
                identifier: value.clone(),
                text: html_text(value),
            });
        }
    }
    candidates
}

fn case_insensitive(decl: &ResponseDeclaration) -> bool {
    decl.mapping
        .as_ref()
        .map(|m| !m.entries.is_empty() && m.entries.iter().all(|e| !e.case_sensitive))
        .unwrap_or(false)
}

// ============================================================================
// ESSAY AND DESCRIPTION
// ============================================================================

fn map_essay(
    question: &Question,
    essay: &ExtendedTextBlock,
    settings: &RenderSettings,
) -> Result<QuestionMapping, RenderError> {
    declaration(question, &essay.response_identifier)?;
    let (routed, warnings) = route_feedback(question, FeedbackTargets::general_only());

    let context = EssayContext {
        header: header(question, &prompt_html(question), &routed, 1.0, settings),
        responsefieldlines: essay
            .expected_lines
            .unwrap_or(ESSAY_RESPONSE_LINES)
            .to_string(),
    };

    Ok(QuestionMapping {
        question: MappedQuestion::Essay(context),
        warnings,
    })
}

fn map_description(question: &Question, settings: &RenderSettings) -> QuestionMapping {
    let (routed, warnings) = route_feedback(question, FeedbackTargets::general_only());
    QuestionMapping {
        question: MappedQuestion::Description(DescriptionContext {
            header: header(question, &prompt_html(question), &routed, 0.0, settings),
        }),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GapFillBlock, MapEntry, QuestionBody, ScoreMapping};

    fn choice(id: &str, text: &str) -> Choice {
        Choice {
            identifier: id.to_string(),
            text: text.to_string(),
        }
    }

    fn response(id: &str, cardinality: Cardinality, base_type: BaseType, correct: &[&str]) -> ResponseDeclaration {
        ResponseDeclaration {
            identifier: id.to_string(),
            cardinality,
            base_type,
            correct_values: correct.iter().map(|s| s.to_string()).collect(),
            mapping: None,
        }
    }

    fn question(blocks: Vec<ContentBlock>, responses: Vec<ResponseDeclaration>) -> Question {
        Question {
            identifier: "Q1".to_string(),
            title: "Question 1".to_string(),
            body: QuestionBody::new(blocks),
            responses,
            outcomes: Vec::new(),
            feedbacks: Vec::new(),
        }
    }

    fn choice_block(kind: ChoiceKind) -> ContentBlock {
        ContentBlock::Choice(ChoiceBlock {
            response_identifier: "R1".to_string(),
            kind,
            prompt: Some("<p>Pick</p>".to_string()),
            choices: vec![choice("A", "Paris"), choice("B", "Lyon")],
            shuffle: false,
            max_choices: None,
            min_choices: None,
        })
    }

    #[test]
    fn test_single_choice_maps_to_multichoice() {
        let q = question(
            vec![ContentBlock::Prompt("<p>Capital?</p>".to_string()), choice_block(ChoiceKind::Choice)],
            vec![response("R1", Cardinality::Single, BaseType::Identifier, &["A"])],
        );
        let mapping = map_question(&q, &RenderSettings::default()).unwrap();
        assert_eq!(mapping.question.type_name(), "multichoice");

        if let MappedQuestion::MultiChoice(ctx) = &mapping.question {
            assert_eq!(ctx.single, "true");
            assert_eq!(ctx.header.questiontext, "&lt;p&gt;Capital?&lt;/p&gt;\n&lt;p&gt;Pick&lt;/p&gt;");
            assert_eq!(ctx.header.defaultgrade, "1.0000000");
            assert_eq!(ctx.answers[0].fraction, "100");
            assert_eq!(ctx.answers[1].fraction, "0");
        } else {
            panic!("Expected multichoice");
        }
    }

    #[test]
    fn test_multiple_choice_is_not_single() {
        let q = question(
            vec![choice_block(ChoiceKind::Choice)],
            vec![response("R1", Cardinality::Multiple, BaseType::Identifier, &["A", "B"])],
        );
        let mapping = map_question(&q, &RenderSettings::default()).unwrap();
        if let MappedQuestion::MultiChoice(ctx) = &mapping.question {
            assert_eq!(ctx.single, "false");
            assert_eq!(ctx.answers[0].fraction, "50");
            assert_eq!(ctx.header.defaultgrade, "2.0000000");
        } else {
            panic!("Expected multichoice");
        }
    }

    #[test]
    fn test_ordering_depends_on_settings() {
        let q = question(
            vec![choice_block(ChoiceKind::Order)],
            vec![response("R1", Cardinality::Ordered, BaseType::Identifier, &["B", "A"])],
        );
        let err = map_question(&q, &RenderSettings::default()).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedConstruct(_)));

        let settings = RenderSettings {
            ordering_supported: true,
            ..RenderSettings::default()
        };
        let mapping = map_question(&q, &settings).unwrap();
        if let MappedQuestion::Ordering(ctx) = &mapping.question {
            assert_eq!(ctx.answers[0].text, "Lyon");
            assert_eq!(ctx.answers[0].position, "1");
            assert_eq!(ctx.answers[1].text, "Paris");
        } else {
            panic!("Expected ordering");
        }
    }

    #[test]
    fn test_incomplete_order_is_unsupported() {
        let q = question(
            vec![choice_block(ChoiceKind::Order)],
            vec![response("R1", Cardinality::Ordered, BaseType::Identifier, &["B"])],
        );
        let settings = RenderSettings {
            ordering_supported: true,
            ..RenderSettings::default()
        };
        assert!(map_question(&q, &settings).is_err());
    }

    #[test]
    fn test_cloze_gaps() {
        let mut text_response = response("G1", Cardinality::Single, BaseType::String, &["Paris"]);
        text_response.mapping = Some(ScoreMapping {
            default_value: 0.0,
            lower_bound: None,
            upper_bound: None,
            entries: vec![MapEntry {
                key: "paris/fr".to_string(),
                value: 0.5,
                case_sensitive: true,
            }],
        });
        let q = question(
            vec![ContentBlock::GapFill(GapFillBlock {
                segments: vec![
                    GapSegment::Text("<p>Capital: ".to_string()),
                    GapSegment::TextEntry {
                        response_identifier: "G1".to_string(),
                        expected_length: None,
                    },
                    GapSegment::Text(", size: ".to_string()),
                    GapSegment::InlineChoice {
                        response_identifier: "G2".to_string(),
                        choices: vec![choice("x", "large"), choice("y", "small")],
                    },
                    GapSegment::Text("</p>".to_string()),
                ],
            })],
            vec![
                text_response,
                response("G2", Cardinality::Single, BaseType::Identifier, &["x"]),
            ],
        );

        let mapping = map_question(&q, &RenderSettings::default()).unwrap();
        if let MappedQuestion::Cloze(ctx) = &mapping.question {
            assert_eq!(
                ctx.header.questiontext,
                xml_text("<p>Capital: {1:SHORTANSWER_C:=Paris~%50%paris\\/fr}, size: {1:MULTICHOICE:=large~small}</p>")
            );
            assert_eq!(ctx.header.defaultgrade, "2.0000000");
        } else {
            panic!("Expected cloze");
        }
    }

    #[test]
    fn test_text_entry_answers_are_html_escaped() {
        let q = question(
            vec![ContentBlock::GapFill(GapFillBlock {
                segments: vec![GapSegment::TextEntry {
                    response_identifier: "G1".to_string(),
                    expected_length: None,
                }],
            })],
            vec![response("G1", Cardinality::Single, BaseType::String, &["a<b & c"])],
        );
        let mapping = map_question(&q, &RenderSettings::default()).unwrap();
        if let MappedQuestion::Cloze(ctx) = &mapping.question {
            assert_eq!(
                ctx.header.questiontext,
                xml_text("{1:SHORTANSWER_C:=a&lt;b &amp; c}")
            );
        } else {
            panic!("Expected cloze");
        }
    }

    #[test]
    fn test_numeric_gap() {
        let q = question(
            vec![ContentBlock::GapFill(GapFillBlock {
                segments: vec![GapSegment::TextEntry {
                    response_identifier: "G1".to_string(),
                    expected_length: Some(3),
                }],
            })],
            vec![response("G1", Cardinality::Single, BaseType::Integer, &["42"])],
        );
        let mapping = map_question(&q, &RenderSettings::default()).unwrap();
        if let MappedQuestion::Cloze(ctx) = &mapping.question {
            assert_eq!(ctx.header.questiontext, "{1:NUMERICAL:=42}");
        } else {
            panic!("Expected cloze");
        }
    }

    #[test]
    fn test_multiple_gap_is_unsupported() {
        let q = question(
            vec![ContentBlock::GapFill(GapFillBlock {
                segments: vec![GapSegment::TextEntry {
                    response_identifier: "G1".to_string(),
                    expected_length: None,
                }],
            })],
            vec![response("G1", Cardinality::Multiple, BaseType::String, &["a"])],
        );
        assert!(map_question(&q, &RenderSettings::default()).is_err());
    }

    #[test]
    fn test_essay_and_description() {
        let essay = question(
            vec![ContentBlock::ExtendedText(ExtendedTextBlock {
                response_identifier: "R1".to_string(),
                prompt: Some("Discuss.".to_string()),
                expected_lines: None,
            })],
            vec![response("R1", Cardinality::Single, BaseType::String, &[])],
        );
        let mapping = map_question(&essay, &RenderSettings::default()).unwrap();
        if let MappedQuestion::Essay(ctx) = &mapping.question {
            assert_eq!(ctx.responsefieldlines, "15");
            assert_eq!(ctx.header.questiontext, "Discuss.");
        } else {
            panic!("Expected essay");
        }

        let info = question(vec![ContentBlock::Prompt("<p>Read this</p>".to_string())], Vec::new());
        let mapping = map_question(&info, &RenderSettings::default()).unwrap();
        assert_eq!(mapping.question.type_name(), "description");
    }

    #[test]
    fn test_mixed_interactions_are_unsupported() {
        let q = question(
            vec![
                choice_block(ChoiceKind::Choice),
                ContentBlock::ExtendedText(ExtendedTextBlock {
                    response_identifier: "R2".to_string(),
                    prompt: None,
                    expected_lines: None,
                }),
            ],
            vec![
                response("R1", Cardinality::Single, BaseType::Identifier, &["A"]),
                response("R2", Cardinality::Single, BaseType::String, &[]),
            ],
        );
        let err = map_question(&q, &RenderSettings::default()).unwrap_err();
        assert!(err.to_string().contains("1 choice, 0 gap-fill and 1 extended-text"));
    }

    #[test]
    fn test_typography_normalization() {
        let q = question(
            vec![ContentBlock::Prompt("It\u{2019}s \u{201C}fine\u{201D}".to_string())],
            Vec::new(),
        );
        let settings = RenderSettings {
            normalize_typography: true,
            ..RenderSettings::default()
        };
        if let MappedQuestion::Description(ctx) = map_question(&q, &settings).unwrap().question {
            assert_eq!(ctx.header.questiontext, "It&apos;s &quot;fine&quot;");
        } else {
            panic!("Expected description");
        }
    }
}
