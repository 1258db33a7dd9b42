//! Response and outcome declarations
//!
//! A response declaration describes what a candidate can answer (cardinality
//! and base type), which answers are correct, and how answers are scored.

use serde::{Deserialize, Serialize};

/// How many values a response holds
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Multiple,
    Ordered,
}

impl Cardinality {
    pub const ALLOWED: &'static [&'static str] = &["single", "multiple", "ordered"];

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "single" => Some(Cardinality::Single),
            "multiple" => Some(Cardinality::Multiple),
            "ordered" => Some(Cardinality::Ordered),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Single => "single",
            Cardinality::Multiple => "multiple",
            Cardinality::Ordered => "ordered",
        }
    }
}

/// Primitive type of response values
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Identifier,
    String,
    Integer,
    Float,
}

impl BaseType {
    pub const ALLOWED: &'static [&'static str] = &["identifier", "string", "integer", "float"];

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "identifier" => Some(BaseType::Identifier),
            "string" => Some(BaseType::String),
            "integer" => Some(BaseType::Integer),
            "float" => Some(BaseType::Float),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Identifier => "identifier",
            BaseType::String => "string",
            BaseType::Integer => "integer",
            BaseType::Float => "float",
        }
    }

    /// Check that a literal value belongs to this type's value space
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            BaseType::Identifier => {
                !value.is_empty() && !value.chars().any(char::is_whitespace)
            }
            BaseType::String => true,
            BaseType::Integer => value.trim().parse::<i64>().is_ok(),
            BaseType::Float => value
                .trim()
                .parse::<f64>()
                .map(f64::is_finite)
                .unwrap_or(false),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, BaseType::Integer | BaseType::Float)
    }
}

/// One `map-key → mapped-value` entry of a scoring mapping
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub value: f64,
    pub case_sensitive: bool,
}

impl MapEntry {
    fn matches(&self, candidate: &str) -> bool {
        if self.case_sensitive {
            self.key == candidate
        } else {
            self.key.eq_ignore_ascii_case(candidate)
        }
    }
}

/// Scoring mapping from response values to scores
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScoreMapping {
    /// Score for values absent from the entries
    pub default_value: f64,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    /// Entries in document order
    pub entries: Vec<MapEntry>,
}

impl ScoreMapping {
    /// Mapped score of a value, if an entry exists for it
    pub fn score_for(&self, value: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.matches(value))
            .map(|entry| entry.value)
    }
}

impl Default for ScoreMapping {
    fn default() -> Self {
        Self {
            default_value: 0.0,
            lower_bound: None,
            upper_bound: None,
            entries: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResponseDeclaration {
    pub identifier: String,
    pub cardinality: Cardinality,
    pub base_type: BaseType,
    /// Correct values in document order (ordered cardinality keeps the sequence)
    pub correct_values: Vec<String>,
    pub mapping: Option<ScoreMapping>,
}

impl ResponseDeclaration {
    pub fn is_correct(&self, value: &str) -> bool {
        self.correct_values.iter().any(|v| v == value)
    }

    pub fn has_correct_response(&self) -> bool {
        !self.correct_values.is_empty()
    }

    /// Raw score of one value: mapped value, else 1 for a correct value,
    /// else the mapping default (0 without a mapping).
    pub fn score_of(&self, value: &str) -> f64 {
        if let Some(score) = self.mapping.as_ref().and_then(|m| m.score_for(value)) {
            return score;
        }
        if self.is_correct(value) {
            return 1.0;
        }
        self.mapping.as_ref().map(|m| m.default_value).unwrap_or(0.0)
    }
}

/// Outcome variable declared by an item (e.g. SCORE, FEEDBACK)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OutcomeDeclaration {
    pub identifier: String,
    pub cardinality: Cardinality,
    /// Kept as written; outcomes may use base types responses never do
    pub base_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(mapping: Option<ScoreMapping>) -> ResponseDeclaration {
        ResponseDeclaration {
            identifier: "RESPONSE".to_string(),
            cardinality: Cardinality::Single,
            base_type: BaseType::Identifier,
            correct_values: vec!["A".to_string()],
            mapping,
        }
    }

    #[test]
    fn test_base_type_value_space() {
        assert!(BaseType::Identifier.accepts("choice_A"));
        assert!(!BaseType::Identifier.accepts("two words"));
        assert!(!BaseType::Identifier.accepts(""));
        assert!(BaseType::Integer.accepts(" 42 "));
        assert!(!BaseType::Integer.accepts("4.2"));
        assert!(BaseType::Float.accepts("-0.5"));
        assert!(!BaseType::Float.accepts("NaN"));
        assert!(BaseType::String.accepts(""));
    }

    #[test]
    fn test_enum_parsing_tolerates_case() {
        assert_eq!(Cardinality::parse("Multiple"), Some(Cardinality::Multiple));
        assert_eq!(Cardinality::parse("record"), None);
        assert_eq!(BaseType::parse("FLOAT"), Some(BaseType::Float));
        assert_eq!(BaseType::parse("point"), None);
    }

    #[test]
    fn test_score_without_mapping() {
        let decl = declaration(None);
        assert_eq!(decl.score_of("A"), 1.0);
        assert_eq!(decl.score_of("B"), 0.0);
    }

    #[test]
    fn test_score_with_mapping_and_default() {
        let decl = declaration(Some(ScoreMapping {
            default_value: -0.5,
            entries: vec![MapEntry {
                key: "A".to_string(),
                value: 2.0,
                case_sensitive: true,
            }],
            ..ScoreMapping::default()
        }));
        assert_eq!(decl.score_of("A"), 2.0);
        assert_eq!(decl.score_of("B"), -0.5);
    }

    #[test]
    fn test_case_insensitive_entry() {
        let mapping = ScoreMapping {
            entries: vec![MapEntry {
                key: "Paris".to_string(),
                value: 1.0,
                case_sensitive: false,
            }],
            ..ScoreMapping::default()
        };
        assert_eq!(mapping.score_for("paris"), Some(1.0));
        assert_eq!(mapping.score_for("London"), None);
    }
}
