//! Survey question model.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of answer a question expects.  Serialised in kebab-case
/// (`"multiple-choice"`), which is also what the generator is asked for.
/// The aliases are spellings models return instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    #[serde(alias = "text-input", alias = "text_input", alias = "textarea")]
    Text,
    #[serde(alias = "multiple_choice", alias = "checkbox", alias = "checkboxes")]
    MultipleChoice,
    #[serde(alias = "single_choice", alias = "radio")]
    SingleChoice,
    #[serde(alias = "select")]
    Dropdown,
    Date,
    #[serde(alias = "numeric")]
    Number,
    #[serde(alias = "scale")]
    Rating,
}

impl QuestionType {
    /// Toolbar order of the manual builder.
    pub const ALL: [QuestionType; 7] = [
        QuestionType::Text,
        QuestionType::MultipleChoice,
        QuestionType::SingleChoice,
        QuestionType::Dropdown,
        QuestionType::Date,
        QuestionType::Number,
        QuestionType::Rating,
    ];

    /// Wire name (`"single-choice"`).
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::SingleChoice => "single-choice",
            QuestionType::Dropdown => "dropdown",
            QuestionType::Date => "date",
            QuestionType::Number => "number",
            QuestionType::Rating => "rating",
        }
    }

    /// Button label in the builder toolbar.
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Text => "Text Input",
            QuestionType::MultipleChoice => "Multiple Choice",
            QuestionType::SingleChoice => "Single Choice",
            QuestionType::Dropdown => "Dropdown",
            QuestionType::Date => "Date",
            QuestionType::Number => "Number",
            QuestionType::Rating => "Rating",
        }
    }

    /// Whether answers are picked from `options`.
    ///
    /// ```
    /// use fieldscan::survey::QuestionType;
    ///
    /// assert!(QuestionType::Dropdown.has_options());
    /// assert!(QuestionType::SingleChoice.has_options());
    /// assert!(!QuestionType::Rating.has_options());
    /// ```
    pub fn has_options(self) -> bool {
        matches!(
            self,
            QuestionType::MultipleChoice | QuestionType::SingleChoice | QuestionType::Dropdown
        )
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One survey question, either built by hand or generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Generators send ids as strings or numbers; both end up as strings.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub question: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_types_round_trip() {
        for kind in QuestionType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let back: QuestionType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn numeric_ids_become_strings() {
        let q: Question = serde_json::from_str(
            r#"{"id": 3, "type": "rating", "question": "How satisfied are you?", "required": true}"#,
        )
        .unwrap();
        assert_eq!(q.id, "3");
        assert_eq!(q.kind, QuestionType::Rating);
        assert!(q.required);
        assert!(q.options.is_empty());
    }

    #[test]
    fn missing_optional_fields_default() {
        let q: Question =
            serde_json::from_str(r#"{"type": "text", "question": "Village name"}"#).unwrap();
        assert_eq!(q.id, "");
        assert!(!q.required);
    }

    #[test]
    fn common_model_spellings_are_accepted() {
        let kind = |s: &str| serde_json::from_str::<QuestionType>(&format!("\"{s}\"")).unwrap();
        assert_eq!(kind("multiple_choice"), QuestionType::MultipleChoice);
        assert_eq!(kind("checkbox"), QuestionType::MultipleChoice);
        assert_eq!(kind("single_choice"), QuestionType::SingleChoice);
        assert_eq!(kind("radio"), QuestionType::SingleChoice);
        assert_eq!(kind("select"), QuestionType::Dropdown);
        assert_eq!(kind("text_input"), QuestionType::Text);
        // Serialisation keeps the canonical name.
        assert_eq!(
            serde_json::to_string(&QuestionType::SingleChoice).unwrap(),
            "\"single-choice\""
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let res: Result<Question, _> =
            serde_json::from_str(r#"{"id": "1", "type": "slider", "question": "?"}"#);
        assert!(res.is_err());
    }
}
