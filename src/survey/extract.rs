//! JSON extraction from chat-completion content.
//!
//! Models are asked for bare JSON but often wrap it in a Markdown code
//! fence, sometimes with a sentence of prose around it.  [`extract_json`]
//! finds the JSON text; [`parse_questions`] turns it into [`Question`]s.
//!
//! ```text
//! "```json\n[ … ]\n```"            → "[ … ]"
//! "Here you go:\n```\n{ … }\n```"  → "{ … }"
//! "[ … ]"                          → "[ … ]"
//! "Sorry, I can't help"            → ExtractError::NotJson
//! ```

use serde_json::Value;
use thiserror::Error;

use super::Question;

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("response content is empty")]
    Empty,

    #[error("response content is not a JSON array or object")]
    NotJson,

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("expected a question array or an object with a \"questions\" array")]
    Shape,
}

/// Locate the JSON document inside `content`.
///
/// The returned slice always starts with `[` or `{`.
pub fn extract_json(content: &str) -> Result<&str, ExtractError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::Empty);
    }
    if looks_like_json(trimmed) {
        return Ok(trimmed);
    }

    match fenced_body(trimmed) {
        Some(body) if looks_like_json(body) => Ok(body),
        _ => Err(ExtractError::NotJson),
    }
}

/// Extract and parse a list of questions.
///
/// Accepts a bare array or `{"questions": [...]}`.  Items that do not
/// parse are logged and skipped; the call fails only when items were sent
/// and none of them parsed.
pub fn parse_questions(content: &str) -> Result<Vec<Question>, ExtractError> {
    let json = extract_json(content)?;
    let value: Value = serde_json::from_str(json).map_err(|e| ExtractError::Json(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => return Err(ExtractError::Shape),
        },
        _ => return Err(ExtractError::Shape),
    };

    let sent = items.len();
    let mut questions = Vec::with_capacity(sent);
    let mut first_error = None;
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Question>(item) {
            Ok(question) => questions.push(question),
            Err(e) => {
                log::warn!("survey: skipping generated question {index}: {e}");
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    match first_error {
        Some(e) if questions.is_empty() => Err(ExtractError::Json(e)),
        _ => {
            if questions.len() < sent {
                log::info!("survey: kept {} of {sent} generated questions", questions.len());
            }
            Ok(questions)
        }
    }
}

fn looks_like_json(s: &str) -> bool {
    s.starts_with('[') || s.starts_with('{')
}

/// Body of the first fenced block, language tag skipped.  An unterminated
/// fence runs to the end of the input.
fn fenced_body(s: &str) -> Option<&str> {
    let start = s.find(FENCE)?;
    let after = &s[start + FENCE.len()..];
    let tag_len = after
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after.len());
    let body = &after[tag_len..];
    let end = body.find(FENCE).unwrap_or(body.len());
    Some(body[..end].trim())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::QuestionType;

    const ARRAY: &str = r#"[
  {"id": "1", "type": "text", "question": "What is your name?", "required": true},
  {"id": "2", "type": "single-choice", "question": "Do you own land?", "required": true, "options": ["Yes", "No"]},
  {"id": "3", "type": "rating", "question": "Rate the water supply", "required": false}
]"#;

    #[test]
    fn bare_json_passes_through() {
        assert_eq!(extract_json(ARRAY).unwrap(), ARRAY);
        assert_eq!(extract_json("  {\"a\": 1}\n").unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn json_fence_is_stripped_and_items_preserved() {
        let content = format!("```json\n{ARRAY}\n```");
        let questions = parse_questions(&content).unwrap();

        assert_eq!(questions.len(), 3);
        let kinds: Vec<QuestionType> = questions.iter().map(|q| q.kind).collect();
        assert_eq!(
            kinds,
            vec![QuestionType::Text, QuestionType::SingleChoice, QuestionType::Rating]
        );
        assert_eq!(questions[1].options, vec!["Yes", "No"]);
    }

    #[test]
    fn plain_fence_is_stripped() {
        let content = format!("```\n{ARRAY}\n```");
        assert_eq!(extract_json(&content).unwrap(), ARRAY);
    }

    #[test]
    fn fence_inside_prose_is_found() {
        let content = format!("Here is your survey:\n\n```json\n{ARRAY}\n```\nLet me know!");
        assert_eq!(extract_json(&content).unwrap(), ARRAY);
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let content = format!("```json\n{ARRAY}");
        assert_eq!(extract_json(&content).unwrap(), ARRAY);
    }

    #[test]
    fn wrapped_object_is_accepted() {
        let content = format!("{{\"questions\": {ARRAY}}}");
        assert_eq!(parse_questions(&content).unwrap().len(), 3);
    }

    #[test]
    fn prose_without_json_is_an_error() {
        assert_eq!(
            extract_json("I cannot create that survey."),
            Err(ExtractError::NotJson)
        );
        assert_eq!(
            extract_json("```text\nnot json\n```"),
            Err(ExtractError::NotJson)
        );
        assert_eq!(extract_json("   \n"), Err(ExtractError::Empty));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            parse_questions("```json\n[{\"id\": 1,]\n```"),
            Err(ExtractError::Json(_))
        ));
    }

    #[test]
    fn underscore_types_are_kept() {
        let content = r#"```json
[
  {"id": "1", "type": "text", "question": "Household head name", "required": true},
  {"id": "2", "type": "multiple_choice", "question": "Water sources", "options": ["Well", "Tap"]}
]
```"#;
        let questions = parse_questions(content).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].kind, QuestionType::MultipleChoice);
    }

    #[test]
    fn bad_items_are_skipped_when_others_parse() {
        let content = r#"[
  {"id": "1", "type": "slider", "question": "Distance to school"},
  {"id": "2", "type": "number", "question": "Family size"},
  {"id": "3", "question": "Missing type"}
]"#;
        let questions = parse_questions(content).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "2");
    }

    #[test]
    fn all_items_bad_is_an_error() {
        let content = r#"[{"id": "1", "type": "slider", "question": "?"}]"#;
        assert!(matches!(parse_questions(content), Err(ExtractError::Json(_))));
        assert_eq!(parse_questions("[]"), Ok(Vec::new()));
    }

    #[test]
    fn object_without_questions_is_wrong_shape() {
        assert_eq!(
            parse_questions("{\"items\": []}"),
            Err(ExtractError::Shape)
        );
        assert_eq!(parse_questions("{\"questions\": 3}"), Err(ExtractError::Shape));
    }
}
