//! Core `QuestionGenerator` trait and `ApiGenerator` implementation.
//!
//! `ApiGenerator` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint.  Connection details come from [`GeneratorConfig`]; the API key
//! is read from the environment variable the config names, at construction
//! time, and never written anywhere.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::GeneratorConfig;

use super::extract::{parse_questions, ExtractError};
use super::prompt::build_messages;
use super::Question;

/// Shown when the API gave no message of its own.
pub const FALLBACK_MESSAGE: &str = "Failed to generate survey questions. Please try again.";

// ---------------------------------------------------------------------------
// GenerateError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GenerateError {
    /// Nothing to generate from.  No request is made.
    #[error("the survey description is empty")]
    EmptyPrompt,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("generation request timed out")]
    Timeout,

    /// Non-2xx response.  `message` is the API's own `error.message`.
    #[error("API returned status {status}: {}", message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// The response or its content was not usable JSON.
    #[error("failed to parse generated questions: {0}")]
    Parse(#[from] ExtractError),

    /// The response had no content, or no questions.
    #[error("the generator returned no questions")]
    EmptyResponse,
}

impl GenerateError {
    /// Text for the inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            GenerateError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for GenerateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerateError::Timeout
        } else {
            GenerateError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// QuestionGenerator trait
// ---------------------------------------------------------------------------

/// Async source of survey questions for a free-text description.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<Question>, GenerateError>;
}

// ---------------------------------------------------------------------------
// ApiGenerator
// ---------------------------------------------------------------------------

pub struct ApiGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
    api_key: Option<String>,
}

impl ApiGenerator {
    /// Build from config, resolving the API key from the environment.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            log::warn!(
                "survey: {} is not set, requests are sent without authorization",
                config.api_key_env
            );
        }
        Self::with_api_key(config, api_key)
    }

    /// Build with an explicit key (`None` sends no `Authorization` header).
    pub fn with_api_key(config: &GeneratorConfig, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl QuestionGenerator for ApiGenerator {
    async fn generate(&self, prompt: &str) -> Result<Vec<Question>, GenerateError> {
        if prompt.trim().is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages":    build_messages(prompt),
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens
        });

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        log::debug!("survey: requesting questions from {}", self.config.model);
        let response = req.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        interpret_response(status, &text)
    }
}

/// Turn a raw HTTP response into questions.
///
/// * non-2xx → [`GenerateError::Api`] with the API's `error.message`
/// * no `choices[0].message.content` → [`GenerateError::EmptyResponse`]
/// * unparseable body or content → [`GenerateError::Parse`]
pub fn interpret_response(status: u16, body: &str) -> Result<Vec<Question>, GenerateError> {
    let json: Option<serde_json::Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = json
            .as_ref()
            .and_then(|v| v["error"]["message"].as_str())
            .map(str::to_string);
        return Err(GenerateError::Api { status, message });
    }

    let json = json.ok_or_else(|| ExtractError::Json("response body is not JSON".into()))?;
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(GenerateError::EmptyResponse)?;

    let questions = parse_questions(content)?;
    if questions.is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    log::debug!("survey: parsed {} generated question(s)", questions.len());
    Ok(questions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::QuestionType;

    fn completion(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    #[test]
    fn fenced_content_is_parsed() {
        let body = completion(
            "```json\n[{\"id\":\"1\",\"type\":\"date\",\"question\":\"Date of visit\",\"required\":true}]\n```",
        );
        let questions = interpret_response(200, &body).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].kind, QuestionType::Date);
    }

    #[test]
    fn underscore_type_does_not_drop_the_batch() {
        let body = completion(
            "```json\n[{\"id\":\"1\",\"type\":\"text\",\"question\":\"Name\"},\
             {\"id\":\"2\",\"type\":\"multiple_choice\",\"question\":\"Crops grown\",\"options\":[\"Rice\",\"Wheat\"]}]\n```",
        );
        let questions = interpret_response(200, &body).unwrap();
        let kinds: Vec<QuestionType> = questions.iter().map(|q| q.kind).collect();
        assert_eq!(kinds, vec![QuestionType::Text, QuestionType::MultipleChoice]);
    }

    #[test]
    fn api_error_message_is_surfaced() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let err = interpret_response(401, body).unwrap_err();
        assert!(matches!(err, GenerateError::Api { status: 401, .. }));
        assert_eq!(err.user_message(), "Incorrect API key provided");
    }

    #[test]
    fn api_error_without_message_uses_fallback() {
        let err = interpret_response(502, "<html>Bad gateway</html>").unwrap_err();
        assert!(matches!(err, GenerateError::Api { message: None, .. }));
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn missing_content_is_empty_response() {
        let err = interpret_response(200, r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, GenerateError::EmptyResponse));
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn malformed_content_is_parse_error() {
        let err = interpret_response(200, &completion("Sure! Here are some ideas.")).unwrap_err();
        assert!(matches!(err, GenerateError::Parse(ExtractError::NotJson)));

        let err = interpret_response(200, "not json at all").unwrap_err();
        assert!(matches!(err, GenerateError::Parse(ExtractError::Json(_))));
    }

    #[test]
    fn empty_array_is_empty_response() {
        let err = interpret_response(200, &completion("[]")).unwrap_err();
        assert!(matches!(err, GenerateError::EmptyResponse));
    }

    #[tokio::test]
    async fn empty_prompt_makes_no_request() {
        // Unroutable base URL: reaching the network would fail differently.
        let config = GeneratorConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..GeneratorConfig::default()
        };
        let generator = ApiGenerator::with_api_key(&config, None);
        let err = generator.generate("   \n").await.unwrap_err();
        assert!(matches!(err, GenerateError::EmptyPrompt));
    }

    #[test]
    fn empty_key_sends_no_authorization() {
        let generator = ApiGenerator::with_api_key(&GeneratorConfig::default(), Some(String::new()));
        assert!(generator.api_key.is_none());
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let config = GeneratorConfig {
            base_url: "http://localhost:11434/".into(),
            ..GeneratorConfig::default()
        };
        let generator = ApiGenerator::with_api_key(&config, None);
        assert_eq!(generator.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn generator_is_object_safe() {
        let generator: Box<dyn QuestionGenerator> =
            Box::new(ApiGenerator::with_api_key(&GeneratorConfig::default(), None));
        drop(generator);
    }
}
