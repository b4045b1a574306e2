//! Chat messages sent to the question generator.

/// Constrains the model to a bare JSON array of question records.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an AI survey generator. Based on the user's request, return ONLY a valid JSON array \
of survey questions. Each question must have: id (string), type (one of: text, \
multiple-choice, single-choice, dropdown, date, number, rating), question (string), \
required (boolean), and options (array of strings, for multiple-choice, single-choice and \
dropdown only). No extra text, no Markdown, just JSON.";

/// Placeholder shown in the empty prompt box.
pub const PROMPT_HINT: &str =
    "A survey for (target audience) for the (issue) with (number) questions and (other requirements)";

/// `messages` array for a chat-completion request.
pub fn build_messages(prompt: &str) -> serde_json::Value {
    serde_json::json!([
        { "role": "system", "content": SYSTEM_INSTRUCTION },
        { "role": "user",   "content": prompt.trim() }
    ])
}
