use serde::{Deserialize, Serialize};

use super::defaults;

/// Answer generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub model: String,
    pub endpoint: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
    /// Longest question accepted, in characters.
    pub max_question_chars: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_GENERATION_MODEL.to_string(),
            endpoint: defaults::DEFAULT_GENERATION_ENDPOINT.to_string(),
            api_key_env: defaults::DEFAULT_EMBEDDING_API_KEY_ENV.to_string(),
            temperature: defaults::DEFAULT_GENERATION_TEMPERATURE,
            max_tokens: defaults::DEFAULT_GENERATION_MAX_TOKENS,
            timeout_secs: defaults::DEFAULT_GENERATION_TIMEOUT_SECS,
            max_question_chars: defaults::DEFAULT_MAX_QUESTION_CHARS,
        }
    }
}
