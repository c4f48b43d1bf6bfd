//! OpenAI-compatible chat completions provider.
//!
//! `complete` issues one non-streaming request. `stream` issues a streaming
//! request and turns the server-sent events into [`GenerationEvent`]s:
//! content deltas become `Delta`, `[DONE]` becomes `Done`, an error payload
//! becomes `Failed`. A transport that ends or breaks before `[DONE]` simply
//! ends the stream, which the composer reports as incomplete.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use beacon_core::config::AnswerConfig;
use beacon_core::errors::{BeaconResult, GenerationError};
use beacon_core::models::Prompt;
use beacon_core::traits::{GenerationEvent, GenerationStream, IGenerationProvider};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::sse::SseDecoder;

const DONE_SENTINEL: &str = "[DONE]";

pub struct ChatApiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: usize,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ErrorPayload>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: String,
}

impl ChatApiProvider {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        temperature: f32,
        max_tokens: usize,
        timeout: Duration,
    ) -> BeaconResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| GenerationError::ProviderFailed {
                reason: format!("client setup failed: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            temperature,
            max_tokens,
        })
    }

    /// Build from `[answer]` config, reading the key from `api_key_env`.
    pub fn from_config(config: &AnswerConfig) -> BeaconResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerationError::ProviderFailed {
                reason: format!("no API key in ${}", config.api_key_env),
            })?;
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            api_key,
            config.temperature,
            config.max_tokens,
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn send(&self, prompt: &Prompt, stream: bool) -> BeaconResult<reqwest::Response> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::ProviderFailed {
                reason: format!("HTTP error: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(response)
    }
}

/// Map one SSE data payload to a generation event. `None` for payloads that
/// carry no text (role announcements, finish reasons, keep-alives).
pub fn decode_payload(data: &str) -> Option<GenerationEvent> {
    let data = data.trim();
    if data == DONE_SENTINEL {
        return Some(GenerationEvent::Done);
    }
    match serde_json::from_str::<ChunkPayload>(data) {
        Ok(payload) => {
            if let Some(error) = payload.error {
                let message = if error.message.is_empty() {
                    "provider reported an error".to_string()
                } else {
                    error.message
                };
                return Some(GenerationEvent::Failed(message));
            }
            let text: String = payload
                .choices
                .into_iter()
                .filter_map(|c| c.delta.and_then(|d| d.content))
                .collect();
            if text.is_empty() {
                None
            } else {
                Some(GenerationEvent::Delta(text))
            }
        }
        Err(e) => Some(GenerationEvent::Failed(format!("malformed stream payload: {e}"))),
    }
}

/// Turn a byte stream of SSE into generation events, ending after the first
/// terminal event or when the transport ends.
pub fn events_from_sse<S, B, E>(bytes: S) -> BoxStream<'static, GenerationEvent>
where
    S: futures::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    struct State<S> {
        bytes: std::pin::Pin<Box<S>>,
        decoder: SseDecoder,
        pending: VecDeque<GenerationEvent>,
        finished: bool,
    }

    let state = State {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                if event.is_terminal() {
                    state.finished = true;
                    state.pending.clear();
                }
                return Some((event, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let payloads = state.decoder.push(chunk.as_ref());
                    state.pending.extend(payloads.iter().filter_map(|p| decode_payload(p)));
                }
                Some(Err(e)) => {
                    warn!(error = %e, "generation transport failed mid-stream");
                    state.finished = true;
                }
                None => {
                    let payloads = state.decoder.finish();
                    state.pending.extend(payloads.iter().filter_map(|p| decode_payload(p)));
                    if state.pending.is_empty() {
                        return None;
                    }
                    // Deliver what the tail held, then stop.
                    state.finished = true;
                    if let Some(event) = state.pending.pop_front() {
                        return Some((event, state));
                    }
                }
            }
        }
    })
    .boxed()
}

#[async_trait]
impl IGenerationProvider for ChatApiProvider {
    async fn complete(&self, prompt: &Prompt) -> BeaconResult<String> {
        let response = self.send(prompt, false).await?;
        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::ProviderFailed {
                    reason: format!("JSON parse error: {e}"),
                })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                GenerationError::ProviderFailed {
                    reason: "response had no content".to_string(),
                }
                .into()
            })
    }

    async fn stream(&self, prompt: &Prompt) -> BeaconResult<GenerationStream> {
        let response = self.send(prompt, true).await?;
        debug!(model = %self.model, "generation stream opened");
        Ok(events_from_sse(response.bytes_stream()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
