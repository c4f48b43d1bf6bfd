//! AnswerComposer: generate an answer from ranked records, blocking or
//! streamed, and recover which records it drew on.

use std::future::Future;
use std::sync::Arc;

use beacon_core::cancellation::CancellationToken;
use beacon_core::errors::{BeaconResult, GenerationError};
use beacon_core::models::{Answer, AnswerFrame, Prompt, RankedResult, RecordId};
use beacon_core::traits::{GenerationEvent, IGenerationProvider};
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::annotation::{resolve_record_ids, AnnotationDecoder};
use crate::prompt::PromptBuilder;

pub struct AnswerComposer {
    provider: Arc<dyn IGenerationProvider>,
    prompts: PromptBuilder,
    decoder: AnnotationDecoder,
}

impl AnswerComposer {
    pub fn new(provider: Arc<dyn IGenerationProvider>) -> Self {
        Self::with_prompt_builder(provider, PromptBuilder::new())
    }

    pub fn with_prompt_builder(provider: Arc<dyn IGenerationProvider>, prompts: PromptBuilder) -> Self {
        Self {
            provider,
            prompts,
            decoder: AnnotationDecoder::new(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Single call, full text at once.
    pub async fn answer(&self, question: &str, ranked: &[RankedResult]) -> BeaconResult<Answer> {
        let prompt = self.prompts.build(question, ranked);
        let text = self.provider.complete(&prompt).await?;
        Ok(self.finish(&text, ranked))
    }

    /// Streamed generation. Every delta goes to `on_chunk` as it arrives, in
    /// order. Cancelling `cancel` stops consumption and drops the transport;
    /// chunks already delivered stay delivered.
    pub async fn answer_streaming<F>(
        &self,
        question: &str,
        ranked: &[RankedResult],
        cancel: &CancellationToken,
        mut on_chunk: F,
    ) -> BeaconResult<Answer>
    where
        F: FnMut(&str) + Send,
    {
        let prompt = self.prompts.build(question, ranked);
        let text = self
            .consume(&prompt, cancel, std::future::pending(), |chunk| {
                on_chunk(chunk);
                true
            })
            .await?;
        Ok(self.finish(&text, ranked))
    }

    /// Streamed generation delivered as wire frames: `chunk`* followed by
    /// exactly one `done` or `error`. A dropped receiver cancels the
    /// generation like the token does.
    pub async fn answer_framed(
        &self,
        question: &str,
        ranked: &[RankedResult],
        cancel: &CancellationToken,
        frames: &UnboundedSender<AnswerFrame>,
    ) -> BeaconResult<Answer> {
        let prompt = self.prompts.build(question, ranked);
        let result = self
            .consume(&prompt, cancel, frames.closed(), |chunk| {
                frames
                    .send(AnswerFrame::Chunk {
                        text: chunk.to_string(),
                    })
                    .is_ok()
            })
            .await
            .map(|text| self.finish(&text, ranked));

        match result {
            Ok(answer) => {
                let _ = frames.send(AnswerFrame::Done(answer.clone()));
                Ok(answer)
            }
            Err(e) => {
                warn!(error = %e, "streamed answer failed");
                let _ = frames.send(AnswerFrame::Error {
                    message: e.user_message(),
                    retryable: e.is_retryable(),
                });
                Err(e)
            }
        }
    }

    /// Drive the provider stream to its terminal event. `sink` returning
    /// false, `abandon` resolving or `cancel` firing all stop with
    /// `Cancelled`.
    async fn consume<S, A>(
        &self,
        prompt: &Prompt,
        cancel: &CancellationToken,
        abandon: A,
        mut sink: S,
    ) -> BeaconResult<String>
    where
        S: FnMut(&str) -> bool + Send,
        A: Future<Output = ()> + Send,
    {
        tokio::pin!(abandon);

        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled.into()),
            _ = &mut abandon => return Err(GenerationError::Cancelled.into()),
            stream = self.provider.stream(prompt) => stream?,
        };

        let mut text = String::new();
        let mut received = 0usize;
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(received, "answer stream cancelled");
                    return Err(GenerationError::Cancelled.into());
                }
                _ = &mut abandon => {
                    debug!(received, "answer receiver dropped");
                    return Err(GenerationError::Cancelled.into());
                }
                event = stream.next() => event,
            };

            match event {
                Some(GenerationEvent::Delta(delta)) => {
                    if delta.is_empty() {
                        continue;
                    }
                    received += 1;
                    if !sink(&delta) {
                        debug!(received, "answer sink closed");
                        return Err(GenerationError::Cancelled.into());
                    }
                    text.push_str(&delta);
                }
                Some(GenerationEvent::Done) => {
                    debug!(received, chars = text.len(), "answer stream complete");
                    return Ok(text);
                }
                Some(GenerationEvent::Failed(reason)) => {
                    return Err(GenerationError::ProviderFailed { reason }.into());
                }
                None => {
                    return Err(GenerationError::IncompleteStream {
                        received_chunks: received,
                    }
                    .into());
                }
            }
        }
    }

    /// Strip the annotation and resolve the referenced record ids. Without a
    /// usable annotation every supplied record is referenced.
    fn finish(&self, text: &str, ranked: &[RankedResult]) -> Answer {
        let supplied = || ranked.iter().map(|r| r.record.id).collect::<Vec<RecordId>>();
        match self.decoder.decode(text) {
            Ok(Some(annotation)) => Answer {
                relevant_record_ids: resolve_record_ids(&annotation.names, ranked),
                text: annotation.body,
            },
            Ok(None) => {
                debug!("answer has no annotation, referencing all supplied records");
                Answer {
                    text: text.trim().to_string(),
                    relevant_record_ids: supplied(),
                }
            }
            Err(e) => {
                warn!(error = %e, "annotation unreadable, referencing all supplied records");
                Answer {
                    text: self.decoder.strip(text),
                    relevant_record_ids: supplied(),
                }
            }
        }
    }
}
