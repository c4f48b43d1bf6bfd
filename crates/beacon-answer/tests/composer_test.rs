//! AnswerComposer tests against scripted generation providers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use beacon_answer::AnswerComposer;
use beacon_core::errors::{BeaconError, BeaconResult, GenerationError};
use beacon_core::models::{AnswerFrame, Prompt, RankedResult, Record, RecordDraft, RecordId};
use beacon_core::traits::{GenerationEvent, GenerationStream, IGenerationProvider};
use beacon_core::CancellationToken;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;

/// Sets its flag when dropped, to observe transport release.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

struct ScriptedGenerator {
    events: Vec<GenerationEvent>,
    hang_after_script: bool,
    completion: String,
    dropped: Arc<AtomicBool>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedGenerator {
    fn new(events: Vec<GenerationEvent>) -> Self {
        Self {
            events,
            hang_after_script: false,
            completion: String::new(),
            dropped: Arc::new(AtomicBool::new(false)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn hanging(events: Vec<GenerationEvent>) -> Self {
        Self {
            hang_after_script: true,
            ..Self::new(events)
        }
    }

    fn completing(text: &str) -> Self {
        Self {
            completion: text.to_string(),
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl IGenerationProvider for ScriptedGenerator {
    async fn complete(&self, prompt: &Prompt) -> BeaconResult<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.completion.clone())
    }

    async fn stream(&self, prompt: &Prompt) -> BeaconResult<GenerationStream> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let guard = DropFlag(self.dropped.clone());
        let scripted = stream::iter(self.events.clone()).map(move |event| {
            let _held = &guard;
            event
        });
        if self.hang_after_script {
            Ok(scripted.chain(stream::pending()).boxed())
        } else {
            Ok(scripted.boxed())
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn ranked(id: u64, name: &str) -> RankedResult {
    let draft = RecordDraft {
        external_id: format!("ext-{id}"),
        name: name.to_string(),
        summary: format!("{name} summary"),
        ..Default::default()
    };
    RankedResult {
        record: Record::from_draft(RecordId(id), draft, Utc::now()),
        score: 0.8,
    }
}

fn delta(text: &str) -> GenerationEvent {
    GenerationEvent::Delta(text.to_string())
}

fn drain(rx: &mut mpsc::UnboundedReceiver<AnswerFrame>) -> Vec<AnswerFrame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}

#[tokio::test]
async fn three_chunks_then_one_done_frame() {
    let provider = Arc::new(ScriptedGenerator::new(vec![
        delta("X"),
        delta("\nRELEVANT_RECORDS: "),
        delta("[\"Smart Mooring Field Guide\"]"),
        GenerationEvent::Done,
    ]));
    let composer = AnswerComposer::new(provider);
    let results = vec![ranked(1, "Smart Mooring Field Guide"), ranked(2, "Weather Buoy Overview")];

    let (tx, mut rx) = mpsc::unbounded_channel();
    let answer = composer
        .answer_framed("What is a smart mooring?", &results, &CancellationToken::new(), &tx)
        .await
        .unwrap();
    assert_eq!(answer.text, "X");
    assert_eq!(answer.relevant_record_ids, vec![RecordId(1)]);

    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 4);
    assert!(frames[..3].iter().all(|f| matches!(f, AnswerFrame::Chunk { .. })));
    assert_eq!(frames[0], AnswerFrame::Chunk { text: "X".into() });
    match &frames[3] {
        AnswerFrame::Done(done) => {
            let json = serde_json::to_value(done).unwrap();
            assert_eq!(json, serde_json::json!({"text": "X", "relevantRecordIds": [1]}));
        }
        other => panic!("expected done frame, got {other:?}"),
    }
}

#[tokio::test]
async fn stream_closing_without_terminal_is_incomplete() {
    let provider = Arc::new(ScriptedGenerator::new(vec![delta("a"), delta("b"), delta("c")]));
    let composer = AnswerComposer::new(provider);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let err = composer
        .answer_framed("q", &[ranked(1, "A")], &CancellationToken::new(), &tx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BeaconError::Generation(GenerationError::IncompleteStream { received_chunks: 3 })
    ));

    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 4);
    assert!(!frames.iter().any(|f| matches!(f, AnswerFrame::Done(_))));
    match &frames[3] {
        AnswerFrame::Error { message, retryable } => {
            assert!(*retryable);
            assert!(!message.contains("chunks"));
        }
        other => panic!("expected error frame, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_failure_event_is_reported() {
    let provider = Arc::new(ScriptedGenerator::new(vec![
        delta("partial"),
        GenerationEvent::Failed("overloaded".into()),
    ]));
    let composer = AnswerComposer::new(provider);

    let err = composer
        .answer_streaming("q", &[ranked(1, "A")], &CancellationToken::new(), |_| {})
        .await
        .unwrap_err();
    match err {
        BeaconError::Generation(GenerationError::ProviderFailed { reason }) => {
            assert_eq!(reason, "overloaded")
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn chunks_delivered_in_order() {
    let provider = Arc::new(ScriptedGenerator::new(vec![
        delta("one "),
        delta("two "),
        delta("three"),
        GenerationEvent::Done,
    ]));
    let composer = AnswerComposer::new(provider);
    let mut seen = Vec::new();

    let answer = composer
        .answer_streaming("q", &[ranked(1, "A"), ranked(2, "B")], &CancellationToken::new(), |c| {
            seen.push(c.to_string())
        })
        .await
        .unwrap();
    assert_eq!(seen, vec!["one ", "two ", "three"]);
    assert_eq!(answer.text, "one two three");
    // No annotation: every supplied record is referenced.
    assert_eq!(answer.relevant_record_ids, vec![RecordId(1), RecordId(2)]);
}

#[tokio::test]
async fn cancelling_stops_consumption_and_drops_transport() {
    let provider = Arc::new(ScriptedGenerator::hanging(vec![delta("first")]));
    let dropped = provider.dropped.clone();
    let composer = AnswerComposer::new(provider);
    let token = CancellationToken::new();
    let canceller = token.clone();
    let mut seen = 0;

    let err = composer
        .answer_streaming("q", &[ranked(1, "A")], &token, |_| {
            seen += 1;
            canceller.cancel();
        })
        .await
        .unwrap_err();

    assert!(matches!(err, BeaconError::Generation(GenerationError::Cancelled)));
    assert!(!err.is_retryable());
    assert_eq!(seen, 1);
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn already_cancelled_token_never_starts_generation() {
    let provider = Arc::new(ScriptedGenerator::new(vec![delta("x"), GenerationEvent::Done]));
    let composer = AnswerComposer::new(provider.clone());
    let token = CancellationToken::new();
    token.cancel();

    let err = composer
        .answer_streaming("q", &[ranked(1, "A")], &token, |_| panic!("no chunk expected"))
        .await
        .unwrap_err();
    assert!(matches!(err, BeaconError::Generation(GenerationError::Cancelled)));
}

#[tokio::test]
async fn dropped_receiver_cancels_generation() {
    let provider = Arc::new(ScriptedGenerator::hanging(vec![delta("first")]));
    let dropped = provider.dropped.clone();
    let composer = AnswerComposer::new(provider);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let consumer = async move {
        let first = rx.recv().await;
        drop(rx);
        first
    };
    let results = [ranked(1, "A")];
    let cancel = CancellationToken::new();
    let (result, first) = tokio::join!(
        composer.answer_framed("q", &results, &cancel, &tx),
        consumer
    );

    assert_eq!(first, Some(AnswerFrame::Chunk { text: "first".into() }));
    assert!(matches!(
        result,
        Err(BeaconError::Generation(GenerationError::Cancelled))
    ));
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn blocking_answer_resolves_annotation_names() {
    let provider = Arc::new(ScriptedGenerator::completing(
        "Use load cells.\n\nRELEVANT_RECORDS: [\"weather buoy\", \"Unknown Thing\"]",
    ));
    let composer = AnswerComposer::new(provider.clone());
    let results = vec![ranked(1, "Smart Mooring Field Guide"), ranked(2, "Weather Buoy Overview")];

    let answer = composer.answer("How?", &results).await.unwrap();
    assert_eq!(answer.text, "Use load cells.");
    assert_eq!(answer.relevant_record_ids, vec![RecordId(2)]);

    let prompts = provider.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].user.ends_with("Question: How?"));
}

#[tokio::test]
async fn unreadable_annotation_falls_back_to_all_records() {
    let provider = Arc::new(ScriptedGenerator::completing("Answer.\nRELEVANT_RECORDS: []"));
    let composer = AnswerComposer::new(provider);
    let results = vec![ranked(4, "A"), ranked(9, "B")];

    let answer = composer.answer("q", &results).await.unwrap();
    assert_eq!(answer.text, "Answer.");
    assert_eq!(answer.relevant_record_ids, vec![RecordId(4), RecordId(9)]);
}
