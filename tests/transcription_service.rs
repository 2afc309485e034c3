use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use polyscribe::application::services::TranscriptionService;
use polyscribe::domain::LanguageHint;
use polyscribe::infrastructure::transcription::{MockTranscriptionEngine, ScriptedSegment};

const CALL_TIMEOUT: Duration = Duration::from_millis(200);

fn service(engine: Arc<MockTranscriptionEngine>, concurrency: usize) -> TranscriptionService {
    TranscriptionService::new(engine, concurrency, CALL_TIMEOUT, "en".to_string())
}

fn segments(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn text(t: &str, lang: Option<&str>) -> ScriptedSegment {
    ScriptedSegment::Text {
        text: t.to_string(),
        language: lang.map(str::to_string),
    }
}

#[tokio::test]
async fn given_ordered_segments_when_transcribing_then_texts_concatenate_in_order() {
    let engine = Arc::new(MockTranscriptionEngine::new());
    engine.script_segment("a.ogg", text("first part", Some("es")));
    engine.script_segment("b.ogg", text("second part", Some("en")));
    engine.script_segment("c.ogg", text("third part", None));

    let outcome = service(engine, 1)
        .transcribe_segments(&segments(&["a.ogg", "b.ogg", "c.ogg"]), &LanguageHint::Auto)
        .await;

    assert_eq!(outcome.transcript, "first part\nsecond part\nthird part");
    assert_eq!(outcome.failed_segments, 0);
}

#[tokio::test]
async fn given_parallel_execution_when_transcribing_then_order_matches_sequential() {
    let make_engine = || {
        let engine = Arc::new(MockTranscriptionEngine::new());
        for (name, t) in [("a.ogg", "one"), ("b.ogg", "two"), ("c.ogg", "three"), ("d.ogg", "four")]
        {
            engine.script_segment(name, text(t, Some("en")));
        }
        engine
    };
    let paths = segments(&["a.ogg", "b.ogg", "c.ogg", "d.ogg"]);

    let sequential = service(make_engine(), 1)
        .transcribe_segments(&paths, &LanguageHint::Auto)
        .await;
    let parallel = service(make_engine(), 4)
        .transcribe_segments(&paths, &LanguageHint::Auto)
        .await;

    assert_eq!(sequential.transcript, parallel.transcript);
}

#[tokio::test]
async fn given_language_comes_from_first_segment_only() {
    let engine = Arc::new(MockTranscriptionEngine::new());
    engine.script_segment("a.ogg", text("hola", Some("spanish")));
    engine.script_segment("b.ogg", text("hello", Some("en")));

    let outcome = service(engine, 2)
        .transcribe_segments(&segments(&["a.ogg", "b.ogg"]), &LanguageHint::Auto)
        .await;

    // "spanish" normalizes through the alias table; the second
    // segment's detection is discarded.
    assert_eq!(outcome.detected_language, "es");
}

#[tokio::test]
async fn given_explicit_hint_when_transcribing_then_hint_wins_over_detection() {
    let engine = Arc::new(MockTranscriptionEngine::new());
    engine.script_segment("a.ogg", text("bonjour", Some("fr")));

    let outcome = service(engine, 1)
        .transcribe_segments(
            &segments(&["a.ogg"]),
            &LanguageHint::Code("pt".to_string()),
        )
        .await;

    assert_eq!(outcome.detected_language, "pt");
}

#[tokio::test]
async fn given_middle_segment_timeout_when_transcribing_then_gap_is_empty_not_fatal() {
    let engine = Arc::new(MockTranscriptionEngine::new());
    engine.script_segment("a.ogg", text("seg1 text", Some("en")));
    engine.script_segment("b.ogg", ScriptedSegment::Hang(Duration::from_secs(5)));
    engine.script_segment("c.ogg", text("seg3 text", Some("en")));

    let outcome = service(engine, 1)
        .transcribe_segments(&segments(&["a.ogg", "b.ogg", "c.ogg"]), &LanguageHint::Auto)
        .await;

    assert_eq!(outcome.transcript, "seg1 text\n\nseg3 text");
    assert_eq!(outcome.failed_segments, 1);
}

#[tokio::test]
async fn given_all_segments_fail_when_transcribing_then_transcript_is_empty() {
    let engine = Arc::new(MockTranscriptionEngine::new());
    engine.script_segment("a.ogg", ScriptedSegment::Fail("boom".to_string()));
    engine.script_segment("b.ogg", ScriptedSegment::Fail("boom".to_string()));

    let outcome = service(engine, 2)
        .transcribe_segments(&segments(&["a.ogg", "b.ogg"]), &LanguageHint::Auto)
        .await;

    assert!(outcome.transcript.is_empty());
    assert_eq!(outcome.failed_segments, 2);
}

#[tokio::test]
async fn given_unrecognized_detected_code_then_configured_default_applies() {
    let engine = Arc::new(MockTranscriptionEngine::new());
    engine.script_segment("a.ogg", text("text", Some("xx-unknown")));

    let outcome = service(engine, 1)
        .transcribe_segments(&segments(&["a.ogg"]), &LanguageHint::Auto)
        .await;

    assert_eq!(outcome.detected_language, "en");
}
