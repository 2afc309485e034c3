use std::io::Write as _;
use std::time::Duration;

use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use polyscribe::application::ports::{TranscriptionEngine, TranscriptionError};
use polyscribe::infrastructure::transcription::OpenAiWhisperEngine;

async fn start_mock_whisper_server(
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        "/audio/transcriptions",
        post(move || async move {
            let status = axum::http::StatusCode::from_u16(response_status).unwrap();
            (status, response_body).into_response()
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

fn audio_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"fake opus bytes").unwrap();
    file
}

fn engine(base_url: &str) -> OpenAiWhisperEngine {
    OpenAiWhisperEngine::new(
        "test-key".to_string(),
        Some(base_url.to_string()),
        None,
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn given_verbose_response_when_transcribing_then_text_and_language_come_back() {
    let body = r#"{"text": "  Hola a todos.  ", "language": "spanish"}"#;
    let (base_url, shutdown_tx) = start_mock_whisper_server(200, body).await;
    let file = audio_file();

    let result = engine(&base_url).transcribe(file.path(), None).await.unwrap();

    assert_eq!(result.text, "Hola a todos.");
    assert_eq!(result.language.as_deref(), Some("spanish"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_response_without_language_when_transcribing_then_language_is_none() {
    let body = r#"{"text": "Hello there."}"#;
    let (base_url, shutdown_tx) = start_mock_whisper_server(200, body).await;
    let file = audio_file();

    let result = engine(&base_url).transcribe(file.path(), Some("en")).await.unwrap();

    assert_eq!(result.text, "Hello there.");
    assert!(result.language.is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_api_error_status_when_transcribing_then_request_failure() {
    let body = r#"{"error": {"message": "invalid file format"}}"#;
    let (base_url, shutdown_tx) = start_mock_whisper_server(400, body).await;
    let file = audio_file();

    let result = engine(&base_url).transcribe(file.path(), None).await;

    assert!(matches!(
        result,
        Err(TranscriptionError::ApiRequestFailed(_))
    ));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_malformed_body_when_transcribing_then_invalid_response() {
    let (base_url, shutdown_tx) = start_mock_whisper_server(200, "not json").await;
    let file = audio_file();

    let result = engine(&base_url).transcribe(file.path(), None).await;

    assert!(matches!(result, Err(TranscriptionError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_missing_file_when_transcribing_then_no_request_is_made() {
    let result = engine("http://127.0.0.1:1")
        .transcribe(std::path::Path::new("/nonexistent/audio.ogg"), None)
        .await;

    assert!(matches!(result, Err(TranscriptionError::FileUnreadable(_))));
}
