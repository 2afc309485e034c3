use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use polyscribe::application::services::{
    JobService, Plan, SummaryService, TranscriptionService, UsageService,
};
use polyscribe::config::Settings;
use polyscribe::domain::UserId;
use polyscribe::infrastructure::audio::FfmpegPreparer;
use polyscribe::infrastructure::llm::OpenAiClient;
use polyscribe::infrastructure::observability::{init_tracing, TracingConfig};
use polyscribe::infrastructure::persistence::{
    create_pool, PgJobRepository, PgPaymentRepository,
};
use polyscribe::infrastructure::transcription::OpenAiWhisperEngine;

/// One-shot composition root: process a single file for a user from
/// the command line. The web layer that normally drives `JobService`
/// lives in a separate deployment.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(TracingConfig::default());

    let mut args = std::env::args().skip(1);
    let (Some(user_id), Some(file)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: polyscribe <user-id> <audio-file> [language]");
    };
    let language = args.next().unwrap_or_else(|| "auto".to_string());

    let settings = Settings::from_env();

    let pool = create_pool(&settings.database.url, settings.database.max_connections)
        .await
        .map_err(|e| anyhow::anyhow!("database: {}", e))?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let jobs = Arc::new(PgJobRepository::new(pool.clone()));
    let payments = Arc::new(PgPaymentRepository::new(pool));

    let preparer = Arc::new(FfmpegPreparer::new(
        settings.audio.ffmpeg_bin.clone(),
        settings.audio.ffprobe_bin.clone(),
        settings.audio.scratch_dir.clone(),
        settings.audio.chunk_seconds,
    ));

    let engine = Arc::new(OpenAiWhisperEngine::new(
        settings.transcription.api_key.clone(),
        settings.transcription.base_url.clone(),
        Some(settings.transcription.model.clone()),
        Duration::from_secs(settings.transcription.call_timeout_secs),
    ));
    let transcription = Arc::new(TranscriptionService::new(
        engine,
        settings.transcription.max_concurrency,
        Duration::from_secs(settings.transcription.call_timeout_secs),
        settings.transcription.default_language.clone(),
    ));

    let llm = Arc::new(OpenAiClient::new(
        settings.transcription.api_key.clone(),
        settings.transcription.base_url.clone(),
        settings.summary.model.clone(),
        settings.summary.temperature,
        Duration::from_secs(settings.summary.call_timeout_secs),
    ));
    let summarizer = Arc::new(SummaryService::new(llm, settings.summary.max_input_chars));

    let usage = Arc::new(UsageService::new(
        jobs.clone(),
        payments,
        settings.billing.free_tier_minutes,
    ));

    let service = JobService::new(
        preparer,
        transcription,
        summarizer,
        usage,
        jobs,
        settings.audio.upload_limit_bytes,
        settings.transcription.default_language.clone(),
    );

    // Plans are wired into PaymentService by the web layer; loaded here
    // so a misconfigured catalog fails fast at startup.
    let plans: Vec<Plan> = settings.billing.plans.iter().map(Plan::from).collect();
    tracing::info!(plans = plans.len(), "Billing catalog loaded");

    let job = service
        .create_job(UserId::new(user_id), Path::new(&file), &file, &language)
        .await?;

    println!("job {} finished with status {}", job.id, job.status);
    if let Some(transcript) = &job.transcript {
        println!("--- transcript ---\n{}", transcript);
    }
    if let Some(summary) = &job.summary {
        println!("--- summary ---\n{}", summary);
    }
    if let Some(error) = &job.error_message {
        println!("error: {}", error);
    }

    Ok(())
}
