use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::application::services::Plan;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub audio: AudioSettings,
    pub transcription: TranscriptionSettings,
    pub summary: SummarySettings,
    pub billing: BillingSettings,
    pub paypal: PayPalSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSettings {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub scratch_dir: PathBuf,
    pub chunk_seconds: u32,
    /// Per-request size ceiling of the transcription API, in bytes.
    pub upload_limit_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_concurrency: usize,
    pub call_timeout_secs: u64,
    /// Fallback when the engine reports an unrecognized language.
    pub default_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarySettings {
    pub model: String,
    pub temperature: f32,
    pub max_input_chars: usize,
    pub call_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingSettings {
    pub free_tier_minutes: i64,
    pub plans: Vec<PlanSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanSettings {
    pub code: String,
    pub minutes: i64,
    /// Expected price per currency, in integer cents.
    pub prices_cents: HashMap<String, i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayPalSettings {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub call_timeout_secs: u64,
}

impl Settings {
    /// Environment-variable loading for the composition root; tests
    /// build `Settings` directly.
    pub fn from_env() -> Self {
        Self {
            database: DatabaseSettings {
                url: env_or("DATABASE_URL", "postgres://localhost/polyscribe"),
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 5),
            },
            audio: AudioSettings {
                ffmpeg_bin: env_or("FFMPEG_BIN", "ffmpeg"),
                ffprobe_bin: env_or("FFPROBE_BIN", "ffprobe"),
                scratch_dir: PathBuf::from(env_or("SCRATCH_DIR", "/tmp/polyscribe")),
                chunk_seconds: env_parse("MAX_CHUNK_SECONDS", 600),
                upload_limit_bytes: env_parse("API_FILE_LIMIT_MB", 25) * 1024 * 1024,
            },
            transcription: TranscriptionSettings {
                api_key: env_or("OPENAI_API_KEY", ""),
                base_url: std::env::var("OPENAI_BASE_URL").ok(),
                model: env_or("OPENAI_TRANSCRIBE_MODEL", "whisper-1"),
                max_concurrency: env_parse("TRANSCRIBE_CONCURRENCY", 2),
                call_timeout_secs: env_parse("TRANSCRIBE_TIMEOUT_SECS", 300),
                default_language: env_or("DEFAULT_LANGUAGE", "en"),
            },
            summary: SummarySettings {
                model: env_or("OPENAI_SUMMARY_MODEL", "gpt-4o-mini"),
                temperature: env_parse("SUMMARY_TEMPERATURE", 0.3),
                max_input_chars: env_parse("SUMMARY_MAX_INPUT_CHARS", 12_000),
                call_timeout_secs: env_parse("SUMMARY_TIMEOUT_SECS", 120),
            },
            billing: BillingSettings {
                free_tier_minutes: env_parse("FREE_TIER_MINUTES", 10),
                plans: default_plans(),
            },
            paypal: PayPalSettings {
                base_url: env_or("PAYPAL_BASE_URL", "https://api-m.sandbox.paypal.com"),
                client_id: env_or("PAYPAL_CLIENT_ID", ""),
                client_secret: env_or("PAYPAL_CLIENT_SECRET", ""),
                call_timeout_secs: env_parse("PAYPAL_TIMEOUT_SECS", 30),
            },
        }
    }
}

impl From<&PlanSettings> for Plan {
    fn from(settings: &PlanSettings) -> Self {
        Plan {
            code: settings.code.clone(),
            minutes: settings.minutes,
            prices_cents: settings.prices_cents.clone(),
        }
    }
}

fn default_plans() -> Vec<PlanSettings> {
    vec![
        PlanSettings {
            code: "starter_60".to_string(),
            minutes: 60,
            prices_cents: HashMap::from([("USD".to_string(), 499)]),
        },
        PlanSettings {
            code: "pro_300".to_string(),
            minutes: 300,
            prices_cents: HashMap::from([("USD".to_string(), 1999)]),
        },
        PlanSettings {
            code: "business_1200".to_string(),
            minutes: 1200,
            prices_cents: HashMap::from([("USD".to_string(), 5999)]),
        },
    ]
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
