mod audio_preparer;
mod job_repository;
mod llm_client;
mod payment_gateway;
mod payment_repository;
mod repository_error;
mod transcription_engine;

pub use audio_preparer::{AudioPrepError, AudioPreparer, PreparedAudio};
pub use job_repository::JobRepository;
pub use llm_client::{LlmClient, LlmClientError};
pub use payment_gateway::{PaymentGateway, PaymentGatewayError, ProviderOrder};
pub use payment_repository::{PaymentInsert, PaymentRepository};
pub use repository_error::RepositoryError;
pub use transcription_engine::{SegmentTranscript, TranscriptionEngine, TranscriptionError};
