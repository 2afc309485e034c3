mod job_service;
mod payment_service;
mod summary_service;
pub mod text_cleanup;
mod transcription_service;
mod usage_service;

pub use job_service::{CreateJobError, JobService};
pub use payment_service::{
    CaptureReceipt, CaptureRequest, PaymentCaptureError, PaymentService, Plan,
};
pub use summary_service::{dedupe_lines, extractive_summary, too_similar, SummaryService};
pub use transcription_service::{TranscriptionOutcome, TranscriptionService};
pub use usage_service::{CreditError, UsageService};
