mod job;
mod job_id;
mod job_status;
mod language;
mod payment;
mod usage;
mod user_id;

pub use job::Job;
pub use job_id::JobId;
pub use job_status::JobStatus;
pub use language::{normalize_language, LanguageHint};
pub use payment::{Payment, PaymentStatus};
pub use usage::UsageBalance;
pub use user_id::UserId;
