mod in_memory;
mod pg_job_repository;
mod pg_payment_repository;

pub use in_memory::{InMemoryJobRepository, InMemoryPaymentRepository};
pub use pg_job_repository::PgJobRepository;
pub use pg_payment_repository::PgPaymentRepository;
