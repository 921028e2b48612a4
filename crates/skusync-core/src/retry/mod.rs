//! Retry and backoff policy.
//!
//! One utility shared by every call site that retries (today: batch
//! write-back), so attempt ceilings and backoff shape stay consistent
//! instead of being re-implemented ad hoc.

mod classify;
mod policy;
mod run;

pub use classify::{classify_http_status, classify_store_error};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
