// src/api/mod.rs

use serde_json::Value;

use crate::errors::FetchError;

pub mod practicum;

pub use practicum::PracticumClient;

/// A source of homework statuses.
///
/// Implementations return the decoded response body as-is; shape checks are
/// left to [`crate::validator::extract_homeworks`].
pub trait HomeworkApi: Send + Sync {
    /// Requests every homework whose status changed since `timestamp` (unix seconds).
    fn fetch(&self, timestamp: i64) -> impl std::future::Future<Output = Result<Value, FetchError>> + Send;
}
