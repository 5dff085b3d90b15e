// src/notifier/mod.rs

use crate::errors::DeliveryError;

pub mod telegram;

pub use telegram::TelegramNotifier;

/// Delivers a text message to the configured chat. Implementations do not retry.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send;
}
