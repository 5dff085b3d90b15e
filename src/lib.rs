// src/lib.rs
pub mod api;
pub mod banner;
pub mod config;
pub mod errors;
pub mod notifier;
pub mod poller;
pub mod status;
pub mod validator;
