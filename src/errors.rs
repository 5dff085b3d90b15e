// src/errors.rs
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Failures of a single request to the homework API.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("API не отвечает: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Статус ответа от API {endpoint}: {status}, ожидался 200")]
    UnexpectedStatus {
        status: u16,
        headers: HeaderMap,
        url: String,
        endpoint: String,
    },

    #[error("Не удалось разобрать ответ API как JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Ответ от API ошибочного типа, не словарь")]
    NotAMapping,

    #[error("В ответе от API нет ключа \"homeworks\"")]
    MissingKey,

    #[error("Ответ от API с домашними работами ошибочного типа, не список")]
    NotASequence,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("У домашней работы нет имени")]
    MissingName,

    #[error("У домашней работы нет статуса")]
    MissingStatus,

    #[error("Статус \"{status}\" домашней работы \"{name}\" не действительный")]
    InvalidStatus { name: String, status: String },
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Telegram не отвечает: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Telegram отклонил сообщение со статусом {status}: {description}")]
    Rejected { status: u16, description: String },
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Не хватает токенов: {}", .0.join(", "))]
    CredentialMissing(Vec<&'static str>),

    #[error("Ошибка конфигурации: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
