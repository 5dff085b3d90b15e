// src/status.rs
use std::borrow::Cow;

use serde_json::Value;

use crate::errors::StatusError;

/// Review status codes and the sentence shown to the user for each.
/// The set of valid codes is exactly the key set of this table.
pub const VERDICTS: [(&str, &str); 3] = [
    ("approved", "Работа проверена: ревьюеру всё понравилось. Ура!"),
    ("reviewing", "Работа взята на проверку ревьюером."),
    ("rejected", "Работа проверена: у ревьюера есть замечания."),
];

pub fn verdict_for(status: &str) -> Option<&'static str> {
    VERDICTS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, verdict)| *verdict)
}

/// Reads the `homework_name` of a record. A present non-string name is rendered as JSON.
pub fn record_name(record: &Value) -> Result<Cow<'_, str>, StatusError> {
    field_text(record, "homework_name").ok_or(StatusError::MissingName)
}

/// Reads the raw `status` code of a record without checking it against [`VERDICTS`].
/// A present non-string status is rendered as JSON and fails the table lookup later.
pub fn record_status(record: &Value) -> Result<Cow<'_, str>, StatusError> {
    field_text(record, "status").ok_or(StatusError::MissingStatus)
}

fn field_text<'a>(record: &'a Value, key: &str) -> Option<Cow<'a, str>> {
    match record.get(key)? {
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Turns a homework record into the notification text for its current status.
pub fn parse_status(record: &Value) -> Result<String, StatusError> {
    let name = record_name(record)?;
    let status = record_status(record)?;
    let verdict = verdict_for(&status).ok_or_else(|| StatusError::InvalidStatus {
        name: name.to_string(),
        status: status.to_string(),
    })?;

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        name, verdict
    ))
}
