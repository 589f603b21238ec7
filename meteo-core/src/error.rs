//! Error types for widget intents.
//!
//! Every error here is recoverable: intents fail, a banner is raised, and the
//! application keeps running. `user_message()` gives the banner text; the
//! `Display` impls carry the detail that goes to the log.

use thiserror::Error;

/// Generic banner text for any failed weather fetch.
pub const FETCH_FAILED_MESSAGE: &str =
    "Не удалось получить данные о погоде. Проверьте координаты и попробуйте снова.";

/// Prefix for failures during a refresh.
pub const REFRESH_FAILED_PREFIX: &str = "Ошибка обновления";

/// Coordinate text that failed validation, with every message collected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join(", "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

/// The widget collection is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Максимальное количество виджетов: {max}")]
pub struct CapacityError {
    pub max: usize,
}

/// Failure talking to, or understanding, the weather provider.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("weather provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("weather provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather provider returned an unreadable response: {0}")]
    Parse(String),
}

impl NetworkError {
    /// Detail is never shown to the user.
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}

/// Storage medium failures.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode widgets: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("stored widgets are corrupt: {0}")]
    Corrupt(String),
}

/// Outcome of a failed add or refresh intent.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("invalid coordinates: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl WidgetError {
    /// Banner text for this failure.
    pub fn user_message(&self) -> String {
        match self {
            WidgetError::Validation(e) => e.to_string(),
            WidgetError::Capacity(e) => e.to_string(),
            WidgetError::Network(e) => e.user_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_joined() {
        let err = ValidationError {
            messages: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "a, b");
        assert_eq!(WidgetError::from(err).user_message(), "a, b");
    }

    #[test]
    fn network_detail_is_hidden_from_user() {
        let err = WidgetError::from(NetworkError::Status {
            status: 503,
            body: "upstream exploded".into(),
        });

        assert!(err.to_string().contains("503"));
        assert_eq!(err.user_message(), FETCH_FAILED_MESSAGE);
    }

    #[test]
    fn capacity_message_names_the_limit() {
        let err = WidgetError::from(CapacityError { max: 10 });
        assert_eq!(err.user_message(), "Максимальное количество виджетов: 10");
    }
}
