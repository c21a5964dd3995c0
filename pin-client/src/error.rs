use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `pin-client`.
pub enum PinClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Нет сессии, токен недействителен или недостаточно прав (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Запрошенный ресурс не найден (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Ошибка валидации или бизнес-правила (400).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Сервер ответил ошибкой 5xx.
    #[error("server error: {0}")]
    Server(String),

    /// Сервер не вернул cookie `token` после регистрации или входа.
    #[error("session cookie is missing in the response")]
    MissingSession,
}

/// Результат операций `pin-client`.
pub type PinClientResult<T> = Result<T, PinClientError>;

impl PinClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized(message)
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            status if status.is_server_error() => Self::Server(message),
            _ => Self::InvalidRequest(message),
        }
    }

    /// Сообщение сервера, если ошибка пришла из API.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::InvalidRequest(msg)
            | Self::Server(msg) => Some(msg),
            Self::Http(_) | Self::MissingSession => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_variant() {
        let err = PinClientError::from_http_status(
            reqwest::StatusCode::BAD_REQUEST,
            Some("You are blocked".to_string()),
        );
        assert!(matches!(err, PinClientError::InvalidRequest(_)));
        assert_eq!(err.server_message(), Some("You are blocked"));

        let err = PinClientError::from_http_status(reqwest::StatusCode::UNAUTHORIZED, None);
        assert!(matches!(err, PinClientError::Unauthorized(_)));

        let err = PinClientError::from_http_status(reqwest::StatusCode::BAD_GATEWAY, None);
        assert!(matches!(err, PinClientError::Server(_)));
    }
}
