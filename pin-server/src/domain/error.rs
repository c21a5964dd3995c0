use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("You are blocked")]
    UserBlocked,

    #[error("Cannot block a moderator")]
    CannotBlockModerator,

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
