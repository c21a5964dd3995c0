use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::domain::error::DomainError;
use crate::presentation::http::session::removal_cookie;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {msg}")]
    BadRequest {
        param: Option<&'static str>,
        msg: String,
    },

    #[error("No token, authorization denied")]
    Unauthenticated,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub(crate) fn bad_request(param: &'static str, msg: impl Into<String>) -> Self {
        AppError::BadRequest {
            param: Some(param),
            msg: msg.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Serialize)]
struct ErrorItem {
    msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    param: Option<String>,
}

impl ErrorItem {
    fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: None,
        }
    }

    fn with_param(msg: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: Some(param.into()),
        }
    }
}

const SERVER_ERROR: &str = "Server error";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, items) = match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { field, message } => (
                    StatusCode::BAD_REQUEST,
                    vec![ErrorItem::with_param(message, field)],
                ),
                DomainError::AlreadyExists(msg) => {
                    (StatusCode::BAD_REQUEST, vec![ErrorItem::new(msg)])
                }
                DomainError::InvalidCredentials
                | DomainError::UserBlocked
                | DomainError::CannotBlockModerator => {
                    (StatusCode::BAD_REQUEST, vec![ErrorItem::new(err.to_string())])
                }
                DomainError::NotAuthorized => {
                    (StatusCode::UNAUTHORIZED, vec![ErrorItem::new(err.to_string())])
                }
                DomainError::NotFound(msg) => (StatusCode::NOT_FOUND, vec![ErrorItem::new(msg)]),
                DomainError::Unexpected(detail) => {
                    error!(error = %detail, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        vec![ErrorItem::new(SERVER_ERROR)],
                    )
                }
            },
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, validation_items(&errors)),
            AppError::BadRequest { param, msg } => (
                StatusCode::BAD_REQUEST,
                vec![ErrorItem {
                    msg,
                    param: param.map(str::to_string),
                }],
            ),
            AppError::Unauthenticated | AppError::InvalidToken => {
                warn!(reason = %self, "session rejected");
                let body = ErrorBody {
                    errors: vec![ErrorItem::new(self.to_string())],
                };
                let jar = CookieJar::new().add(removal_cookie());
                return (StatusCode::UNAUTHORIZED, jar, Json(body)).into_response();
            }
            AppError::Internal(err) => {
                error!(error = %format!("{err:#}"), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec![ErrorItem::new(SERVER_ERROR)],
                )
            }
        };

        (status, Json(ErrorBody { errors: items })).into_response()
    }
}

fn validation_items(errors: &ValidationErrors) -> Vec<ErrorItem> {
    let mut items: Vec<ErrorItem> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let field = field.to_string();
            field_errors.iter().map(move |err| {
                let msg = err
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"));
                ErrorItem::with_param(msg, field.clone())
            })
        })
        .collect();
    items.sort_by(|a, b| a.param.cmp(&b.param));
    items
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::header;
    use serde_json::{Value, json};

    use super::*;

    async fn into_parts(err: AppError) -> (StatusCode, Option<String>, Value) {
        let response = err.into_response();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        let body = serde_json::from_slice(&bytes).expect("body must be json");
        (status, cookie, body)
    }

    #[tokio::test]
    async fn validation_error_names_the_field() {
        let (status, _, body) = into_parts(AppError::Domain(DomainError::Validation {
            field: "title",
            message: "Please enter a title",
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"errors": [{"msg": "Please enter a title", "param": "title"}]})
        );
    }

    #[tokio::test]
    async fn blocked_user_maps_to_bad_request() {
        let (status, cookie, body) = into_parts(AppError::Domain(DomainError::UserBlocked)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(cookie.is_none());
        assert_eq!(body, json!({"errors": [{"msg": "You are blocked"}]}));
    }

    #[tokio::test]
    async fn not_authorized_is_unauthorized() {
        let (status, _, body) = into_parts(AppError::Domain(DomainError::NotAuthorized)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"errors": [{"msg": "Not authorized"}]}));
    }

    #[tokio::test]
    async fn missing_token_clears_cookie() {
        let (status, cookie, body) = into_parts(AppError::Unauthenticated).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({"errors": [{"msg": "No token, authorization denied"}]})
        );
        let cookie = cookie.expect("removal cookie must be set");
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, _, body) =
            into_parts(AppError::Domain(DomainError::Unexpected("db down".to_string()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"errors": [{"msg": "Server error"}]}));
    }
}
