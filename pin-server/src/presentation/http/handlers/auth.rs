use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::LoginRequest;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::session::{SESSION_COOKIE, removal_cookie, session_cookie};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    #[validate(email(message = "Please include a valid email"))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MessageDto {
    pub(crate) msg: String,
}

impl MessageDto {
    pub(crate) fn new(msg: &str) -> Json<Self> {
        Json(Self {
            msg: msg.to_string(),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CurrentUserDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) role: String,
}

#[utoipa::path(
    post,
    path = "/api/auth",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = MessageDto),
        (status = 400, description = "Validation error or invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(dto): Json<LoginDto>,
) -> AppResult<(CookieJar, Json<MessageDto>)> {
    dto.validate()?;

    let req = LoginRequest {
        email: dto.email,
        password: dto.password,
    };
    let result = state.auth_service.login(req).await?;

    let jar = jar.add(session_cookie(state.session, result.access_token));
    Ok((jar, MessageDto::new("Logged in")))
}

#[utoipa::path(
    get,
    path = "/api/auth",
    tag = "auth",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = CurrentUserDto),
        (status = 401, description = "Missing or invalid session"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn me(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Json<CurrentUserDto>> {
    let user = state.auth_service.current_user(auth.user_id).await?;
    Ok(Json(CurrentUserDto {
        id: user.id,
        name: user.name,
        role: user.role.to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/auth",
    tag = "auth",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageDto),
        (status = 401, description = "Missing or invalid session")
    )
)]
pub(crate) async fn logout(
    jar: CookieJar,
    _auth: AuthenticatedUser,
) -> (CookieJar, Json<MessageDto>) {
    (jar.add(removal_cookie()), MessageDto::new("Logged out"))
}

#[utoipa::path(
    get,
    path = "/api/auth/check",
    tag = "auth",
    responses(
        (status = 200, description = "Token is valid", body = String),
        (status = 400, description = "Token missing or invalid", body = String)
    )
)]
pub(crate) async fn check(State(state): State<AppState>, jar: CookieJar) -> (StatusCode, &'static str) {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return (StatusCode::BAD_REQUEST, "No token");
    };
    match state.jwt.verify_token(cookie.value()) {
        Ok(_) => (StatusCode::OK, "Valid"),
        Err(_) => (StatusCode::BAD_REQUEST, "Invalid"),
    }
}
