use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::block::BlockEntry;
use crate::domain::error::DomainError;
use crate::domain::user::{RegisterRequest, Role};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::handlers::auth::MessageDto;
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::session::session_cookie;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(length(min = 1, max = 64, message = "Name is required"))]
    pub(crate) name: String,
    #[validate(email(message = "Please include a valid email"))]
    pub(crate) email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Please enter a password with 6 or more characters"
    ))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterModeratorDto {
    #[validate(length(min = 1, max = 64, message = "Name is required"))]
    pub(crate) name: String,
    #[validate(email(message = "Please include a valid email"))]
    pub(crate) email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Please enter a password with 6 or more characters"
    ))]
    pub(crate) password: String,
    /// Должно быть `moderator`.
    pub(crate) role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct BlockDto {
    #[validate(email(message = "Please include a valid email"))]
    pub(crate) email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct BlockEntryDto {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) email: String,
    pub(crate) blocked_by: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<BlockEntry> for BlockEntryDto {
    fn from(entry: BlockEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            email: entry.email,
            blocked_by: entry.blocked_by,
            created_at: entry.created_at,
        }
    }
}

async fn register_with_role(
    state: &AppState,
    jar: CookieJar,
    req: RegisterRequest,
) -> AppResult<(CookieJar, Json<MessageDto>)> {
    let result = state.auth_service.register(req).await?;
    let jar = jar.add(session_cookie(state.session, result.access_token));
    Ok((jar, MessageDto::new("Registered")))
}

#[utoipa::path(
    post,
    path = "/api/users/user",
    tag = "users",
    request_body = RegisterDto,
    responses(
        (status = 200, description = "Registered, session cookie set", body = MessageDto),
        (status = 400, description = "Validation error or user already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(dto): Json<RegisterDto>,
) -> AppResult<(CookieJar, Json<MessageDto>)> {
    dto.validate()?;
    let req = RegisterRequest {
        name: dto.name,
        email: dto.email,
        password: dto.password,
        role: Role::Member,
    };
    register_with_role(&state, jar, req).await
}

#[utoipa::path(
    post,
    path = "/api/users/moderator",
    tag = "users",
    request_body = RegisterModeratorDto,
    responses(
        (status = 200, description = "Registered, session cookie set", body = MessageDto),
        (status = 400, description = "Validation error, bad role or user already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register_moderator(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(dto): Json<RegisterModeratorDto>,
) -> AppResult<(CookieJar, Json<MessageDto>)> {
    dto.validate()?;
    let role: Role = dto.role.trim().parse()?;
    if role != Role::Moderator {
        return Err(DomainError::Validation {
            field: "role",
            message: "Please include a valid role",
        }
        .into());
    }

    let req = RegisterRequest {
        name: dto.name,
        email: dto.email,
        password: dto.password,
        role,
    };
    register_with_role(&state, jar, req).await
}

#[utoipa::path(
    post,
    path = "/api/users/block",
    tag = "users",
    security(("cookie_auth" = [])),
    request_body = BlockDto,
    responses(
        (status = 200, description = "User blocked", body = MessageDto),
        (status = 400, description = "Validation error, already blocked or target is a moderator"),
        (status = 401, description = "Not a moderator or missing session"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn block_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<BlockDto>,
) -> AppResult<Json<MessageDto>> {
    dto.validate()?;
    state
        .moderation_service
        .block(auth.actor(), &dto.email)
        .await?;
    Ok(MessageDto::new("User blocked"))
}

#[utoipa::path(
    post,
    path = "/api/users/unblock",
    tag = "users",
    security(("cookie_auth" = [])),
    request_body = BlockDto,
    responses(
        (status = 200, description = "User unblocked", body = MessageDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not a moderator or missing session"),
        (status = 404, description = "User not found or not blocked")
    )
)]
pub(crate) async fn unblock_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<BlockDto>,
) -> AppResult<Json<MessageDto>> {
    dto.validate()?;
    state
        .moderation_service
        .unblock(auth.actor(), &dto.email)
        .await?;
    Ok(MessageDto::new("User unblocked"))
}

#[utoipa::path(
    get,
    path = "/api/users/blocked",
    tag = "users",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Blocked users, newest first", body = [BlockEntryDto]),
        (status = 401, description = "Not a moderator or missing session")
    )
)]
pub(crate) async fn list_blocked(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<BlockEntryDto>>> {
    let entries = state.moderation_service.list_blocked(auth.actor()).await?;
    Ok(Json(entries.into_iter().map(BlockEntryDto::from).collect()))
}
