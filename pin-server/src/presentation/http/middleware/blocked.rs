use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

/// Выполняется после [`super::auth::jwt_auth_middleware`]; заблокированный пользователь не доходит до обработчиков постов.
pub(crate) async fn reject_blocked_middleware(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state
        .moderation_service
        .ensure_not_blocked(auth.user_id)
        .await?;
    Ok(next.run(request).await)
}
