use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::users::{
    block_user, list_blocked, register_moderator, register_user, unblock_user,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/user", post(register_user))
        .route("/moderator", post(register_moderator));

    let moderation = Router::new()
        .route("/block", post(block_user))
        .route("/unblock", post(unblock_user))
        .route("/blocked", get(list_blocked))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(moderation)
}
