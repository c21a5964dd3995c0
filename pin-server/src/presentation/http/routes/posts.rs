use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    add_comment, create_post, delete_comment, delete_post, get_post, list_own_posts, list_posts,
    toggle_like, update_post,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;
use crate::presentation::http::middleware::blocked::reject_blocked_middleware;

/// Все маршруты постов требуют сессию и незаблокированного пользователя.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/user", get(list_own_posts))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/react/{id}", put(toggle_like))
        .route("/comment/{id}", post(add_comment))
        .route("/comment/{id}/{comment_id}", delete(delete_comment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            reject_blocked_middleware,
        ))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
