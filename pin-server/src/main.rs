use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use application::moderation_service::ModerationService;
use application::post_service::PostService;
use data::repositories::postgres::block_repository::PostgresBlockRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::media::build_media_store;
use infrastructure::settings::Settings;
use presentation::AppState;
use presentation::http::session::SessionConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.app_env)?;
    info!(env = ?settings.app_env, "starting pin-server");

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let users = Arc::new(PostgresUserRepository::new(pool.clone()));
    let blocks = Arc::new(PostgresBlockRepository::new(pool.clone()));
    let posts = Arc::new(PostgresPostRepository::new(pool));
    let media = build_media_store(&settings.media)?;

    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    ));
    let session = SessionConfig {
        secure: settings.app_env.is_production(),
        ttl_seconds: jwt.ttl_seconds(),
    };

    let auth_service = Arc::new(AuthService::new(users.clone(), jwt.clone()));
    let moderation_service = Arc::new(ModerationService::new(users, blocks));
    let post_service = Arc::new(PostService::new(posts, media));

    let state = AppState::new(auth_service, post_service, moderation_service, jwt, session);

    server::run_http(&settings, state).await
}
