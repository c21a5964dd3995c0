use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::moderation_service::ModerationService;
use crate::application::post_service::PostService;
use crate::infrastructure::jwt::JwtService;
use crate::presentation::http::session::SessionConfig;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService>,
    pub(crate) post_service: Arc<PostService>,
    pub(crate) moderation_service: Arc<ModerationService>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) session: SessionConfig,
}

impl AppState {
    pub(crate) fn new(
        auth_service: Arc<AuthService>,
        post_service: Arc<PostService>,
        moderation_service: Arc<ModerationService>,
        jwt: Arc<JwtService>,
        session: SessionConfig,
    ) -> Self {
        Self {
            auth_service,
            post_service,
            moderation_service,
            jwt,
            session,
        }
    }
}
