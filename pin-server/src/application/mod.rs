pub(crate) mod auth_service;
pub(crate) mod moderation_service;
pub(crate) mod post_service;
