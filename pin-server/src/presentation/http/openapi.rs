use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::auth::{CurrentUserDto, LoginDto, MessageDto};
use crate::presentation::http::handlers::posts::{
    CommentDto, CommentItemDto, LikeDto, ListPostsResponseDto, PaginationQuery, PostDto,
    PostFormDto,
};
use crate::presentation::http::handlers::users::{
    BlockDto, BlockEntryDto, RegisterDto, RegisterModeratorDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::users::register_user,
        crate::presentation::http::handlers::users::register_moderator,
        crate::presentation::http::handlers::users::block_user,
        crate::presentation::http::handlers::users::unblock_user,
        crate::presentation::http::handlers::users::list_blocked,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::auth::me,
        crate::presentation::http::handlers::auth::logout,
        crate::presentation::http::handlers::auth::check,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::list_own_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::posts::toggle_like,
        crate::presentation::http::handlers::posts::add_comment,
        crate::presentation::http::handlers::posts::delete_comment
    ),
    components(
        schemas(
            RegisterDto,
            RegisterModeratorDto,
            BlockDto,
            BlockEntryDto,
            LoginDto,
            MessageDto,
            CurrentUserDto,
            PostFormDto,
            CommentDto,
            PaginationQuery,
            LikeDto,
            CommentItemDto,
            PostDto,
            ListPostsResponseDto
        )
    ),
    tags(
        (name = "users", description = "Registration and moderation"),
        (name = "auth", description = "Session endpoints"),
        (name = "posts", description = "Posts, likes and comments")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/users/user",
            "/api/users/blocked",
            "/api/auth",
            "/api/auth/check",
            "/api/posts",
            "/api/posts/react/{id}",
            "/api/posts/comment/{id}/{comment_id}",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("cookie_auth"))
        );
    }
}
