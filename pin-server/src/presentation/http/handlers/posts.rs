use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::post_service::ListPostsResult;
use crate::data::post_repository::Pagination;
use crate::domain::post::{
    Comment, CommentRequest, CreatePostRequest, Like, Post, UpdatePostRequest, Upload,
};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::handlers::auth::MessageDto;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

/// Multipart-форма создания и обновления: текст `title` и изображение `file`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub(crate) struct PostFormDto {
    pub(crate) title: String,
    #[schema(value_type = String, format = Binary)]
    pub(crate) file: Vec<u8>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CommentDto {
    #[validate(length(min = 1, max = 1000, message = "Please enter a comment"))]
    pub(crate) text: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PaginationQuery {
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LikeDto {
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentItemDto {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) owner_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) owner_id: i64,
    pub(crate) title: String,
    pub(crate) media_url: String,
    pub(crate) likes: Vec<LikeDto>,
    pub(crate) like_count: i64,
    pub(crate) comments: Vec<CommentItemDto>,
    pub(crate) comment_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) total: i64,
}

impl From<Like> for LikeDto {
    fn from(like: Like) -> Self {
        Self {
            user_id: like.user_id,
            created_at: like.created_at,
        }
    }
}

impl From<Comment> for CommentItemDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            owner_id: comment.owner_id,
            created_at: comment.created_at,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            owner_id: post.owner_id,
            title: post.title,
            media_url: post.media.url,
            likes: post.likes.into_iter().map(LikeDto::from).collect(),
            like_count: post.like_count,
            comments: post.comments.into_iter().map(CommentItemDto::from).collect(),
            comment_count: post.comment_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        Self {
            posts: result.posts.into_iter().map(PostDto::from).collect(),
            limit: result.limit,
            offset: result.offset,
            total: result.total,
        }
    }
}

struct PostForm {
    title: String,
    upload: Option<Upload>,
}

async fn read_post_form(mut multipart: Multipart) -> AppResult<PostForm> {
    let mut title = String::new();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request("file", err.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => {
                title = field
                    .text()
                    .await
                    .map_err(|err| AppError::bad_request("title", err.body_text()))?;
            }
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::bad_request("file", err.body_text()))?;
                if !bytes.is_empty() {
                    upload = Some(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(PostForm { title, upload })
}

impl From<PaginationQuery> for Pagination {
    fn from(query: PaginationQuery) -> Self {
        Self {
            limit: query.limit.unwrap_or(20),
            offset: query.offset.unwrap_or(0),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(("cookie_auth" = [])),
    request_body(content = PostFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error, duplicate title or blocked user"),
        (status = 401, description = "Missing or invalid session"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let form = read_post_form(multipart).await?;
    let req = CreatePostRequest {
        title: form.title,
        upload: form.upload,
    };

    let post = state.post_service.create_post(auth.actor(), req).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    security(("cookie_auth" = [])),
    params(
        ("limit" = Option<u32>, Query, description = "Items per page (1..=100)"),
        ("offset" = Option<u32>, Query, description = "Offset from the beginning (>= 0)")
    ),
    responses(
        (status = 200, description = "Posts listed, newest first", body = ListPostsResponseDto),
        (status = 400, description = "Validation error or blocked user"),
        (status = 401, description = "Missing or invalid session")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<Json<ListPostsResponseDto>> {
    query.validate()?;

    let result = state
        .post_service
        .list_posts(None, Pagination::from(query))
        .await?;
    Ok(Json(ListPostsResponseDto::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/posts/user",
    tag = "posts",
    security(("cookie_auth" = [])),
    params(
        ("limit" = Option<u32>, Query, description = "Items per page (1..=100)"),
        ("offset" = Option<u32>, Query, description = "Offset from the beginning (>= 0)")
    ),
    responses(
        (status = 200, description = "Own posts, newest first", body = ListPostsResponseDto),
        (status = 400, description = "Validation error or blocked user"),
        (status = 401, description = "Missing or invalid session")
    )
)]
pub(crate) async fn list_own_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PaginationQuery>,
) -> AppResult<Json<ListPostsResponseDto>> {
    query.validate()?;

    let result = state
        .post_service
        .list_posts(Some(auth.user_id), Pagination::from(query))
        .await?;
    Ok(Json(ListPostsResponseDto::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    security(("cookie_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 401, description = "Missing or invalid session"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDto>> {
    let post = state.post_service.get_post(id).await?;
    Ok(Json(PostDto::from(post)))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(("cookie_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    request_body(content = PostFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error or duplicate title"),
        (status = 401, description = "Not the owner or missing session"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<PostDto>> {
    let form = read_post_form(multipart).await?;
    let req = UpdatePostRequest {
        title: form.title,
        upload: form.upload,
    };

    let post = state
        .post_service
        .update_post(auth.actor(), id, req)
        .await?;
    Ok(Json(PostDto::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(("cookie_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post removed", body = MessageDto),
        (status = 401, description = "Neither owner nor moderator"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageDto>> {
    state.post_service.delete_post(auth.actor(), id).await?;
    Ok(MessageDto::new("Post removed"))
}

#[utoipa::path(
    put,
    path = "/api/posts/react/{id}",
    tag = "posts",
    security(("cookie_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Like toggled, current likes newest first", body = [LikeDto]),
        (status = 401, description = "Missing or invalid session"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<LikeDto>>> {
    let likes = state.post_service.toggle_like(auth.actor(), id).await?;
    Ok(Json(likes.into_iter().map(LikeDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/posts/comment/{id}",
    tag = "posts",
    security(("cookie_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    request_body = CommentDto,
    responses(
        (status = 200, description = "Comment added, comments newest first", body = [CommentItemDto]),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid session"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<CommentDto>,
) -> AppResult<Json<Vec<CommentItemDto>>> {
    dto.validate()?;
    let req = CommentRequest { text: dto.text };

    let comments = state
        .post_service
        .add_comment(auth.actor(), id, req)
        .await?;
    Ok(Json(comments.into_iter().map(CommentItemDto::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/posts/comment/{id}/{comment_id}",
    tag = "posts",
    security(("cookie_auth" = [])),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment removed, remaining comments", body = [CommentItemDto]),
        (status = 401, description = "Neither comment owner nor moderator"),
        (status = 404, description = "Post or comment not found")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> AppResult<Json<Vec<CommentItemDto>>> {
    let comments = state
        .post_service
        .delete_comment(auth.actor(), id, comment_id)
        .await?;
    Ok(Json(comments.into_iter().map(CommentItemDto::from).collect()))
}
