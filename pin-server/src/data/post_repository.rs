use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Like, Media, Post};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) owner_id: i64,
    pub(crate) title: String,
    pub(crate) media: Media,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) media: Option<Media>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn title_exists(&self, title: &str) -> Result<bool, DomainError>;
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    /// Новые первыми; `owner_id` оставляет только посты одного пользователя.
    async fn list_posts(
        &self,
        owner_id: Option<i64>,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn total_posts(&self, owner_id: Option<i64>) -> Result<i64, DomainError>;

    /// Переключает лайк пользователя и обновляет `like_count`
    /// в одной транзакции. `None`, если поста нет.
    async fn toggle_like(&self, post_id: i64, user_id: i64)
    -> Result<Option<Vec<Like>>, DomainError>;
    /// `None`, если поста нет.
    async fn add_comment(
        &self,
        post_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Vec<Comment>>, DomainError>;
    /// `None`, если комментарий уже не относится к посту.
    async fn delete_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Vec<Comment>>, DomainError>;
}
