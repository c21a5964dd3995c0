use std::sync::Arc;

use tracing::{info, warn};

use crate::data::media_store::{MediaError, MediaStore};
use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::domain::access::{
    Actor, ensure_can_delete_comment, ensure_can_delete_post, ensure_can_update_post,
};
use crate::domain::error::DomainError;
use crate::domain::post::{
    Comment, CommentRequest, CreatePostRequest, Like, Media, Post, UpdatePostRequest,
};

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<Post>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) total: i64,
}

pub(crate) struct PostService {
    posts: Arc<dyn PostRepository>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub(crate) fn new(posts: Arc<dyn PostRepository>, media: Arc<dyn MediaStore>) -> Self {
        Self { posts, media }
    }

    pub(crate) async fn create_post(
        &self,
        actor: Actor,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let (title, upload) = req.validate()?;

        if self.posts.title_exists(&title).await? {
            return Err(Self::duplicate_title());
        }

        let media = self.media.upload(&upload).await.map_err(media_failure)?;
        let new_post = NewPost {
            owner_id: actor.user_id,
            title,
            media: media.clone(),
        };

        match self.posts.create_post(new_post).await {
            Ok(post) => {
                info!(post_id = post.id, owner_id = post.owner_id, "post created");
                Ok(post)
            }
            Err(err) => {
                self.discard_media(&media).await;
                Err(err)
            }
        }
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(id)
            .await?
            .ok_or_else(Self::post_not_found)
    }

    pub(crate) async fn list_posts(
        &self,
        owner_id: Option<i64>,
        pagination: Pagination,
    ) -> Result<ListPostsResult, DomainError> {
        let posts = self.posts.list_posts(owner_id, pagination).await?;
        let total = self.posts.total_posts(owner_id).await?;

        Ok(ListPostsResult {
            posts,
            limit: pagination.limit,
            offset: pagination.offset,
            total,
        })
    }

    pub(crate) async fn update_post(
        &self,
        actor: Actor,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let original = self.get_post(post_id).await?;
        ensure_can_update_post(actor, &original)?;

        if req.title != original.title && self.posts.title_exists(&req.title).await? {
            return Err(Self::duplicate_title());
        }

        let new_media = match &req.upload {
            Some(upload) => Some(self.media.upload(upload).await.map_err(media_failure)?),
            None => None,
        };
        let patch = PostPatch {
            title: req.title,
            media: new_media.clone(),
        };

        let updated = match self
            .posts
            .update_post_owned(post_id, actor.user_id, patch)
            .await
        {
            Ok(Some(post)) => post,
            Ok(None) => {
                if let Some(media) = &new_media {
                    self.discard_media(media).await;
                }
                return Err(Self::post_not_found());
            }
            Err(err) => {
                if let Some(media) = &new_media {
                    self.discard_media(media).await;
                }
                return Err(err);
            }
        };

        if new_media.is_some() {
            self.discard_media(&original.media).await;
        }
        info!(post_id, "post updated");
        Ok(updated)
    }

    pub(crate) async fn delete_post(&self, actor: Actor, post_id: i64) -> Result<(), DomainError> {
        let original = self.get_post(post_id).await?;
        ensure_can_delete_post(actor, &original)?;

        if !self.posts.delete_post(post_id).await? {
            return Err(Self::post_not_found());
        }
        self.discard_media(&original.media).await;

        info!(post_id, actor_id = actor.user_id, "post deleted");
        Ok(())
    }

    /// Ставит лайк или снимает его, если пользователь уже лайкнул пост.
    pub(crate) async fn toggle_like(
        &self,
        actor: Actor,
        post_id: i64,
    ) -> Result<Vec<Like>, DomainError> {
        self.posts
            .toggle_like(post_id, actor.user_id)
            .await?
            .ok_or_else(Self::post_not_found)
    }

    pub(crate) async fn add_comment(
        &self,
        actor: Actor,
        post_id: i64,
        req: CommentRequest,
    ) -> Result<Vec<Comment>, DomainError> {
        let req = req.validate()?;
        self.posts
            .add_comment(post_id, actor.user_id, req.text)
            .await?
            .ok_or_else(Self::post_not_found)
    }

    pub(crate) async fn delete_comment(
        &self,
        actor: Actor,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Vec<Comment>, DomainError> {
        let post = self.get_post(post_id).await?;
        let comment = post.comment(comment_id).ok_or_else(Self::comment_not_found)?;
        ensure_can_delete_comment(actor, comment)?;

        self.posts
            .delete_comment(post_id, comment_id)
            .await?
            .ok_or_else(Self::comment_not_found)
    }

    async fn discard_media(&self, media: &Media) {
        if let Err(err) = self.media.remove(&media.id).await {
            warn!(media_id = %media.id, error = %err, "failed to remove image");
        }
    }

    fn post_not_found() -> DomainError {
        DomainError::NotFound("Post not found".to_string())
    }

    fn comment_not_found() -> DomainError {
        DomainError::NotFound("Comment does not exist".to_string())
    }

    fn duplicate_title() -> DomainError {
        DomainError::AlreadyExists("Post already exists".to_string())
    }
}

fn media_failure(err: MediaError) -> DomainError {
    DomainError::Unexpected(format!("image store: {err}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::PostService;
    use crate::data::post_repository::Pagination;
    use crate::data::repositories::memory::{FakeMediaStore, MemoryStore};
    use crate::domain::access::Actor;
    use crate::domain::error::DomainError;
    use crate::domain::post::{CommentRequest, CreatePostRequest, UpdatePostRequest, Upload};
    use crate::domain::user::Role;

    const ALICE: Actor = Actor {
        user_id: 1,
        role: Role::Member,
    };
    const BOB: Actor = Actor {
        user_id: 2,
        role: Role::Member,
    };
    const MODERATOR: Actor = Actor {
        user_id: 3,
        role: Role::Moderator,
    };

    fn setup() -> (PostService, Arc<FakeMediaStore>) {
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(FakeMediaStore::new());
        (PostService::new(store, media.clone()), media)
    }

    fn png() -> Upload {
        Upload {
            file_name: Some("sunset.png".to_string()),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn create_req(title: &str) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            upload: Some(png()),
        }
    }

    #[tokio::test]
    async fn create_post_uploads_image_and_starts_empty() {
        let (service, media) = setup();

        let post = service
            .create_post(ALICE, create_req(" Sunset "))
            .await
            .expect("create must succeed");

        assert_eq!(post.title, "Sunset");
        assert_eq!(post.owner_id, ALICE.user_id);
        assert_eq!(post.like_count, 0);
        assert_eq!(post.comment_count, 0);
        assert_eq!(post.media.id, "media-1");
        assert_eq!(media.uploaded(), vec!["media-1".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected_before_upload() {
        let (service, media) = setup();
        service
            .create_post(ALICE, create_req("Sunset"))
            .await
            .expect("first create must succeed");

        let err = service
            .create_post(BOB, create_req("Sunset"))
            .await
            .expect_err("duplicate title must fail");

        assert!(matches!(err, DomainError::AlreadyExists(_)));
        assert_eq!(media.uploaded().len(), 1);
    }

    #[tokio::test]
    async fn like_toggles_membership_and_count() {
        let (service, _) = setup();
        let post = service
            .create_post(ALICE, create_req("Sunset"))
            .await
            .expect("create must succeed");

        let likes = service
            .toggle_like(BOB, post.id)
            .await
            .expect("like must succeed");
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].user_id, BOB.user_id);
        let liked = service.get_post(post.id).await.expect("post must exist");
        assert_eq!(liked.like_count, 1);

        let likes = service
            .toggle_like(BOB, post.id)
            .await
            .expect("unlike must succeed");
        assert!(likes.is_empty());
        let unliked = service.get_post(post.id).await.expect("post must exist");
        assert_eq!(unliked.like_count, 0);
    }

    #[tokio::test]
    async fn like_on_missing_post_is_not_found() {
        let (service, _) = setup();
        let err = service
            .toggle_like(BOB, 42)
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn stranger_cannot_delete_post_but_moderator_can() {
        let (service, media) = setup();
        let post = service
            .create_post(ALICE, create_req("Sunset"))
            .await
            .expect("create must succeed");

        let err = service
            .delete_post(BOB, post.id)
            .await
            .expect_err("stranger must not delete");
        assert!(matches!(err, DomainError::NotAuthorized));
        assert!(service.get_post(post.id).await.is_ok());

        service
            .delete_post(MODERATOR, post.id)
            .await
            .expect("moderator may delete");
        let missing = service
            .get_post(post.id)
            .await
            .expect_err("post must be gone");
        assert!(matches!(missing, DomainError::NotFound(_)));
        assert_eq!(media.removed(), vec![post.media.id]);
    }

    #[tokio::test]
    async fn update_is_owner_only_and_replaces_image() {
        let (service, media) = setup();
        let post = service
            .create_post(ALICE, create_req("Sunset"))
            .await
            .expect("create must succeed");

        let err = service
            .update_post(
                MODERATOR,
                post.id,
                UpdatePostRequest {
                    title: "Dawn".to_string(),
                    upload: None,
                },
            )
            .await
            .expect_err("moderator must not edit");
        assert!(matches!(err, DomainError::NotAuthorized));

        let updated = service
            .update_post(
                ALICE,
                post.id,
                UpdatePostRequest {
                    title: "Dawn".to_string(),
                    upload: Some(png()),
                },
            )
            .await
            .expect("owner may edit");
        assert_eq!(updated.title, "Dawn");
        assert_eq!(updated.media.id, "media-2");
        assert_eq!(media.removed(), vec!["media-1".to_string()]);
    }

    #[tokio::test]
    async fn comments_are_newest_first_and_owner_guarded() {
        let (service, _) = setup();
        let post = service
            .create_post(ALICE, create_req("Sunset"))
            .await
            .expect("create must succeed");

        service
            .add_comment(ALICE, post.id, CommentRequest { text: "first".to_string() })
            .await
            .expect("comment must succeed");
        let comments = service
            .add_comment(BOB, post.id, CommentRequest { text: " second ".to_string() })
            .await
            .expect("comment must succeed");
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "second");
        let bob_comment = comments[0].id;

        // владелец поста не может удалить чужой комментарий
        let err = service
            .delete_comment(ALICE, post.id, bob_comment)
            .await
            .expect_err("foreign comment must be protected");
        assert!(matches!(err, DomainError::NotAuthorized));
        let unchanged = service.get_post(post.id).await.expect("post must exist");
        assert_eq!(unchanged.comment_count, 2);

        let remaining = service
            .delete_comment(BOB, post.id, bob_comment)
            .await
            .expect("owner may delete own comment");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "first");
        let after = service.get_post(post.id).await.expect("post must exist");
        assert_eq!(after.comment_count, 1);
    }

    #[tokio::test]
    async fn deleting_unknown_comment_is_not_found() {
        let (service, _) = setup();
        let post = service
            .create_post(ALICE, create_req("Sunset"))
            .await
            .expect("create must succeed");

        let err = service
            .delete_comment(MODERATOR, post.id, 999)
            .await
            .expect_err("comment must be missing");
        match err {
            DomainError::NotFound(msg) => assert_eq!(msg, "Comment does not exist"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_filters_by_owner_newest_first() {
        let (service, _) = setup();
        for (actor, title) in [(ALICE, "One"), (BOB, "Two"), (ALICE, "Three")] {
            service
                .create_post(actor, create_req(title))
                .await
                .expect("create must succeed");
        }

        let all = service
            .list_posts(None, Pagination { limit: 10, offset: 0 })
            .await
            .expect("list all");
        assert_eq!(all.total, 3);
        assert_eq!(all.posts[0].title, "Three");

        let mine = service
            .list_posts(Some(ALICE.user_id), Pagination { limit: 1, offset: 0 })
            .await
            .expect("list own");
        assert_eq!(mine.total, 2);
        assert_eq!(mine.posts.len(), 1);
        assert_eq!(mine.posts[0].title, "Three");

        let second = service
            .list_posts(None, Pagination { limit: 2, offset: 1 })
            .await
            .expect("list from offset");
        assert_eq!((second.limit, second.offset), (2, 1));
        let titles: Vec<_> = second.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Two", "One"]);
    }
}
