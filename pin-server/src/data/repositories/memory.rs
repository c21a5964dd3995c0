//! In-memory адаптеры для тестов сервисов и роутера.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::data::block_repository::BlockRepository;
use crate::data::media_store::{MediaError, MediaStore};
use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::block::BlockEntry;
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Like, Media, Post, Upload};
use crate::domain::user::User;

#[derive(Default)]
struct State {
    users: Vec<UserCredentials>,
    blocks: Vec<BlockEntry>,
    /// Старые первыми.
    posts: Vec<Post>,
    next_user_id: i64,
    next_block_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().expect("memory store mutex poisoned");
        f(&mut state)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        self.with_state(|state| {
            if state.users.iter().any(|c| c.user.email == input.email) {
                return Err(DomainError::AlreadyExists("User already exists".to_string()));
            }
            state.next_user_id += 1;
            let user = User::new(
                state.next_user_id,
                input.name,
                input.email,
                input.role,
                Utc::now(),
            )?;
            state.users.push(UserCredentials {
                user: user.clone(),
                password_hash: input.password_hash,
            });
            Ok(user)
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.with_state(|state| {
            state
                .users
                .iter()
                .find(|c| c.user.id == id)
                .map(|c| c.user.clone())
        }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self.with_state(|state| state.users.iter().find(|c| c.user.email == email).cloned()))
    }
}

#[async_trait]
impl BlockRepository for MemoryStore {
    async fn is_blocked(&self, user_id: i64) -> Result<bool, DomainError> {
        Ok(self.with_state(|state| state.blocks.iter().any(|b| b.user_id == user_id)))
    }

    async fn block(&self, user_id: i64, blocked_by: i64) -> Result<BlockEntry, DomainError> {
        self.with_state(|state| {
            if state.blocks.iter().any(|b| b.user_id == user_id) {
                return Err(DomainError::AlreadyExists("User already blocked".to_string()));
            }
            let email = state
                .users
                .iter()
                .find(|c| c.user.id == user_id)
                .map(|c| c.user.email.clone())
                .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;
            state.next_block_id += 1;
            let entry = BlockEntry {
                id: state.next_block_id,
                user_id,
                email,
                blocked_by,
                created_at: Utc::now(),
            };
            state.blocks.push(entry.clone());
            Ok(entry)
        })
    }

    async fn unblock(&self, user_id: i64) -> Result<bool, DomainError> {
        Ok(self.with_state(|state| {
            let before = state.blocks.len();
            state.blocks.retain(|b| b.user_id != user_id);
            state.blocks.len() != before
        }))
    }

    async fn list_blocked(&self) -> Result<Vec<BlockEntry>, DomainError> {
        Ok(self.with_state(|state| state.blocks.iter().rev().cloned().collect()))
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        self.with_state(|state| {
            if state.posts.iter().any(|p| p.title == input.title) {
                return Err(DomainError::AlreadyExists("Post already exists".to_string()));
            }
            state.next_post_id += 1;
            let now = Utc::now();
            let post = Post::new(
                state.next_post_id,
                input.owner_id,
                input.title,
                input.media,
                Vec::new(),
                0,
                Vec::new(),
                0,
                now,
                now,
            )?;
            state.posts.push(post.clone());
            Ok(post)
        })
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.with_state(|state| state.posts.iter().find(|p| p.id == id).cloned()))
    }

    async fn title_exists(&self, title: &str) -> Result<bool, DomainError> {
        Ok(self.with_state(|state| state.posts.iter().any(|p| p.title == title)))
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        self.with_state(|state| {
            if state
                .posts
                .iter()
                .any(|p| p.title == patch.title && p.id != post_id)
            {
                return Err(DomainError::AlreadyExists("Post already exists".to_string()));
            }
            let Some(post) = state
                .posts
                .iter_mut()
                .find(|p| p.id == post_id && p.owner_id == owner_id)
            else {
                return Ok(None);
            };
            post.title = patch.title;
            if let Some(media) = patch.media {
                post.media = media;
            }
            post.updated_at = Utc::now();
            Ok(Some(post.clone()))
        })
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.with_state(|state| {
            let before = state.posts.len();
            state.posts.retain(|p| p.id != id);
            state.posts.len() != before
        }))
    }

    async fn list_posts(
        &self,
        owner_id: Option<i64>,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let limit = pagination.limit as usize;
        let offset = pagination.offset as usize;
        Ok(self.with_state(|state| {
            state
                .posts
                .iter()
                .rev()
                .filter(|p| owner_id.is_none_or(|owner| p.owner_id == owner))
                .skip(offset)
                .take(limit)
                .cloned()
                .collect()
        }))
    }

    async fn total_posts(&self, owner_id: Option<i64>) -> Result<i64, DomainError> {
        Ok(self.with_state(|state| {
            state
                .posts
                .iter()
                .filter(|p| owner_id.is_none_or(|owner| p.owner_id == owner))
                .count() as i64
        }))
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<Vec<Like>>, DomainError> {
        Ok(self.with_state(|state| {
            let post = state.posts.iter_mut().find(|p| p.id == post_id)?;
            if post.is_liked_by(user_id) {
                post.likes.retain(|like| like.user_id != user_id);
                post.like_count -= 1;
            } else {
                post.likes.insert(
                    0,
                    Like {
                        user_id,
                        created_at: Utc::now(),
                    },
                );
                post.like_count += 1;
            }
            Some(post.likes.clone())
        }))
    }

    async fn add_comment(
        &self,
        post_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Vec<Comment>>, DomainError> {
        Ok(self.with_state(|state| {
            state.next_comment_id += 1;
            let id = state.next_comment_id;
            let post = state.posts.iter_mut().find(|p| p.id == post_id)?;
            post.comments.insert(
                0,
                Comment {
                    id,
                    text,
                    owner_id,
                    created_at: Utc::now(),
                },
            );
            post.comment_count += 1;
            Some(post.comments.clone())
        }))
    }

    async fn delete_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Vec<Comment>>, DomainError> {
        Ok(self.with_state(|state| {
            let post = state.posts.iter_mut().find(|p| p.id == post_id)?;
            let before = post.comments.len();
            post.comments.retain(|comment| comment.id != comment_id);
            if post.comments.len() == before {
                return None;
            }
            post.comment_count -= 1;
            Some(post.comments.clone())
        }))
    }
}

/// Запоминает загрузки и удаления вместо обращения к хостингу.
#[derive(Default)]
pub(crate) struct FakeMediaStore {
    uploads: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
}

impl FakeMediaStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn removed(&self) -> Vec<String> {
        self.removed
            .lock()
            .expect("removed mutex poisoned")
            .clone()
    }

    pub(crate) fn uploaded(&self) -> Vec<String> {
        self.uploads
            .lock()
            .expect("uploads mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn upload(&self, upload: &Upload) -> Result<Media, MediaError> {
        let mut uploads = self.uploads.lock().expect("uploads mutex poisoned");
        let id = format!("media-{}", uploads.len() + 1);
        uploads.push(id.clone());
        let ext = upload
            .content_type
            .strip_prefix("image/")
            .unwrap_or("bin")
            .to_string();
        Ok(Media {
            url: format!("/uploads/{id}.{ext}"),
            id,
        })
    }

    async fn remove(&self, media_id: &str) -> Result<(), MediaError> {
        self.removed
            .lock()
            .expect("removed mutex poisoned")
            .push(media_id.to_string());
        Ok(())
    }
}
