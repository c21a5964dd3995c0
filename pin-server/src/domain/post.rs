use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Like {
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) owner_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

/// Загруженное изображение, как его видит хранилище медиа.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Media {
    pub(crate) id: String,
    pub(crate) url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) owner_id: i64,
    pub(crate) title: String,
    pub(crate) media: Media,
    /// Новые первыми.
    pub(crate) likes: Vec<Like>,
    pub(crate) like_count: i64,
    /// Новые первыми.
    pub(crate) comments: Vec<Comment>,
    pub(crate) comment_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: i64,
        owner_id: i64,
        title: impl Into<String>,
        media: Media,
        likes: Vec<Like>,
        like_count: i64,
        comments: Vec<Comment>,
        comment_count: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("owner_id", owner_id)?;
        let title = normalize_title(&title.into())?;

        if like_count != likes.len() as i64 {
            return Err(DomainError::Validation {
                field: "like_count",
                message: "must equal the number of likes",
            });
        }
        if comment_count != comments.len() as i64 {
            return Err(DomainError::Validation {
                field: "comment_count",
                message: "must equal the number of comments",
            });
        }
        if updated_at < created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            id,
            owner_id,
            title,
            media,
            likes,
            like_count,
            comments,
            comment_count,
            created_at,
            updated_at,
        })
    }

    pub(crate) fn comment(&self, comment_id: i64) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == comment_id)
    }

    pub(crate) fn is_liked_by(&self, user_id: i64) -> bool {
        self.likes.iter().any(|like| like.user_id == user_id)
    }
}

/// Сырые байты изображения из запроса создания или обновления.
#[derive(Debug, Clone)]
pub(crate) struct Upload {
    pub(crate) file_name: Option<String>,
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

impl Upload {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if self.bytes.is_empty() {
            return Err(DomainError::Validation {
                field: "file",
                message: "Please upload an image",
            });
        }
        if !self.content_type.starts_with("image/") {
            return Err(DomainError::Validation {
                field: "file",
                message: "File must be an image",
            });
        }
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) upload: Option<Upload>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<(String, Upload), DomainError> {
        let title = normalize_title(&self.title)?;
        let upload = self
            .upload
            .ok_or(DomainError::Validation {
                field: "file",
                message: "Please upload an image",
            })?
            .validate()?;
        Ok((title, upload))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) upload: Option<Upload>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            upload: self.upload.map(Upload::validate).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CommentRequest {
    pub(crate) text: String,
}

impl CommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let text = self.text.trim();
        if text.is_empty() || text.chars().count() > 1000 {
            return Err(DomainError::Validation {
                field: "text",
                message: "Please enter a comment",
            });
        }
        Ok(Self {
            text: text.to_string(),
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "Please enter a title",
        });
    }
    Ok(title.to_string())
}
