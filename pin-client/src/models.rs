use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Роль пользователя.
pub enum Role {
    /// Обычный пользователь.
    Member,
    /// Модератор: может удалять чужие посты и комментарии, блокировать пользователей.
    Moderator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Текущий пользователь сессии (`GET /api/auth`).
pub struct CurrentUser {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Имя.
    pub name: String,
    /// Роль.
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Лайк поста.
pub struct Like {
    /// Кто поставил лайк.
    pub user_id: i64,
    /// Когда (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Текст.
    pub text: String,
    /// Автор комментария.
    pub owner_id: i64,
    /// Когда (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста (пина).
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Идентификатор владельца.
    pub owner_id: i64,
    /// Заголовок, уникальный среди всех постов.
    pub title: String,
    /// URL загруженного изображения.
    pub media_url: String,
    /// Лайки, новые первыми.
    pub likes: Vec<Like>,
    /// Количество лайков.
    pub like_count: i64,
    /// Комментарии, новые первыми.
    pub comments: Vec<Comment>,
    /// Количество комментариев.
    pub comment_count: i64,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ списка постов с параметрами пагинации.
pub struct ListPostsResponse {
    /// Список постов на текущей странице.
    pub posts: Vec<Post>,
    /// Размер страницы.
    pub limit: u32,
    /// Смещение от начала выборки.
    pub offset: u32,
    /// Общее количество постов.
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Запись о заблокированном пользователе.
pub struct BlockEntry {
    /// Идентификатор записи.
    pub id: i64,
    /// Заблокированный пользователь.
    pub user_id: i64,
    /// Его email.
    pub email: String,
    /// Модератор, выполнивший блокировку.
    pub blocked_by: i64,
    /// Когда (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Результат `GET /api/auth/check`.
pub enum TokenStatus {
    /// Токен действителен.
    Valid,
    /// Токен есть, но подпись или срок действия не прошли проверку.
    Invalid,
    /// Токен не передан.
    Missing,
}

#[derive(Debug, Clone)]
/// Изображение для загрузки в multipart-поле `file`.
pub struct ImageFile {
    /// Имя файла.
    pub file_name: String,
    /// MIME-тип, например `image/png`.
    pub content_type: String,
    /// Содержимое.
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Читает файл с диска, MIME-тип определяется по расширению.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();

        Ok(Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        })
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
