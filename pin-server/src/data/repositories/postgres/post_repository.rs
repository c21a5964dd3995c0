use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Like, Media, Post};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    owner_id: i64,
    title: String,
    media_id: String,
    media_url: String,
    like_count: i64,
    comment_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LikeRow {
    post_id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    owner_id: i64,
    text: String,
    created_at: DateTime<Utc>,
}

const POST_COLUMNS: &str =
    "id, owner_id, title, media_id, media_url, like_count, comment_count, created_at, updated_at";

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts (owner_id, title, media_id, media_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(input.owner_id)
        .bind(&input.title)
        .bind(&input.media.id)
        .bind(&input.media.url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row, Vec::new(), Vec::new())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(map_post_db_error)?;

        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_post_db_error)?;

        match row {
            Some(row) => Ok(hydrate(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn title_exists(&self, title: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE title = $1)")
            .bind(title)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(map_post_db_error)?;
        let (media_id, media_url) = match patch.media {
            Some(media) => (Some(media.id), Some(media.url)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE posts
            SET title = $3,
                media_id = COALESCE($4, media_id),
                media_url = COALESCE($5, media_url),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post_id)
        .bind(owner_id)
        .bind(&patch.title)
        .bind(media_id)
        .bind(media_url)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_post_db_error)?;

        match row {
            Some(row) => Ok(hydrate(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        owner_id: Option<i64>,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let limit = i64::from(pagination.limit);
        let offset = i64::from(pagination.offset);
        let mut conn = self.pool.acquire().await.map_err(map_post_db_error)?;

        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE ($1::BIGINT IS NULL OR owner_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await
        .map_err(map_post_db_error)?;

        hydrate(&mut conn, rows).await
    }

    async fn total_posts(&self, owner_id: Option<i64>) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE ($1::BIGINT IS NULL OR owner_id = $1)
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<Vec<Like>>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        if !lock_post(&mut tx, post_id).await? {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?
            .rows_affected();

        if removed > 0 {
            sqlx::query("UPDATE posts SET like_count = like_count - 1 WHERE id = $1")
                .bind(post_id)
                .execute(&mut *tx)
                .await
                .map_err(map_post_db_error)?;
        } else {
            sqlx::query("INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_post_db_error)?;
            sqlx::query("UPDATE posts SET like_count = like_count + 1 WHERE id = $1")
                .bind(post_id)
                .execute(&mut *tx)
                .await
                .map_err(map_post_db_error)?;
        }

        let likes = load_likes(&mut tx, &[post_id])
            .await?
            .remove(&post_id)
            .unwrap_or_default();
        tx.commit().await.map_err(map_post_db_error)?;

        Ok(Some(likes))
    }

    async fn add_comment(
        &self,
        post_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Vec<Comment>>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        if !lock_post(&mut tx, post_id).await? {
            return Ok(None);
        }

        sqlx::query("INSERT INTO post_comments (post_id, owner_id, text) VALUES ($1, $2, $3)")
            .bind(post_id)
            .bind(owner_id)
            .bind(&text)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;
        sqlx::query("UPDATE posts SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;

        let comments = load_comments(&mut tx, &[post_id])
            .await?
            .remove(&post_id)
            .unwrap_or_default();
        tx.commit().await.map_err(map_post_db_error)?;

        Ok(Some(comments))
    }

    async fn delete_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Vec<Comment>>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        if !lock_post(&mut tx, post_id).await? {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM post_comments WHERE id = $1 AND post_id = $2")
            .bind(comment_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?
            .rows_affected();
        if removed == 0 {
            return Ok(None);
        }

        sqlx::query("UPDATE posts SET comment_count = comment_count - 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;

        let comments = load_comments(&mut tx, &[post_id])
            .await?
            .remove(&post_id)
            .unwrap_or_default();
        tx.commit().await.map_err(map_post_db_error)?;

        Ok(Some(comments))
    }
}

/// Блокировка строки поста: изменения лайков и комментариев идут по очереди.
async fn lock_post(conn: &mut PgConnection, post_id: i64) -> Result<bool, DomainError> {
    let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
        .bind(post_id)
        .fetch_optional(conn)
        .await
        .map_err(map_post_db_error)?;
    Ok(locked.is_some())
}

async fn hydrate(conn: &mut PgConnection, rows: Vec<PostRow>) -> Result<Vec<Post>, DomainError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut likes = load_likes(conn, &ids).await?;
    let mut comments = load_comments(conn, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let post_likes = likes.remove(&row.id).unwrap_or_default();
            let post_comments = comments.remove(&row.id).unwrap_or_default();
            map_row_to_post(row, post_likes, post_comments)
        })
        .collect()
}

async fn load_likes(
    conn: &mut PgConnection,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<Like>>, DomainError> {
    let rows = sqlx::query_as::<_, LikeRow>(
        r#"
        SELECT post_id, user_id, created_at
        FROM post_likes
        WHERE post_id = ANY($1)
        ORDER BY created_at DESC, user_id DESC
        "#,
    )
    .bind(post_ids)
    .fetch_all(conn)
    .await
    .map_err(map_post_db_error)?;

    let mut grouped: HashMap<i64, Vec<Like>> = HashMap::new();
    for row in rows {
        grouped.entry(row.post_id).or_default().push(Like {
            user_id: row.user_id,
            created_at: row.created_at,
        });
    }
    Ok(grouped)
}

async fn load_comments(
    conn: &mut PgConnection,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<Comment>>, DomainError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT id, post_id, owner_id, text, created_at
        FROM post_comments
        WHERE post_id = ANY($1)
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(post_ids)
    .fetch_all(conn)
    .await
    .map_err(map_post_db_error)?;

    let mut grouped: HashMap<i64, Vec<Comment>> = HashMap::new();
    for row in rows {
        grouped.entry(row.post_id).or_default().push(Comment {
            id: row.id,
            text: row.text,
            owner_id: row.owner_id,
            created_at: row.created_at,
        });
    }
    Ok(grouped)
}

fn map_row_to_post(
    row: PostRow,
    likes: Vec<Like>,
    comments: Vec<Comment>,
) -> Result<Post, DomainError> {
    Post::new(
        row.id,
        row.owner_id,
        row.title,
        Media {
            id: row.media_id,
            url: row.media_url,
        },
        likes,
        row.like_count,
        comments,
        row.comment_count,
        row.created_at,
        row.updated_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return DomainError::AlreadyExists("Post already exists".to_string()),
            Some("23503") => return DomainError::NotFound("User not found".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
