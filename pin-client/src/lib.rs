//! Клиентская библиотека для работы с pin-server по HTTP.
//!
//! `PinClient` хранит JWT из cookie `token` после регистрации или входа и
//! передаёт его в защищённые операции. Модуль [`auth_state`] описывает
//! состояние сессии на стороне клиента.
#![warn(missing_docs)]

pub mod auth_state;
mod error;
mod http_client;
mod models;

pub use auth_state::{AuthEvent, AuthState};
pub use error::{PinClientError, PinClientResult};
pub use models::{
    BlockEntry, Comment, CurrentUser, ImageFile, Like, ListPostsResponse, Post, Role, TokenStatus,
};

use http_client::HttpClient;

/// Адрес сервера по умолчанию.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
/// Клиент REST API pin-server.
pub struct PinClient {
    http_client: HttpClient,
    token: Option<String>,
}

impl PinClient {
    /// Создаёт клиент с базовым URL сервера, например `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> PinClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует обычного пользователя и сохраняет токен сессии.
    pub async fn register_user(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> PinClientResult<String> {
        let session = self
            .http_client
            .register("/api/users/user", name, email, password, None)
            .await?;
        self.token = Some(session.token);
        Ok(session.msg)
    }

    /// Регистрирует модератора и сохраняет токен сессии.
    pub async fn register_moderator(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> PinClientResult<String> {
        let session = self
            .http_client
            .register(
                "/api/users/moderator",
                name,
                email,
                password,
                Some("moderator"),
            )
            .await?;
        self.token = Some(session.token);
        Ok(session.msg)
    }

    /// Выполняет вход и сохраняет токен сессии.
    pub async fn login(&mut self, email: &str, password: &str) -> PinClientResult<String> {
        let session = self.http_client.login(email, password).await?;
        self.token = Some(session.token);
        Ok(session.msg)
    }

    /// Завершает сессию на сервере и очищает токен.
    pub async fn logout(&mut self) -> PinClientResult<String> {
        let token = self.require_token()?;
        let response = self.http_client.logout(token).await?;
        self.token = None;
        Ok(response.msg)
    }

    /// Возвращает текущего пользователя сессии.
    pub async fn me(&self) -> PinClientResult<CurrentUser> {
        self.http_client.me(self.require_token()?).await
    }

    /// Проверяет токен на сервере. Без токена возвращает [`TokenStatus::Missing`].
    pub async fn check(&self) -> PinClientResult<TokenStatus> {
        self.http_client.check(self.get_token()).await
    }

    /// Блокирует пользователя по email. Доступно только модератору.
    pub async fn block_user(&self, email: &str) -> PinClientResult<String> {
        let token = self.require_token()?;
        let response = self
            .http_client
            .block_user(token, "/api/users/block", email)
            .await?;
        Ok(response.msg)
    }

    /// Снимает блокировку с пользователя. Доступно только модератору.
    pub async fn unblock_user(&self, email: &str) -> PinClientResult<String> {
        let token = self.require_token()?;
        let response = self
            .http_client
            .block_user(token, "/api/users/unblock", email)
            .await?;
        Ok(response.msg)
    }

    /// Возвращает список заблокированных пользователей.
    pub async fn list_blocked(&self) -> PinClientResult<Vec<BlockEntry>> {
        self.http_client.list_blocked(self.require_token()?).await
    }

    /// Создаёт пост с изображением.
    pub async fn create_post(&self, title: &str, image: &ImageFile) -> PinClientResult<Post> {
        self.http_client
            .create_post(self.require_token()?, title, image)
            .await
    }

    /// Обновляет заголовок поста и, если передано, изображение.
    pub async fn update_post(
        &self,
        id: i64,
        title: &str,
        image: Option<&ImageFile>,
    ) -> PinClientResult<Post> {
        self.http_client
            .update_post(self.require_token()?, id, title, image)
            .await
    }

    /// Возвращает пост по идентификатору.
    pub async fn get_post(&self, id: i64) -> PinClientResult<Post> {
        self.http_client.get_post(self.require_token()?, id).await
    }

    /// Возвращает ленту постов, новые первыми.
    pub async fn list_posts(&self, limit: u32, offset: u32) -> PinClientResult<ListPostsResponse> {
        self.http_client
            .list_posts(self.require_token()?, "/api/posts", limit, offset)
            .await
    }

    /// Возвращает посты текущего пользователя.
    pub async fn list_own_posts(
        &self,
        limit: u32,
        offset: u32,
    ) -> PinClientResult<ListPostsResponse> {
        self.http_client
            .list_posts(self.require_token()?, "/api/posts/user", limit, offset)
            .await
    }

    /// Удаляет пост. Владелец или модератор.
    pub async fn delete_post(&self, id: i64) -> PinClientResult<String> {
        let response = self
            .http_client
            .delete_post(self.require_token()?, id)
            .await?;
        Ok(response.msg)
    }

    /// Ставит или снимает лайк, возвращает актуальный список лайков.
    pub async fn toggle_like(&self, id: i64) -> PinClientResult<Vec<Like>> {
        self.http_client
            .toggle_like(self.require_token()?, id)
            .await
    }

    /// Добавляет комментарий, возвращает актуальный список комментариев.
    pub async fn add_comment(&self, id: i64, text: &str) -> PinClientResult<Vec<Comment>> {
        self.http_client
            .add_comment(self.require_token()?, id, text)
            .await
    }

    /// Удаляет комментарий. Автор или модератор.
    pub async fn delete_comment(&self, id: i64, comment_id: i64) -> PinClientResult<Vec<Comment>> {
        self.http_client
            .delete_comment(self.require_token()?, id, comment_id)
            .await
    }

    fn require_token(&self) -> PinClientResult<&str> {
        self.token.as_deref().ok_or_else(|| {
            PinClientError::Unauthorized("No token, authorization denied".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn protected_calls_require_token() {
        let client = PinClient::new(DEFAULT_SERVER).expect("client must build");

        let err = client.me().await.expect_err("must fail without token");
        assert!(matches!(err, PinClientError::Unauthorized(_)));

        let err = client
            .delete_post(1)
            .await
            .expect_err("must fail without token");
        assert!(matches!(err, PinClientError::Unauthorized(_)));
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let mut client = PinClient::new(DEFAULT_SERVER).expect("client must build");
        assert!(client.get_token().is_none());

        client.set_token("abc");
        assert_eq!(client.get_token(), Some("abc"));

        client.clear_token();
        assert!(client.get_token().is_none());
    }
}
