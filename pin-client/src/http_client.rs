use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{PinClientError, PinClientResult};
use crate::models::{
    BlockEntry, Comment, CurrentUser, ImageFile, Like, ListPostsResponse, Post, TokenStatus,
};

/// Имя cookie с JWT сессии.
pub(crate) const SESSION_COOKIE: &str = "token";

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailDto<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct CommentRequestDto<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct ListPostsQuery {
    limit: u32,
    offset: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageDto {
    pub(crate) msg: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    errors: Vec<ErrorItemDto>,
}

#[derive(Debug, Deserialize)]
struct ErrorItemDto {
    msg: String,
}

/// Ответ регистрации или входа: сообщение сервера и токен из cookie.
#[derive(Debug)]
pub(crate) struct SessionResponse {
    pub(crate) msg: String,
    pub(crate) token: String,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `pin-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub(crate) fn new(base_url: impl Into<String>) -> PinClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.header(header::COOKIE, format!("{SESSION_COOKIE}={token}")),
            None => request,
        }
    }

    async fn decode_error(response: Response) -> PinClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) if !body.errors.is_empty() => Some(
                body.errors
                    .into_iter()
                    .map(|item| item.msg)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        };
        PinClientError::from_http_status(status, message)
    }

    /// универсальный helper: отправка запроса и разбор json-ответа
    async fn send<TRes>(&self, request: RequestBuilder) -> PinClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response.json::<TRes>().await?)
    }

    async fn send_for_session(&self, request: RequestBuilder) -> PinClientResult<SessionResponse> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let token = response
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(PinClientError::MissingSession)?;
        let body = response.json::<MessageDto>().await?;

        Ok(SessionResponse {
            msg: body.msg,
            token,
        })
    }

    fn post_form(title: &str, image: Option<&ImageFile>) -> PinClientResult<Form> {
        let form = Form::new().text("title", title.to_string());
        let Some(image) = image else {
            return Ok(form);
        };

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        Ok(form.part("file", part))
    }

    /// Регистрирует пользователя (`role = None`) или модератора (`role = Some("moderator")`).
    pub(crate) async fn register(
        &self,
        path: &str,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> PinClientResult<SessionResponse> {
        let payload = RegisterRequestDto {
            name,
            email,
            password,
            role,
        };
        self.send_for_session(self.request(Method::POST, path, None).json(&payload))
            .await
    }

    pub(crate) async fn login(&self, email: &str, password: &str) -> PinClientResult<SessionResponse> {
        let payload = LoginRequestDto { email, password };
        self.send_for_session(self.request(Method::POST, "/api/auth", None).json(&payload))
            .await
    }

    pub(crate) async fn logout(&self, token: &str) -> PinClientResult<MessageDto> {
        self.send(self.request(Method::DELETE, "/api/auth", Some(token)))
            .await
    }

    pub(crate) async fn me(&self, token: &str) -> PinClientResult<CurrentUser> {
        self.send(self.request(Method::GET, "/api/auth", Some(token)))
            .await
    }

    pub(crate) async fn check(&self, token: Option<&str>) -> PinClientResult<TokenStatus> {
        let response = self
            .request(Method::GET, "/api/auth/check", token)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(token_status(status, &body))
    }

    pub(crate) async fn block_user(
        &self,
        token: &str,
        path: &str,
        email: &str,
    ) -> PinClientResult<MessageDto> {
        let payload = EmailDto { email };
        self.send(self.request(Method::POST, path, Some(token)).json(&payload))
            .await
    }

    pub(crate) async fn list_blocked(&self, token: &str) -> PinClientResult<Vec<BlockEntry>> {
        self.send(self.request(Method::GET, "/api/users/blocked", Some(token)))
            .await
    }

    pub(crate) async fn create_post(
        &self,
        token: &str,
        title: &str,
        image: &ImageFile,
    ) -> PinClientResult<Post> {
        let form = Self::post_form(title, Some(image))?;
        self.send(
            self.request(Method::POST, "/api/posts", Some(token))
                .multipart(form),
        )
        .await
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        title: &str,
        image: Option<&ImageFile>,
    ) -> PinClientResult<Post> {
        let form = Self::post_form(title, image)?;
        self.send(
            self.request(Method::PUT, &format!("/api/posts/{id}"), Some(token))
                .multipart(form),
        )
        .await
    }

    pub(crate) async fn get_post(&self, token: &str, id: i64) -> PinClientResult<Post> {
        self.send(self.request(Method::GET, &format!("/api/posts/{id}"), Some(token)))
            .await
    }

    pub(crate) async fn list_posts(
        &self,
        token: &str,
        path: &str,
        limit: u32,
        offset: u32,
    ) -> PinClientResult<ListPostsResponse> {
        let query = ListPostsQuery { limit, offset };
        self.send(self.request(Method::GET, path, Some(token)).query(&query))
            .await
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> PinClientResult<MessageDto> {
        self.send(self.request(Method::DELETE, &format!("/api/posts/{id}"), Some(token)))
            .await
    }

    pub(crate) async fn toggle_like(&self, token: &str, id: i64) -> PinClientResult<Vec<Like>> {
        self.send(self.request(Method::PUT, &format!("/api/posts/react/{id}"), Some(token)))
            .await
    }

    pub(crate) async fn add_comment(
        &self,
        token: &str,
        id: i64,
        text: &str,
    ) -> PinClientResult<Vec<Comment>> {
        let payload = CommentRequestDto { text };
        self.send(
            self.request(Method::POST, &format!("/api/posts/comment/{id}"), Some(token))
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn delete_comment(
        &self,
        token: &str,
        id: i64,
        comment_id: i64,
    ) -> PinClientResult<Vec<Comment>> {
        self.send(self.request(
            Method::DELETE,
            &format!("/api/posts/comment/{id}/{comment_id}"),
            Some(token),
        ))
        .await
    }
}

fn token_status(status: StatusCode, body: &str) -> TokenStatus {
    match (status, body.trim()) {
        (StatusCode::OK, "Valid") => TokenStatus::Valid,
        (_, "No token") => TokenStatus::Missing,
        _ => TokenStatus::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:5000/").expect("client must build");
        let full = client.endpoint("/api/posts");
        assert_eq!(full, "http://localhost:5000/api/posts");
    }

    #[test]
    fn check_body_maps_to_token_status() {
        assert_eq!(token_status(StatusCode::OK, "Valid"), TokenStatus::Valid);
        assert_eq!(
            token_status(StatusCode::BAD_REQUEST, "No token"),
            TokenStatus::Missing
        );
        assert_eq!(
            token_status(StatusCode::BAD_REQUEST, "Invalid"),
            TokenStatus::Invalid
        );
    }

    #[test]
    fn register_payload_omits_member_role() {
        let payload = RegisterRequestDto {
            name: "Ann",
            email: "a@x.com",
            password: "secret1",
            role: None,
        };
        let json = serde_json::to_value(&payload).expect("must serialize");
        assert!(json.get("role").is_none());
    }

    #[test]
    fn error_body_parses_server_format() {
        let body: ErrorResponseDto =
            serde_json::from_str(r#"{"errors":[{"msg":"You are blocked"}]}"#)
                .expect("must parse");
        assert_eq!(body.errors[0].msg, "You are blocked");
    }
}
