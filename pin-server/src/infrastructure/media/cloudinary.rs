use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::debug;
use uuid::Uuid;

use crate::data::media_store::{MediaError, MediaStore};
use crate::domain::post::{Media, Upload};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Подписанные загрузки в Cloudinary image API.
pub(crate) struct CloudinaryMediaStore {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryMediaStore {
    pub(crate) fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        folder: Option<String>,
    ) -> Result<Self, MediaError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            folder,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{API_BASE}/{}/image/{action}", self.cloud_name)
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut hasher = Sha1::new();
        hasher.update(string_to_sign(params).as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Добавляет `api_key` и `signature` к подписываемым параметрам.
    fn signed_form(&self, params: &[(&str, &str)]) -> Form {
        let signature = self.sign(params);
        let form = params
            .iter()
            .fold(Form::new(), |form, (key, value)| {
                form.text(key.to_string(), value.to_string())
            });
        form.text("api_key", self.api_key.clone())
            .text("signature", signature)
    }

    async fn read_error(response: reqwest::Response) -> MediaError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        MediaError::Rejected(format!("status {status}: {body}"))
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, upload: &Upload) -> Result<Media, MediaError> {
        let public_id = Uuid::new_v4().simple().to_string();
        let timestamp = Utc::now().timestamp().to_string();

        let mut params = vec![("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())];
        if let Some(folder) = &self.folder {
            params.push(("folder", folder.as_str()));
        }

        let file = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone().unwrap_or_else(|| public_id.clone()))
            .mime_str(&upload.content_type)?;
        let form = self.signed_form(&params).part("file", file);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body = response.json::<UploadResponse>().await?;
        debug!(public_id = %body.public_id, "image uploaded");

        Ok(Media {
            id: body.public_id,
            url: body.secure_url,
        })
    }

    async fn remove(&self, media_id: &str) -> Result<(), MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let params = [
            ("invalidate", "true"),
            ("public_id", media_id),
            ("timestamp", timestamp.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(self.signed_form(&params))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body = response.json::<DestroyResponse>().await?;
        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(MediaError::Rejected(format!("destroy result: {other}"))),
        }
    }
}

/// Параметры, отсортированные по ключу и склеенные в `k=v&k=v` для подписи.
fn string_to_sign(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, value)| !value.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CloudinaryMediaStore {
        CloudinaryMediaStore::new("demo", "key", "secret", None).expect("client must build")
    }

    #[test]
    fn string_to_sign_sorts_and_skips_empty_values() {
        let raw = string_to_sign(&[("timestamp", "1"), ("public_id", "a"), ("folder", "")]);
        assert_eq!(raw, "public_id=a&timestamp=1");
    }

    #[test]
    fn signature_is_order_independent_hex_sha1() {
        let store = store();
        let a = store.sign(&[("timestamp", "1"), ("public_id", "a")]);
        let b = store.sign(&[("public_id", "a"), ("timestamp", "1")]);

        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn endpoint_includes_cloud_and_action() {
        assert_eq!(
            store().endpoint("destroy"),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }
}
