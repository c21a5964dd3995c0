use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::data::media_store::{MediaError, MediaStore};
use crate::domain::post::{Media, Upload};

/// Хранит изображения в `root` и отдаёт их по `public_url`.
pub(crate) struct LocalMediaStore {
    root: PathBuf,
    public_url: String,
}

impl LocalMediaStore {
    pub(crate) fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, upload: &Upload) -> Result<Media, MediaError> {
        let id = format!(
            "{}.{}",
            Uuid::new_v4().simple(),
            extension_for(&upload.content_type, upload.file_name.as_deref())
        );

        fs::create_dir_all(&self.root).await?;
        fs::write(self.root.join(&id), &upload.bytes).await?;

        Ok(Media {
            url: format!("{}/{}", self.public_url, id),
            id,
        })
    }

    async fn remove(&self, media_id: &str) -> Result<(), MediaError> {
        if media_id.is_empty() || media_id.contains(['/', '\\']) || media_id.starts_with('.') {
            return Err(MediaError::Rejected(format!("invalid media id '{media_id}'")));
        }

        match fs::remove_file(self.root.join(media_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn extension_for(content_type: &str, file_name: Option<&str>) -> String {
    let from_mime = match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    };
    if let Some(ext) = from_mime {
        return ext.to_string();
    }

    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "img".to_string())
}
