use async_trait::async_trait;
use thiserror::Error;

use crate::domain::post::{Media, Upload};

#[derive(Debug, Error)]
pub(crate) enum MediaError {
    #[error("media io failed")]
    Io(#[from] std::io::Error),

    #[error("media host request failed")]
    Http(#[from] reqwest::Error),

    #[error("media host rejected request: {0}")]
    Rejected(String),
}

/// Порт к хостингу изображений. Имена файлов выбирает реализация.
#[async_trait]
pub(crate) trait MediaStore: Send + Sync {
    async fn upload(&self, upload: &Upload) -> Result<Media, MediaError>;
    async fn remove(&self, media_id: &str) -> Result<(), MediaError>;
}
