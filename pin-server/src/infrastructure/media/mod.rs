use std::sync::Arc;

use anyhow::Result;

use crate::data::media_store::MediaStore;
use crate::infrastructure::settings::MediaSettings;

pub(crate) mod cloudinary;
pub(crate) mod local;

pub(crate) fn build_media_store(settings: &MediaSettings) -> Result<Arc<dyn MediaStore>> {
    let store: Arc<dyn MediaStore> = match settings {
        MediaSettings::Local { dir, public_url } => {
            Arc::new(local::LocalMediaStore::new(dir, public_url.clone()))
        }
        MediaSettings::Cloudinary {
            cloud_name,
            api_key,
            api_secret,
            folder,
        } => Arc::new(cloudinary::CloudinaryMediaStore::new(
            cloud_name.clone(),
            api_key.clone(),
            api_secret.clone(),
            folder.clone(),
        )?),
    };
    Ok(store)
}
