//! # Local photo store
//!
//! Local filesystem implementation of `PhotoStore`.
//! Files land flat in the upload directory as `<hash>_<sanitized name>`; the
//! short content hash keeps two different `IMG_0001.jpg` uploads apart.

use std::path::PathBuf;

use anyhow::bail;
use async_trait::async_trait;
use domains::{PhotoStore, PhotoUpload, StoredPhoto};
use sha2::{Digest, Sha256};
use tokio::fs;

/// Hex characters of the content hash kept in the stored filename.
const HASH_PREFIX_LEN: usize = 12;

pub struct LocalPhotoStore {
    /// Root directory for all uploads (e.g., "./static/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static/uploads")
    url_prefix: String,
}

impl LocalPhotoStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root_path
    }
}

/// Reduces a client-supplied filename to something safe to join onto the
/// upload directory: ASCII alphanumerics plus `.`, `_` and `-`, whitespace
/// folded to `_`, any directory part and leading dots or underscores removed.
pub fn secure_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn save_photo(&self, upload: PhotoUpload) -> anyhow::Result<StoredPhoto> {
        let name = secure_filename(&upload.file_name);
        if name.is_empty() {
            bail!("unusable upload filename {:?}", upload.file_name);
        }

        let digest = hex::encode(Sha256::digest(&upload.data));
        let stored = format!("{}_{}", &digest[..HASH_PREFIX_LEN], name);
        let target = self.root_path.join(&stored);

        fs::create_dir_all(&self.root_path).await?;
        // Same hash and name means same bytes; keep the existing file.
        let fresh = !fs::try_exists(&target).await?;
        if fresh {
            fs::write(&target, &upload.data).await?;
        }

        tracing::debug!(file = %stored, bytes = upload.data.len(), fresh, "photo stored");
        Ok(StoredPhoto {
            filename: stored,
            fresh,
        })
    }

    async fn discard_photo(&self, filename: &str) -> anyhow::Result<()> {
        let name = secure_filename(filename);
        if name != filename {
            bail!("refusing to remove {filename:?} outside the upload directory");
        }
        match fs::remove_file(self.root_path.join(&name)).await {
            Ok(()) => {
                tracing::debug!(file = %name, "photo discarded");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn photo_url(&self, filename: &str) -> String {
        format!("{}/{}", self.url_prefix, filename)
    }
}
