//! Local filesystem storage for uploaded media.
//!
//! Files are written under `<media_root>/profile_pictures/` keyed by the
//! uploaded filename. Writes are unsynchronized: two uploads with the same name
//! overwrite each other, last writer wins.

use std::path::PathBuf;

use thiserror::Error;

/// Sub-directory (and URL segment) for profile pictures.
pub const PROFILE_PICTURES_DIR: &str = "profile_pictures";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("media write to {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a successful media write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Sanitized filename, as persisted on the profile row.
    pub filename: String,
    /// Location on disk.
    pub path: PathBuf,
    /// Public URL clients use to fetch the file.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn profile_pictures_dir(&self) -> PathBuf {
        self.root.join(PROFILE_PICTURES_DIR)
    }

    /// Public URL for a stored profile picture.
    pub fn profile_picture_url(&self, filename: &str) -> String {
        format!("{}/media/{}/{}", self.base_url, PROFILE_PICTURES_DIR, filename)
    }

    /// Write a profile picture, creating the directory if absent.
    pub async fn save_profile_picture(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredMedia, MediaError> {
        let filename = sanitize_filename(original_name)?;
        let dir = self.profile_pictures_dir();

        tokio::fs::create_dir_all(&dir).await.map_err(|source| MediaError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(&filename);
        tokio::fs::write(&path, bytes).await.map_err(|source| MediaError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), len = bytes.len(), "profile picture written");

        Ok(StoredMedia {
            url: self.profile_picture_url(&filename),
            filename,
            path,
        })
    }
}

/// Reduce an uploaded name to its final path component.
///
/// Both `/` and `\` count as separators. Names that are empty or consist only
/// of dots after stripping are rejected.
pub fn sanitize_filename(raw: &str) -> Result<String, MediaError> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name.chars().all(|c| c == '.') || name.contains('\0') {
        return Err(MediaError::InvalidFilename(raw.to_string()));
    }
    Ok(name.to_string())
}
