//! Staged X-ray files

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Bad local input, rejected before any network call
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Please select an image file ({file_name} is {content_type})")]
    NotAnImage {
        file_name: String,
        content_type: String,
    },
    #[error("Could not read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A user-selected image held client-side until analyzed
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    file_name: String,
    content_type: String,
    data: Arc<[u8]>,
}

impl StagedFile {
    /// Accepts any `image/*` content type
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        let content_type = content_type.into();

        if !is_image(&content_type) {
            return Err(ValidationError::NotAnImage {
                file_name,
                content_type,
            });
        }

        Ok(Self {
            file_name,
            content_type,
            data: data.into(),
        })
    }

    /// Read a file from disk, guessing its content type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| ValidationError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());

        Self::new(file_name, content_type, data)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

fn is_image(content_type: &str) -> bool {
    content_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}
