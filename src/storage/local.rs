//! Filesystem storage under the site's public directory, for development
//! and single-host deployments.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::storage::{unique_file_name, Folder, Storage, UploadFile};

pub struct LocalStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }

    /// Maps a managed reference back to the file it names, refusing
    /// anything that would escape the upload directory.
    fn path_for(&self, reference: &str) -> Option<PathBuf> {
        let relative = reference
            .strip_prefix(&self.public_prefix)?
            .strip_prefix('/')?;

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return None;
        }

        Some(self.root.join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, file: &UploadFile, folder: Folder) -> ApiResult<String> {
        let directory = self.root.join(folder.as_str());
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|err| ApiError::Storage(format!("failed to create upload folder: {err}")))?;

        let file_name = unique_file_name(&file.name);
        tokio::fs::write(directory.join(&file_name), &file.content)
            .await
            .map_err(|err| ApiError::Storage(format!("failed to write upload: {err}")))?;

        Ok(format!(
            "{}/{}/{}",
            self.public_prefix,
            folder.as_str(),
            file_name
        ))
    }

    fn is_managed(&self, reference: &str) -> bool {
        reference.starts_with(&format!("{}/", self.public_prefix))
    }

    async fn delete(&self, reference: &str) {
        if !self.is_managed(reference) {
            tracing::debug!(reference, "skipping delete of unmanaged reference");
            return;
        }

        let Some(path) = self.path_for(reference) else {
            tracing::warn!(reference, "refusing to delete a path outside the upload folder");
            return;
        };

        if let Err(err) = tokio::fs::remove_file(&path).await {
            tracing::warn!(reference, error = %err, "failed to delete stored file");
        }
    }
}
