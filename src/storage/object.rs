//! The external blob-service backend used by read-only deployments.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::storage::{unique_file_name, Folder, Storage, UploadFile};

pub struct ObjectStorage {
    api_url: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct UploadReceipt {
    url: String,
}

impl ObjectStorage {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Storage for ObjectStorage {
    async fn upload(&self, file: &UploadFile, folder: Folder) -> ApiResult<String> {
        let target = format!(
            "{}/{}/{}?addRandomSuffix=1",
            self.api_url,
            folder.as_str(),
            unique_file_name(&file.name)
        );

        let response = self
            .client
            .put(&target)
            .bearer_auth(&self.token)
            .body(file.content.clone())
            .send()
            .await
            .map_err(|err| ApiError::Storage(format!("blob upload request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Storage(format!(
                "blob service rejected the upload with status {}",
                response.status()
            )));
        }

        // the service answers with the final URL, random suffix included
        let receipt: UploadReceipt = response
            .json()
            .await
            .map_err(|err| ApiError::Storage(format!("unreadable blob upload receipt: {err}")))?;

        Ok(receipt.url)
    }

    fn is_managed(&self, reference: &str) -> bool {
        reference.starts_with(&self.api_url)
    }

    async fn delete(&self, reference: &str) {
        if !self.is_managed(reference) {
            tracing::debug!(reference, "skipping delete of unmanaged reference");
            return;
        }

        match self
            .client
            .delete(reference)
            .bearer_auth(&self.token)
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(
                    reference,
                    status = %response.status(),
                    "blob service refused the delete"
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(reference, error = %err, "blob delete request failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_service_urls_are_managed() {
        let storage = ObjectStorage::new("https://blob.example.com/sahyog/", "token");
        assert!(storage.is_managed("https://blob.example.com/sahyog/events/1-a.jpg"));
        assert!(!storage.is_managed("/uploads/events/1-a.jpg"));
        assert!(!storage.is_managed("/images/member-placeholder.png"));
    }
}
