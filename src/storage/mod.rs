//! File storage for uploaded images and PDFs.
//!
//! Two interchangeable backends exist: the external blob service used in
//! production and a local public-directory writer for development. Callers
//! treat references as opaque (root-relative paths from one backend,
//! absolute URLs from the other) and hand them back verbatim to `delete`.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::ApiResult;
use crate::util::now_millis;

pub mod local;
pub mod object;

pub use local::LocalStorage;
pub use object::ObjectStorage;

/// The logical folder an upload belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Folder {
    Events,
    Members,
    AgmReports,
}

impl Folder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Events => "events",
            Folder::Members => "members",
            Folder::AgmReports => "agm-reports",
        }
    }
}

/// An uploaded file as it comes off a multipart form.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub name: String,
    pub content: Vec<u8>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores the file under the folder and returns the reference to keep
    /// in the document.
    async fn upload(&self, file: &UploadFile, folder: Folder) -> ApiResult<String>;

    /// Uploads one file at a time, preserving input order in the returned
    /// references.
    async fn upload_many(&self, files: &[UploadFile], folder: Folder) -> ApiResult<Vec<String>> {
        let mut references = Vec::with_capacity(files.len());
        for file in files {
            references.push(self.upload(file, folder).await?);
        }
        Ok(references)
    }

    /// Whether the reference points at something this backend stored.
    /// Placeholder images and static assets are not managed and must never
    /// be deleted.
    fn is_managed(&self, reference: &str) -> bool;

    /// Best-effort removal. Failures are logged and swallowed so a stale
    /// file never blocks the document mutation that triggered the delete.
    async fn delete(&self, reference: &str);
}

/// Replaces every character other than ASCII alphanumerics, `.` and `-`
/// so uploaded names are safe as path segments and URLs.
pub fn sanitized_file_name(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9.-]").unwrap());

    unsafe_chars.replace_all(name, "_").into_owned()
}

/// A collision-resistant stored name: upload timestamp plus the sanitized
/// original name.
pub fn unique_file_name(original: &str) -> String {
    format!("{}-{}", now_millis(), sanitized_file_name(original))
}
