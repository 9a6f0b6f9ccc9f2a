//! The HTTP surface: admin actions, public reads and the outreach forms.
//!
//! Every admin mutation follows the same order: require a session, parse
//! and validate the form, move files into storage, write the document,
//! then flag the affected page paths as stale. All outcomes leave as a
//! redirect, a `null`, or a `{success, id?, error?}` record.

use std::collections::HashMap;

use axum::extract::{Extension, Multipart};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::storage::UploadFile;

pub mod auth;
pub mod events;
pub mod members;
pub mod outreach;
pub mod reports;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/login", post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/events", get(events::list).post(events::create))
        .route(
            "/admin/events/:id",
            get(events::get).post(events::update).delete(events::remove),
        )
        .route("/admin/members", get(members::list).post(members::create))
        .route(
            "/admin/members/:id",
            get(members::get)
                .post(members::update)
                .delete(members::remove),
        )
        .route("/admin/agm-reports", get(reports::list).post(reports::create))
        .route(
            "/admin/agm-reports/:id",
            get(reports::get)
                .post(reports::update)
                .delete(reports::remove),
        )
        .route("/events", get(events::public_list))
        .route("/events/upcoming", get(events::upcoming))
        .route("/events/past", get(events::past))
        .route("/members", get(members::public_list))
        .route("/agm-reports", get(reports::public_list))
        .route("/contact", post(outreach::contact))
        .route("/membership", post(outreach::membership))
        .route("/scholarship", post(outreach::scholarship))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
}

/// What every admin action answers with.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            id: None,
            error: None,
        }
    }

    pub fn created(id: String) -> Self {
        Self {
            success: true,
            id: Some(id),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(error.into()),
        }
    }
}

/// Converts an action's outcome into its wire shape. Validation messages
/// pass through for the form to display inline; anything else is logged
/// here and replaced with a generic message.
pub fn normalize(action: &str, result: ApiResult<ActionResponse>) -> Json<ActionResponse> {
    match result {
        Ok(response) => Json(response),
        Err(ApiError::BadRequest(message)) => Json(ActionResponse::failure(message)),
        Err(error) => {
            tracing::error!(error = %error, "failed to {action}");
            Json(ActionResponse::failure(format!("Failed to {action}")))
        }
    }
}

/// A submitted multipart form, collected into plain values and files.
///
/// The admin forms evolve independently of this API, so unknown fields are
/// collected and ignored rather than rejected; the per-entity parsers pick
/// out what they need and validate it.
#[derive(Default)]
pub struct FormFields {
    values: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadFile>>,
}

impl FormFields {
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut fields = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::BadRequest(format!("Unreadable form submission: {err}")))?
        {
            let name = field.name().unwrap_or_default().to_owned();

            if let Some(file_name) = field.file_name() {
                let file_name = file_name.to_owned();
                let content = field
                    .bytes()
                    .await
                    .map_err(|err| {
                        ApiError::BadRequest(format!("Unreadable form submission: {err}"))
                    })?
                    .to_vec();

                // browsers submit empty file inputs as nameless zero-byte parts
                if file_name.is_empty() || content.is_empty() {
                    continue;
                }

                fields.files.entry(name).or_default().push(UploadFile {
                    name: file_name,
                    content,
                });
            } else {
                let value = field.text().await.map_err(|err| {
                    ApiError::BadRequest(format!("Unreadable form submission: {err}"))
                })?;
                fields.values.entry(name).or_default().push(value);
            }
        }

        Ok(fields)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)?
            .first()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn required(&self, name: &str, label: &str) -> ApiResult<&str> {
        self.value(name)
            .ok_or_else(|| ApiError::BadRequest(format!("{label} is required")))
    }

    /// All non-empty values submitted under a repeated field name.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.values
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .map(|value| value.trim().to_owned())
                    .filter(|value| !value.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The `"true"`-string convention the admin forms use for checkboxes.
    pub fn flag(&self, name: &str) -> bool {
        self.value(name) == Some("true")
    }

    pub fn file(&self, name: &str) -> Option<&UploadFile> {
        self.files.get(name)?.first()
    }

    pub fn files(&self, name: &str) -> &[UploadFile] {
        self.files
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
