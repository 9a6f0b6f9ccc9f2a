use axum::extract::{Extension, Multipart, Path};
use axum::Json;

use crate::auth::Admin;
use crate::error::{ApiError, ApiResult};
use crate::models::agm_report::{AgmReport, AgmReportDocument, YEAR_RANGE};
use crate::models::id_string;
use crate::routes::{normalize, ActionResponse, FormFields};
use crate::state::AppState;
use crate::storage::Folder;
use crate::util::now_millis;

const STALE_PATHS: [&str; 2] = ["/agm-reports", "/admin/agm-reports"];

pub async fn create(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    multipart: Multipart,
) -> Json<ActionResponse> {
    normalize("create AGM report", create_report(&state, multipart).await)
}

pub async fn update(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Json<ActionResponse> {
    normalize("update AGM report", update_report(&state, &id, multipart).await)
}

pub async fn remove(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Json<ActionResponse> {
    normalize("delete AGM report", delete_report(&state, &id).await)
}

pub async fn list(_admin: Admin, Extension(state): Extension<AppState>) -> Json<Vec<AgmReport>> {
    all_reports(&state).await
}

pub async fn get(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Json<Option<AgmReport>> {
    match AgmReportDocument::with_id(&id, &state.db).await {
        Ok(document) => Json(document.map(AgmReportDocument::into_report)),
        Err(error) => {
            tracing::error!(error = %error, "failed to load AGM report");
            Json(None)
        }
    }
}

pub async fn public_list(Extension(state): Extension<AppState>) -> Json<Vec<AgmReport>> {
    all_reports(&state).await
}

async fn all_reports(state: &AppState) -> Json<Vec<AgmReport>> {
    match AgmReportDocument::all(&state.db).await {
        Ok(documents) => Json(
            documents
                .into_iter()
                .map(AgmReportDocument::into_report)
                .collect(),
        ),
        Err(error) => {
            tracing::error!(error = %error, "failed to load AGM reports");
            Json(vec![])
        }
    }
}

async fn create_report(state: &AppState, multipart: Multipart) -> ApiResult<ActionResponse> {
    let fields = FormFields::from_multipart(multipart).await?;

    let title = fields.required("title", "Title")?.to_owned();
    let year = parse_year(fields.required("year", "Year")?)?;
    let description = fields.value("description").map(ToOwned::to_owned);

    // unlike event images, the PDF is the report: no file, no document
    let pdf = fields
        .file("pdf")
        .ok_or_else(|| ApiError::BadRequest("PDF file is required".to_owned()))?;
    let pdf_url = state.storage.upload(pdf, Folder::AgmReports).await?;

    let now = now_millis();
    let created = AgmReportDocument {
        id: None,
        title,
        year,
        description,
        pdf_url,
        created_at: now,
        updated_at: now,
    }
    .create(&state.db)
    .await?;

    state.revalidator.revalidate_all(&STALE_PATHS).await;

    Ok(ActionResponse::created(id_string(&created.id)))
}

async fn update_report(
    state: &AppState,
    id: &str,
    multipart: Multipart,
) -> ApiResult<ActionResponse> {
    let existing = AgmReportDocument::with_id(id, &state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest("AGM report not found".to_owned()))?;
    let fields = FormFields::from_multipart(multipart).await?;

    let mut updated = existing;
    if let Some(title) = fields.value("title") {
        updated.title = title.to_owned();
    }
    if let Some(year) = fields.value("year") {
        updated.year = parse_year(year)?;
    }
    if fields.has("description") {
        updated.description = fields.value("description").map(ToOwned::to_owned);
    }

    let mut stale_reference = None;
    if let Some(pdf) = fields.file("pdf") {
        let reference = state.storage.upload(pdf, Folder::AgmReports).await?;
        stale_reference = Some(std::mem::replace(&mut updated.pdf_url, reference));
    } else if fields.flag("deleteExistingPdf") {
        // a report cannot exist without its file
        return Err(ApiError::BadRequest("PDF file is required".to_owned()));
    }

    AgmReportDocument::update(id, updated, &state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest("AGM report not found".to_owned()))?;

    if let Some(reference) = stale_reference {
        if state.storage.is_managed(&reference) {
            state.storage.delete(&reference).await;
        }
    }
    state.revalidator.revalidate_all(&STALE_PATHS).await;

    Ok(ActionResponse::ok())
}

async fn delete_report(state: &AppState, id: &str) -> ApiResult<ActionResponse> {
    let existing = AgmReportDocument::with_id(id, &state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest("AGM report not found".to_owned()))?;

    if state.storage.is_managed(&existing.pdf_url) {
        state.storage.delete(&existing.pdf_url).await;
    }
    AgmReportDocument::delete(id, &state.db).await?;

    state.revalidator.revalidate_all(&STALE_PATHS).await;

    Ok(ActionResponse::ok())
}

fn parse_year(value: &str) -> ApiResult<i32> {
    value
        .parse::<i32>()
        .ok()
        .filter(|year| YEAR_RANGE.contains(year))
        .ok_or_else(|| ApiError::BadRequest("Year must be a number between 1900 and 2100".to_owned()))
}
