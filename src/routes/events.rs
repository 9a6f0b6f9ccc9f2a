use axum::extract::{Extension, Multipart, Path, Query};
use axum::Json;
use serde::Deserialize;
use time::Date;

use crate::auth::Admin;
use crate::error::{ApiError, ApiResult};
use crate::models::event::{Event, EventCategory, EventDocument, EventLink};
use crate::models::{id_string, DATE_FORMAT};
use crate::routes::{normalize, ActionResponse, FormFields};
use crate::state::AppState;
use crate::storage::{Folder, UploadFile};
use crate::util::now_millis;

const STALE_PATHS: [&str; 2] = ["/events", "/admin/events"];

pub async fn create(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    multipart: Multipart,
) -> Json<ActionResponse> {
    match create_event(&state, multipart).await {
        Ok(response) => Json(response),
        Err(ApiError::BadRequest(message)) => Json(ActionResponse::failure(message)),
        Err(error) => {
            tracing::error!(error = %error, "failed to create event");
            // surfacing the raw failure locally saves a trip to the logs
            let message = if cfg!(debug_assertions) {
                format!("Failed to create event: {error}")
            } else {
                "Failed to create event".to_owned()
            };
            Json(ActionResponse::failure(message))
        }
    }
}

pub async fn update(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Json<ActionResponse> {
    normalize("update event", update_event(&state, &id, multipart).await)
}

pub async fn remove(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Json<ActionResponse> {
    normalize("delete event", delete_event(&state, &id).await)
}

pub async fn list(_admin: Admin, Extension(state): Extension<AppState>) -> Json<Vec<Event>> {
    all_events(&state).await
}

pub async fn get(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Json<Option<Event>> {
    match EventDocument::with_id(&id, &state.db).await {
        Ok(document) => Json(document.map(EventDocument::into_event)),
        Err(error) => {
            tracing::error!(error = %error, "failed to load event");
            Json(None)
        }
    }
}

pub async fn public_list(Extension(state): Extension<AppState>) -> Json<Vec<Event>> {
    all_events(&state).await
}

pub async fn upcoming(Extension(state): Extension<AppState>) -> Json<Vec<Event>> {
    into_views(EventDocument::upcoming(&state.db).await, "upcoming events")
}

#[derive(Deserialize)]
pub struct PastEventsQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn past(
    Extension(state): Extension<AppState>,
    Query(query): Query<PastEventsQuery>,
) -> Json<Vec<Event>> {
    let documents = if query.skip.is_some() || query.limit.is_some() {
        EventDocument::past_page(
            query.skip.unwrap_or(0),
            query.limit.unwrap_or(9),
            &state.db,
        )
        .await
    } else {
        EventDocument::past(&state.db).await
    };

    into_views(documents, "past events")
}

async fn all_events(state: &AppState) -> Json<Vec<Event>> {
    into_views(EventDocument::all(&state.db).await, "events")
}

/// Failed list reads degrade to an empty page rather than erroring it.
fn into_views(documents: ApiResult<Vec<EventDocument>>, what: &str) -> Json<Vec<Event>> {
    match documents {
        Ok(documents) => Json(
            documents
                .into_iter()
                .map(EventDocument::into_event)
                .collect(),
        ),
        Err(error) => {
            tracing::error!(error = %error, "failed to load {what}");
            Json(vec![])
        }
    }
}

async fn create_event(state: &AppState, multipart: Multipart) -> ApiResult<ActionResponse> {
    let fields = FormFields::from_multipart(multipart).await?;

    let title = fields.required("title", "Title")?.to_owned();
    let date = parse_date(fields.required("date", "Date")?)?;
    let location = fields.required("location", "Location")?.to_owned();
    let description = fields.required("description", "Description")?.to_owned();
    let category = parse_category(fields.required("category", "Category")?)?;
    let additional_link = parse_link(&fields);

    let image = match fields.file("image") {
        Some(file) => upload_event_image(state, file).await,
        None => None,
    };
    let additional_images = upload_gallery(state, fields.files("additionalImages")).await;

    let now = now_millis();
    let created = EventDocument {
        id: None,
        title,
        date,
        location,
        description,
        category,
        image,
        additional_images,
        additional_link,
        created_at: now,
        updated_at: now,
    }
    .create(&state.db)
    .await?;

    state.revalidator.revalidate_all(&STALE_PATHS).await;

    Ok(ActionResponse::created(id_string(&created.id)))
}

async fn update_event(
    state: &AppState,
    id: &str,
    multipart: Multipart,
) -> ApiResult<ActionResponse> {
    let existing = EventDocument::with_id(id, &state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Event not found".to_owned()))?;
    let fields = FormFields::from_multipart(multipart).await?;

    let mut updated = existing;
    if let Some(title) = fields.value("title") {
        updated.title = title.to_owned();
    }
    if let Some(date) = fields.value("date") {
        updated.date = parse_date(date)?;
    }
    if let Some(location) = fields.value("location") {
        updated.location = location.to_owned();
    }
    if let Some(description) = fields.value("description") {
        updated.description = description.to_owned();
    }
    if let Some(category) = fields.value("category") {
        updated.category = parse_category(category)?;
    }
    if let Some(link) = parse_link(&fields) {
        updated.additional_link = Some(link);
    } else if fields.flag("removeLink") {
        updated.additional_link = None;
    }

    // the replaced references are only deleted once the new document is
    // written, so a failure along the way never loses the current image
    let mut stale_references = Vec::new();

    if let Some(file) = fields.file("image") {
        if let Some(reference) = upload_event_image(state, file).await {
            if let Some(old) = updated.image.replace(reference) {
                stale_references.push(old);
            }
        }
    } else if fields.flag("deleteExistingImage") {
        if let Some(old) = updated.image.take() {
            stale_references.push(old);
        }
    }

    for reference in fields.list("removeAdditionalImage") {
        if let Some(position) = updated
            .additional_images
            .iter()
            .position(|existing| existing == &reference)
        {
            stale_references.push(updated.additional_images.remove(position));
        }
    }
    updated
        .additional_images
        .extend(upload_gallery(state, fields.files("additionalImages")).await);

    EventDocument::update(id, updated, &state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Event not found".to_owned()))?;

    delete_managed(state, &stale_references).await;
    state.revalidator.revalidate_all(&STALE_PATHS).await;

    Ok(ActionResponse::ok())
}

async fn delete_event(state: &AppState, id: &str) -> ApiResult<ActionResponse> {
    let existing = EventDocument::with_id(id, &state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Event not found".to_owned()))?;

    delete_managed(state, &existing.image_references()).await;
    EventDocument::delete(id, &state.db).await?;

    state.revalidator.revalidate_all(&STALE_PATHS).await;

    Ok(ActionResponse::ok())
}

/// Event photos are decoration, not data: a failed upload logs a warning
/// and the event is saved without it.
async fn upload_event_image(state: &AppState, file: &UploadFile) -> Option<String> {
    match state.storage.upload(file, Folder::Events).await {
        Ok(reference) => Some(reference),
        Err(error) => {
            tracing::warn!(error = %error, "failed to upload event image, saving event without it");
            None
        }
    }
}

async fn upload_gallery(state: &AppState, files: &[UploadFile]) -> Vec<String> {
    if files.is_empty() {
        return vec![];
    }

    match state.storage.upload_many(files, Folder::Events).await {
        Ok(references) => references,
        Err(error) => {
            tracing::warn!(error = %error, "failed to upload additional event images");
            vec![]
        }
    }
}

async fn delete_managed(state: &AppState, references: &[String]) {
    for reference in references {
        if state.storage.is_managed(reference) {
            state.storage.delete(reference).await;
        }
    }
}

fn parse_date(value: &str) -> ApiResult<String> {
    Date::parse(value, DATE_FORMAT)
        .map(|_| value.to_owned())
        .map_err(|_| ApiError::BadRequest("A valid date in YYYY-MM-DD format is required".to_owned()))
}

fn parse_category(value: &str) -> ApiResult<EventCategory> {
    EventCategory::parse(value).ok_or_else(|| {
        ApiError::BadRequest(
            "Category must be one of Community, Education, Health, Agriculture or National"
                .to_owned(),
        )
    })
}

fn parse_link(fields: &FormFields) -> Option<EventLink> {
    let url = fields.value("linkUrl")?.to_owned();
    let text = fields
        .value("linkText")
        .unwrap_or("Learn more")
        .to_owned();

    Some(EventLink { url, text })
}
