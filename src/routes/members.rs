use axum::extract::{Extension, Multipart, Path};
use axum::Json;

use crate::auth::Admin;
use crate::error::{ApiError, ApiResult};
use crate::models::id_string;
use crate::models::member::{
    initials, Member, MemberCategory, MemberDocument, PLACEHOLDER_IMAGE,
};
use crate::routes::{normalize, ActionResponse, FormFields};
use crate::state::AppState;
use crate::storage::{Folder, UploadFile};
use crate::util::now_millis;

const STALE_PATHS: [&str; 2] = ["/members", "/admin/members"];

pub async fn create(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    multipart: Multipart,
) -> Json<ActionResponse> {
    normalize("create member", create_member(&state, multipart).await)
}

pub async fn update(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Json<ActionResponse> {
    normalize("update member", update_member(&state, &id, multipart).await)
}

pub async fn remove(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Json<ActionResponse> {
    normalize("delete member", delete_member(&state, &id).await)
}

pub async fn list(_admin: Admin, Extension(state): Extension<AppState>) -> Json<Vec<Member>> {
    all_members(&state).await
}

pub async fn get(
    _admin: Admin,
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Json<Option<Member>> {
    match MemberDocument::with_id(&id, &state.db).await {
        Ok(document) => Json(document.map(MemberDocument::into_member)),
        Err(error) => {
            tracing::error!(error = %error, "failed to load member");
            Json(None)
        }
    }
}

pub async fn public_list(Extension(state): Extension<AppState>) -> Json<Vec<Member>> {
    all_members(&state).await
}

async fn all_members(state: &AppState) -> Json<Vec<Member>> {
    match MemberDocument::all(&state.db).await {
        Ok(documents) => Json(
            documents
                .into_iter()
                .map(MemberDocument::into_member)
                .collect(),
        ),
        Err(error) => {
            tracing::error!(error = %error, "failed to load members");
            Json(vec![])
        }
    }
}

async fn create_member(state: &AppState, multipart: Multipart) -> ApiResult<ActionResponse> {
    let fields = FormFields::from_multipart(multipart).await?;

    let name = fields.required("name", "Name")?.to_owned();
    let position = fields.required("position", "Position")?.to_owned();
    let category = parse_category(fields.required("category", "Category")?)?;
    let sort_order = match fields.value("order") {
        Some(raw) => parse_order(raw)?,
        None => MemberDocument::next_order_in(category, &state.db).await?,
    };

    let image = match fields.file("image") {
        Some(file) => upload_member_image(state, file)
            .await
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
        None => PLACEHOLDER_IMAGE.to_owned(),
    };

    let now = now_millis();
    let created = MemberDocument {
        id: None,
        fallback: initials(&name),
        name,
        position,
        category,
        image,
        bio: fields.value("bio").map(ToOwned::to_owned),
        achievements: fields.list("achievements"),
        sort_order,
        created_at: now,
        updated_at: now,
    }
    .create(&state.db)
    .await?;

    state.revalidator.revalidate_all(&STALE_PATHS).await;

    Ok(ActionResponse::created(id_string(&created.id)))
}

async fn update_member(
    state: &AppState,
    id: &str,
    multipart: Multipart,
) -> ApiResult<ActionResponse> {
    let existing = MemberDocument::with_id(id, &state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Member not found".to_owned()))?;
    let fields = FormFields::from_multipart(multipart).await?;

    let mut updated = existing;
    if let Some(name) = fields.value("name") {
        updated.name = name.to_owned();
        updated.fallback = initials(name);
    }
    if let Some(position) = fields.value("position") {
        updated.position = position.to_owned();
    }
    if let Some(category) = fields.value("category") {
        updated.category = parse_category(category)?;
    }
    if let Some(order) = fields.value("order") {
        updated.sort_order = parse_order(order)?;
    }
    if fields.has("bio") {
        updated.bio = fields.value("bio").map(ToOwned::to_owned);
    }
    if fields.has("achievements") || fields.flag("clearAchievements") {
        updated.achievements = fields.list("achievements");
    }

    let mut stale_references = Vec::new();

    if let Some(file) = fields.file("image") {
        if let Some(reference) = upload_member_image(state, file).await {
            let old = std::mem::replace(&mut updated.image, reference);
            stale_references.push(old);
        }
    } else if fields.flag("deleteExistingImage") {
        let old = std::mem::replace(&mut updated.image, PLACEHOLDER_IMAGE.to_owned());
        stale_references.push(old);
    }

    MemberDocument::update(id, updated, &state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Member not found".to_owned()))?;

    for reference in &stale_references {
        if state.storage.is_managed(reference) {
            state.storage.delete(reference).await;
        }
    }
    state.revalidator.revalidate_all(&STALE_PATHS).await;

    Ok(ActionResponse::ok())
}

async fn delete_member(state: &AppState, id: &str) -> ApiResult<ActionResponse> {
    let existing = MemberDocument::with_id(id, &state.db)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Member not found".to_owned()))?;

    // the shared placeholder is not managed storage and survives this
    if state.storage.is_managed(&existing.image) {
        state.storage.delete(&existing.image).await;
    }
    MemberDocument::delete(id, &state.db).await?;

    state.revalidator.revalidate_all(&STALE_PATHS).await;

    Ok(ActionResponse::ok())
}

/// Member photos follow the event soft-fail policy: the placeholder makes
/// a member without an upload perfectly valid.
async fn upload_member_image(state: &AppState, file: &UploadFile) -> Option<String> {
    match state.storage.upload(file, Folder::Members).await {
        Ok(reference) => Some(reference),
        Err(error) => {
            tracing::warn!(error = %error, "failed to upload member photo, keeping the placeholder");
            None
        }
    }
}

fn parse_category(value: &str) -> ApiResult<MemberCategory> {
    MemberCategory::parse(value).ok_or_else(|| {
        ApiError::BadRequest(
            "Category must be one of Patron, Core Team or Vice President".to_owned(),
        )
    })
}

fn parse_order(value: &str) -> ApiResult<i64> {
    value
        .parse::<i64>()
        .ok()
        .filter(|order| *order >= 0)
        .ok_or_else(|| ApiError::BadRequest("Order must be a non-negative number".to_owned()))
}
