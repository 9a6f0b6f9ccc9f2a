//! The public forms that turn into mail instead of documents.

use axum::extract::{Extension, Form};
use axum::Json;

use crate::email::forms::{ContactSubmission, MembershipApplication, ScholarshipApplication};
use crate::email::Email;
use crate::routes::ActionResponse;
use crate::state::AppState;

pub async fn contact(
    Extension(state): Extension<AppState>,
    Form(mut submission): Form<ContactSubmission>,
) -> Json<ActionResponse> {
    submission.subject = clean(submission.subject.take());
    if submission.name.trim().is_empty()
        || submission.email.trim().is_empty()
        || submission.message.trim().is_empty()
    {
        return Json(ActionResponse::failure(
            "Name, email and message are required",
        ));
    }

    deliver(&state, submission, "Failed to send your message").await
}

pub async fn membership(
    Extension(state): Extension<AppState>,
    Form(mut application): Form<MembershipApplication>,
) -> Json<ActionResponse> {
    application.occupation = clean(application.occupation.take());
    application.city = clean(application.city.take());
    if application.name.trim().is_empty()
        || application.email.trim().is_empty()
        || application.phone.trim().is_empty()
        || application.motivation.trim().is_empty()
    {
        return Json(ActionResponse::failure(
            "Name, email, phone and motivation are required",
        ));
    }

    deliver(&state, application, "Failed to submit your application").await
}

pub async fn scholarship(
    Extension(state): Extension<AppState>,
    Form(mut application): Form<ScholarshipApplication>,
) -> Json<ActionResponse> {
    application.course = clean(application.course.take());
    if application.name.trim().is_empty()
        || application.email.trim().is_empty()
        || application.phone.trim().is_empty()
        || application.institution.trim().is_empty()
        || application.statement.trim().is_empty()
    {
        return Json(ActionResponse::failure(
            "Name, email, phone, institution and statement are required",
        ));
    }

    deliver(&state, application, "Failed to submit your application").await
}

async fn deliver(state: &AppState, mail: impl Email, failure: &str) -> Json<ActionResponse> {
    let Some(mailer) = &state.mailer else {
        tracing::error!("form submitted but outbound mail is not configured");
        return Json(ActionResponse::failure(failure));
    };

    match mailer.send(mail).await {
        Ok(()) => Json(ActionResponse::ok()),
        Err(error) => {
            tracing::error!(error = %error, "failed to deliver form mail");
            Json(ActionResponse::failure(failure))
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
