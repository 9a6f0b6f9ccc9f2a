use axum::extract::{Extension, Form};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth;
use crate::routes::ActionResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    pub password: String,
}

pub async fn login(
    Extension(state): Extension<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    if !auth::authenticate(&form.password, &state.settings) {
        return Json(ActionResponse::failure("Incorrect password")).into_response();
    }

    let token = match auth::create_session(&state.settings) {
        Ok(token) => token,
        Err(error) => {
            tracing::error!(error = %error, "failed to create an admin session");
            return Json(ActionResponse::failure("Failed to log in")).into_response();
        }
    };

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&auth::session_cookie(&token)) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(error) => {
            tracing::error!(error = %error, "session cookie was not a valid header value");
            return Json(ActionResponse::failure("Failed to log in")).into_response();
        }
    }

    (headers, Json(ActionResponse::ok())).into_response()
}

pub async fn logout() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = HeaderValue::from_str(&auth::expired_session_cookie()) {
        headers.insert(SET_COOKIE, cookie);
    }

    (headers, Redirect::to(auth::LOGIN_PATH))
}
