//! Session cookie endpoints.
//!
//! Tokens are issued by the upstream auth layer; the diary only knows how
//! to clear them.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::post;

use crate::app_state::AppState;

/// `POST /auth/logout` — Clear the token cookies.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    summary = "Log out",
    description = "Expires the `access_token` and `refresh_token` cookies.",
    responses(
        (status = 204, description = "Cookies cleared"),
    )
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let [access, refresh] = state.cookie_policy.clear_token_cookies();
    tracing::debug!("clearing token cookies");
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, access), (SET_COOKIE, refresh)]),
    )
}

/// Auth routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}
