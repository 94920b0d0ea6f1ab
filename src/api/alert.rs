//! Alert endpoint: maps an inbound user ID to a single notification

use std::sync::{Arc, LazyLock};

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use regex::Regex;
use serde::Deserialize;

use super::ApiState;

/// Platform user IDs are 17 to 20 digit snowflakes
static USER_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{17,20}$").expect("valid regex"));

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub user: Option<String>,
}

/// Whether `id` looks like a platform user ID
#[must_use]
pub fn is_valid_user_id(id: &str) -> bool {
    USER_ID_REGEX.is_match(id)
}

async fn alert(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AlertQuery>,
) -> (StatusCode, &'static str) {
    let Some(user_id) = query.user.filter(|u| !u.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "No user id provided");
    };

    if !is_valid_user_id(&user_id) {
        tracing::debug!(user_id = %user_id, "rejected malformed user id");
        return (StatusCode::BAD_REQUEST, "Invalid user id");
    }

    let response = state.notifier.send_alert(&user_id).await;
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, response.message)
}

/// Build alert router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/alert", get(alert))
        .with_state(state)
}
