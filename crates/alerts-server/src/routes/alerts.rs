use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::collections::HashMap;

use crate::alert;
use crate::error::AppError;
use crate::state::AppState;

/// `POST /alerts`: create an unread alert for a user.
pub async fn create_alert(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let body = alert::parse_body(&body)?;
    let created = alert::create(app.store.as_ref(), &body)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /alerts?userId=`: every alert for one user.
pub async fn list_alerts(
    State(app): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let alerts = alert::list(
        app.store.as_ref(),
        params.get("userId").map(String::as_str),
    )?;
    Ok(Json(serde_json::Value::Array(alerts)))
}

/// `PATCH /alerts/{id}`: set the `read` flag.
pub async fn update_alert(
    State(app): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body = alert::parse_body(&body)?;
    let updated = alert::mark_read(app.store.as_ref(), &id, &body)?;
    Ok(Json(updated))
}
