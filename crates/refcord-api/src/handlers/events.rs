//! Platform event ingress
//!
//! The shell posts every relevant gateway event here. A join that could not
//! be recorded answers 503 so the shell redelivers it.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use refcord_service::{EventOutcome, EventService, PlatformEvent};

use crate::extractors::ShellAuth;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Handle one forwarded event
///
/// POST /api/v1/events
pub async fn ingest_event(
    State(state): State<AppState>,
    _auth: ShellAuth,
    body: Result<Json<PlatformEvent>, JsonRejection>,
) -> ApiResult<Json<EventOutcome>> {
    let Json(event) = body.map_err(|e| ApiError::invalid_body(e.body_text()))?;

    let service = EventService::new(state.service_context());
    let outcome = service.dispatch(event).await?;
    Ok(Json(outcome))
}
