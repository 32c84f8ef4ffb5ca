use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use santa_core::EventPhase;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::{EventRecord, Settings};
use crate::AppState;

pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers
        .get("x-admin-password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided != state.config.admin_password {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

#[derive(Serialize)]
pub(crate) struct EventInfo {
    phase: EventPhase,
    registration_open: bool,
    assignments_generated: bool,
    participant_count: usize,
    gift_budget: u32,
}

pub(crate) async fn event_info(State(state): State<AppState>) -> Json<EventInfo> {
    let event = state.store.read().await;
    Json(EventInfo {
        phase: event.settings.phase,
        registration_open: event.settings.registration_open,
        assignments_generated: event.settings.assignments_generated,
        participant_count: event.participants.len(),
        gift_budget: state.config.gift_budget,
    })
}

#[derive(Deserialize)]
pub(crate) struct SettingsUpdate {
    phase: Option<EventPhase>,
    registration_open: Option<bool>,
}

pub(crate) async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SettingsUpdate>,
) -> Result<Json<Settings>, ApiError> {
    require_admin(&state, &headers)?;

    let settings = state
        .store
        .transact(|event| {
            if let Some(phase) = payload.phase {
                event.settings.phase = phase;
            }
            if let Some(open) = payload.registration_open {
                event.settings.registration_open = open;
            }
            Ok(event.settings.clone())
        })
        .await?;

    tracing::info!(
        phase = ?settings.phase,
        registration_open = settings.registration_open,
        "settings updated"
    );
    Ok(Json(settings))
}

#[derive(Deserialize)]
pub(crate) struct ResetRequest {
    confirm: String,
}

pub(crate) async fn reset_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ResetRequest>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    if payload.confirm != "RESET" {
        return Err(ApiError::BadRequest("type RESET to confirm".into()));
    }

    let cleared = state
        .store
        .transact(|event| {
            let cleared = event.participants.len();
            *event = EventRecord::default();
            Ok(cleared)
        })
        .await?;

    tracing::warn!(participants = cleared, "event reset");
    Ok(StatusCode::NO_CONTENT)
}
