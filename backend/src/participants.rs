use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use santa_core::{EventPhase, Participant};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::admin::require_admin;
use crate::error::ApiError;
use crate::export::{csv_response, participants_csv};
use crate::{now_millis, AppState};

#[derive(Deserialize)]
pub(crate) struct RegisterRequest {
    name: String,
    emp_id: String,
    email: String,
    #[serde(default)]
    address: Option<String>,
    preferences: String,
}

#[derive(Serialize)]
pub(crate) struct RegisterResponse {
    participant_id: String,
}

#[derive(Deserialize)]
pub(crate) struct UpdateRequest {
    name: String,
    email: String,
    #[serde(default)]
    address: Option<String>,
    preferences: String,
}

fn clean_address(address: Option<&str>) -> Option<String> {
    address
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

pub(crate) async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    let emp_id = payload.emp_id.trim();
    let email = payload.email.trim().to_lowercase();
    let preferences = payload.preferences.trim();

    if name.is_empty() || emp_id.is_empty() || email.is_empty() || preferences.is_empty() {
        return Err(ApiError::BadRequest(
            "all fields except address are required".into(),
        ));
    }

    if let Some(domain) = &state.config.company_domain {
        if !email.ends_with(domain.as_str()) {
            return Err(ApiError::BadRequest(format!("email must be from {domain}")));
        }
    }

    let participant = Participant {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        emp_id: emp_id.to_string(),
        email,
        address: clean_address(payload.address.as_deref()),
        preferences: preferences.to_string(),
        registered_at: now_millis(),
    };

    let participant_id = state
        .store
        .transact(|event| {
            if !matches!(event.settings.phase, EventPhase::Registration)
                || !event.settings.registration_open
            {
                return Err(ApiError::Conflict("registration is closed".into()));
            }
            if event.participants.iter().any(|p| p.emp_id == participant.emp_id) {
                return Err(ApiError::Conflict("employee id already registered".into()));
            }
            if event.participants.iter().any(|p| p.email == participant.email) {
                return Err(ApiError::Conflict("email already registered".into()));
            }
            let id = participant.id.clone();
            event.participants.push(participant);
            Ok(id)
        })
        .await?;

    tracing::info!(%participant_id, "participant registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse { participant_id })))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Participant>>, ApiError> {
    require_admin(&state, &headers)?;
    let event = state.store.read().await;
    Ok(Json(event.participants.clone()))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<UpdateRequest>,
) -> Result<Json<Participant>, ApiError> {
    require_admin(&state, &headers)?;

    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    if name.is_empty() || email.is_empty() {
        return Err(ApiError::BadRequest("name and email required".into()));
    }

    let updated = state
        .store
        .transact(|event| {
            if event
                .participants
                .iter()
                .any(|p| p.id != participant_id && p.email == email)
            {
                return Err(ApiError::Conflict("email already registered".into()));
            }
            let participant = event
                .participants
                .iter_mut()
                .find(|p| p.id == participant_id)
                .ok_or(ApiError::NotFound("participant"))?;
            participant.name = name;
            participant.email = email;
            participant.address = clean_address(payload.address.as_deref());
            participant.preferences = payload.preferences.trim().to_string();
            Ok(participant.clone())
        })
        .await?;

    tracing::info!(participant_id = %updated.id, "participant updated");
    Ok(Json(updated))
}

pub(crate) async fn remove(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;

    let removed = state
        .store
        .transact(|event| {
            event
                .remove_participant(&participant_id)
                .ok_or(ApiError::NotFound("participant"))
        })
        .await?;

    tracing::info!(%participant_id, removed_assignments = removed, "participant deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn export(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    require_admin(&state, &headers)?;
    let body = {
        let event = state.store.read().await;
        participants_csv(&event.participants)?
    };
    Ok(csv_response("participants.csv", body))
}
