use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use santa_core::{Assignment, AssignmentView, EventPhase, Participant, ParticipantId};
use serde::{Deserialize, Serialize};

use crate::admin::require_admin;
use crate::error::ApiError;
use crate::export::{assignments_csv, csv_response};
use crate::store::EventRecord;
use crate::{now_millis, AppState};

#[derive(Deserialize)]
pub(crate) struct GenerateParams {
    seed: Option<u64>,
}

#[derive(Serialize)]
pub(crate) struct GenerateResponse {
    count: usize,
}

#[derive(Deserialize)]
pub(crate) struct OverrideRequest {
    giftee_id: ParticipantId,
}

#[derive(Serialize)]
pub(crate) struct OverrideResponse {
    assignment: Assignment,
    pairing_valid: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GifteeProfile {
    name: String,
    preferences: String,
    address: Option<String>,
}

impl From<&Participant> for GifteeProfile {
    fn from(p: &Participant) -> Self {
        Self {
            name: p.name.clone(),
            preferences: p.preferences.clone(),
            address: p.address.clone(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct GifterSide {
    assignment_id: String,
    revealed: bool,
    revealed_at: Option<u64>,
    giftee: Option<GifteeProfile>,
}

#[derive(Serialize)]
pub(crate) struct GifteeSide {
    assignment_id: String,
    gifter_revealed: bool,
}

#[derive(Serialize)]
pub(crate) struct PairingLookup {
    as_gifter: Option<GifterSide>,
    as_giftee: Option<GifteeSide>,
}

#[derive(Serialize)]
pub(crate) struct RevealResponse {
    assignment_id: String,
    revealed_at: Option<u64>,
    giftee: GifteeProfile,
}

pub(crate) async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GenerateParams>,
) -> Result<Json<GenerateResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let mut rng = params
        .seed
        .map(ChaCha8Rng::seed_from_u64)
        .unwrap_or_else(|| ChaCha8Rng::from_entropy());

    let count = state
        .store
        .transact(|event| Ok(event.replace_assignments(&mut rng)?))
        .await?;

    tracing::info!(count, seeded = params.seed.is_some(), "assignments generated");
    Ok(Json(GenerateResponse { count }))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AssignmentView>>, ApiError> {
    require_admin(&state, &headers)?;
    let event = state.store.read().await;
    Ok(Json(event.views()))
}

pub(crate) async fn export(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    require_admin(&state, &headers)?;
    let body = {
        let event = state.store.read().await;
        assignments_csv(&event.views())?
    };
    Ok(csv_response("assignments.csv", body))
}

pub(crate) async fn override_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<OverrideRequest>,
) -> Result<Json<OverrideResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let response = state
        .store
        .transact(|event| {
            let assignment = event
                .assignments
                .iter_mut()
                .find(|a| a.id == assignment_id)
                .ok_or(ApiError::NotFound("assignment"))?;
            if !event.participants.iter().any(|p| p.id == payload.giftee_id) {
                return Err(ApiError::NotFound("participant"));
            }
            assignment.override_giftee(payload.giftee_id.clone())?;
            let assignment = assignment.clone();
            Ok(OverrideResponse {
                assignment,
                pairing_valid: event.pairing_is_valid(),
            })
        })
        .await?;

    if response.pairing_valid {
        tracing::info!(%assignment_id, giftee = %payload.giftee_id, "assignment overridden");
    } else {
        tracing::warn!(
            %assignment_id,
            giftee = %payload.giftee_id,
            "assignment overridden; set no longer satisfies pairing guarantees"
        );
    }
    Ok(Json(response))
}

fn require_exchange(event: &EventRecord) -> Result<(), ApiError> {
    if !matches!(event.settings.phase, EventPhase::Exchange) {
        return Err(ApiError::Conflict("gift exchange has not started".into()));
    }
    Ok(())
}

pub(crate) async fn lookup(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> Result<Json<PairingLookup>, ApiError> {
    let event = state.store.read().await;
    if event.participant(&participant_id).is_none() {
        return Err(ApiError::NotFound("participant"));
    }
    require_exchange(&event)?;

    let found = santa_core::pairings_for(&event.assignments, &participant_id);
    if found.as_gifter.is_none() && found.as_giftee.is_none() {
        return Err(ApiError::NotFound("assignment"));
    }

    let as_gifter = found.as_gifter.map(|a| GifterSide {
        assignment_id: a.id.clone(),
        revealed: a.is_revealed(),
        revealed_at: a.revealed_at,
        giftee: a
            .is_revealed()
            .then(|| event.participant(&a.giftee))
            .flatten()
            .map(GifteeProfile::from),
    });
    let as_giftee = found.as_giftee.map(|a| GifteeSide {
        assignment_id: a.id.clone(),
        gifter_revealed: a.is_revealed(),
    });

    Ok(Json(PairingLookup {
        as_gifter,
        as_giftee,
    }))
}

pub(crate) async fn reveal(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> Result<Json<RevealResponse>, ApiError> {
    let response = state
        .store
        .transact(|event| {
            if event.participant(&participant_id).is_none() {
                return Err(ApiError::NotFound("participant"));
            }
            require_exchange(event)?;

            let assignment = event
                .assignments
                .iter_mut()
                .find(|a| a.gifter == participant_id)
                .ok_or(ApiError::NotFound("assignment"))?;
            assignment.reveal(now_millis())?;
            let assignment = assignment.clone();

            let giftee = event
                .participant(&assignment.giftee)
                .map(GifteeProfile::from)
                .ok_or(ApiError::NotFound("participant"))?;
            Ok(RevealResponse {
                assignment_id: assignment.id,
                revealed_at: assignment.revealed_at,
                giftee,
            })
        })
        .await?;

    tracing::info!(
        %participant_id,
        assignment_id = %response.assignment_id,
        "giftee revealed"
    );
    Ok(Json(response))
}
