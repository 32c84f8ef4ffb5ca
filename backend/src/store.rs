use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use santa_core::{
    Assignment, AssignmentView, EventPhase, Pair, PairingError, Participant, ParticipantId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard};
use uuid::Uuid;

use crate::error::ApiError;
use crate::now_millis;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub phase: EventPhase,
    pub registration_open: bool,
    pub assignments_generated: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            phase: EventPhase::Registration,
            registration_open: true,
            assignments_generated: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub settings: Settings,
    pub participants: Vec<Participant>,
    pub assignments: Vec<Assignment>,
}

impl EventRecord {
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn replace_assignments<R>(&mut self, rng: &mut R) -> Result<usize, PairingError>
    where
        R: Rng + ?Sized,
    {
        let roster: Vec<ParticipantId> = self.participants.iter().map(|p| p.id.clone()).collect();
        let pairs = santa_core::generate(&roster, rng)?;

        let now = now_millis();
        self.assignments = pairs
            .into_iter()
            .map(|pair| Assignment::new(Uuid::new_v4().to_string(), pair, now))
            .collect();
        self.settings.assignments_generated = true;
        Ok(self.assignments.len())
    }

    pub fn views(&self) -> Vec<AssignmentView> {
        let index: HashMap<&str, &Participant> = self
            .participants
            .iter()
            .map(|p| (p.id.as_str(), p))
            .collect();
        santa_core::project(&self.assignments, |id| index.get(id).copied())
    }

    pub fn pairing_is_valid(&self) -> bool {
        let roster: Vec<&str> = self.participants.iter().map(|p| p.id.as_str()).collect();
        let pairs: Vec<Pair<&str>> = self
            .assignments
            .iter()
            .map(|a| Pair {
                gifter: a.gifter.as_str(),
                giftee: a.giftee.as_str(),
            })
            .collect();
        santa_core::is_valid_pairing(&roster, &pairs)
    }

    pub fn remove_participant(&mut self, id: &str) -> Option<usize> {
        let position = self.participants.iter().position(|p| p.id == id)?;
        self.participants.remove(position);
        let before = self.assignments.len();
        self.assignments.retain(|a| !a.involves(id));
        Some(before - self.assignments.len())
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

#[derive(Clone, Default)]
pub struct Store {
    event: Arc<RwLock<EventRecord>>,
    persist_path: Option<PathBuf>,
}

impl Store {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let event = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<EventRecord>(&bytes) {
                Ok(saved) => {
                    tracing::info!(
                        path = %path.display(),
                        participants = saved.participants.len(),
                        assignments = saved.assignments.len(),
                        "loaded event state"
                    );
                    saved
                }
                Err(err) => {
                    let aside = corrupt_path(&path);
                    match tokio::fs::rename(&path, &aside).await {
                        Ok(()) => tracing::warn!(
                            path = %path.display(),
                            moved_to = %aside.display(),
                            error = %err,
                            "unreadable state file moved aside, starting empty"
                        ),
                        Err(rename_err) => tracing::error!(
                            path = %path.display(),
                            error = %err,
                            rename_error = %rename_err,
                            "unreadable state file could not be moved aside"
                        ),
                    }
                    EventRecord::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => EventRecord::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read state file");
                EventRecord::default()
            }
        };

        Self {
            event: Arc::new(RwLock::new(event)),
            persist_path: Some(path),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, EventRecord> {
        self.event.read().await
    }

    /// Runs `mutate` under the write lock and persists the result. Any error,
    /// including a failed write, restores the state from before the call.
    pub async fn transact<T, F>(&self, mutate: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut EventRecord) -> Result<T, ApiError>,
    {
        let mut event = self.event.write().await;
        let before = event.clone();

        let value = match mutate(&mut *event) {
            Ok(value) => value,
            Err(err) => {
                *event = before;
                return Err(err);
            }
        };

        if let Err(err) = self.persist(&*event).await {
            tracing::error!(error = %err, "persist failed, rolling back");
            *event = before;
            return Err(err.into());
        }
        Ok(value)
    }

    async fn persist(&self, event: &EventRecord) -> Result<(), StoreError> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(event)?;
        // rename keeps the old snapshot whole if the write dies halfway
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
