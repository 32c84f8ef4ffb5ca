use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod pairing;

pub use pairing::{
    generate, generate_with, is_valid_pairing, rotation, Pair, MAX_ATTEMPTS, MIN_PARTICIPANTS,
};

pub type ParticipantId = String;
pub type AssignmentId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub emp_id: String,
    pub email: String,
    pub address: Option<String>,
    pub preferences: String,
    pub registered_at: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    Registration,
    Exchange,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevealStatus {
    Generated,
    Revealed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairingError {
    #[error("need at least 3 participants, found {found}")]
    InsufficientParticipants { found: usize },
    #[error("participant listed more than once")]
    DuplicateParticipant,
    #[error("no valid pairing could be produced")]
    Exhausted,
    #[error("cannot assign a person to themselves")]
    SelfAssignment,
    #[error("assignment already revealed")]
    AlreadyRevealed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub id: AssignmentId,
    pub gifter: ParticipantId,
    pub giftee: ParticipantId,
    pub created_at: u64,
    pub revealed_at: Option<u64>,
}

impl Assignment {
    pub fn new(
        id: impl Into<AssignmentId>,
        pair: Pair<ParticipantId>,
        created_at: u64,
    ) -> Self {
        Self {
            id: id.into(),
            gifter: pair.gifter,
            giftee: pair.giftee,
            created_at,
            revealed_at: None,
        }
    }

    pub fn status(&self) -> RevealStatus {
        match self.revealed_at {
            Some(_) => RevealStatus::Revealed,
            None => RevealStatus::Generated,
        }
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self.status(), RevealStatus::Revealed)
    }

    pub fn reveal(&mut self, now: u64) -> Result<(), PairingError> {
        if self.is_revealed() {
            return Err(PairingError::AlreadyRevealed);
        }
        self.revealed_at = Some(now);
        Ok(())
    }

    // only a self assignment is refused, the rest of the set is not checked
    pub fn override_giftee(&mut self, giftee: ParticipantId) -> Result<(), PairingError> {
        if giftee == self.gifter {
            return Err(PairingError::SelfAssignment);
        }
        self.giftee = giftee;
        self.revealed_at = None;
        Ok(())
    }

    pub fn involves(&self, participant: &str) -> bool {
        self.gifter == participant || self.giftee == participant
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentView {
    pub id: AssignmentId,
    pub gifter: Participant,
    pub giftee: Participant,
    pub revealed: bool,
    pub revealed_at: Option<u64>,
}

pub fn project<'a, F>(assignments: &[Assignment], lookup: F) -> Vec<AssignmentView>
where
    F: Fn(&str) -> Option<&'a Participant>,
{
    assignments
        .iter()
        .filter_map(|assignment| {
            let gifter = lookup(&assignment.gifter)?;
            let giftee = lookup(&assignment.giftee)?;
            Some(AssignmentView {
                id: assignment.id.clone(),
                gifter: gifter.clone(),
                giftee: giftee.clone(),
                revealed: assignment.is_revealed(),
                revealed_at: assignment.revealed_at,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParticipantPairings<'a> {
    pub as_gifter: Option<&'a Assignment>,
    pub as_giftee: Option<&'a Assignment>,
}

pub fn pairings_for<'a>(assignments: &'a [Assignment], participant: &str) -> ParticipantPairings<'a> {
    ParticipantPairings {
        as_gifter: assignments.iter().find(|a| a.gifter == participant),
        as_giftee: assignments.iter().find(|a| a.giftee == participant),
    }
}
