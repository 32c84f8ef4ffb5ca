use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::PairingError;

pub const MAX_ATTEMPTS: usize = 1000;

// no derangement without two-cycles exists below this
pub const MIN_PARTICIPANTS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Pair<T> {
    pub gifter: T,
    pub giftee: T,
}

pub fn generate<T, R>(roster: &[T], rng: &mut R) -> Result<Vec<Pair<T>>, PairingError>
where
    T: Clone + Eq + Hash,
    R: Rng + ?Sized,
{
    generate_with(roster, MAX_ATTEMPTS, |items| items.shuffle(&mut *rng))
}

/// `shuffle` receives a fresh copy of the roster on every attempt.
pub fn generate_with<T, F>(
    roster: &[T],
    max_attempts: usize,
    mut shuffle: F,
) -> Result<Vec<Pair<T>>, PairingError>
where
    T: Clone + Eq + Hash,
    F: FnMut(&mut [T]),
{
    check_roster(roster)?;

    let mut candidate = roster.to_vec();
    for _ in 0..max_attempts {
        candidate.clone_from_slice(roster);
        shuffle(&mut candidate);
        if let Some(pairs) = accept(roster, &candidate) {
            return Ok(pairs);
        }
    }

    let fallback = rotation(roster)?;
    if !is_valid_pairing(roster, &fallback) {
        return Err(PairingError::Exhausted);
    }
    Ok(fallback)
}

pub fn rotation<T>(roster: &[T]) -> Result<Vec<Pair<T>>, PairingError>
where
    T: Clone + Eq + Hash,
{
    check_roster(roster)?;
    Ok(roster
        .iter()
        .zip(roster.iter().cycle().skip(1))
        .map(|(gifter, giftee)| Pair {
            gifter: gifter.clone(),
            giftee: giftee.clone(),
        })
        .collect())
}

pub fn is_valid_pairing<T>(roster: &[T], pairs: &[Pair<T>]) -> bool
where
    T: Eq + Hash,
{
    if pairs.len() != roster.len() {
        return false;
    }

    let members: HashSet<&T> = roster.iter().collect();
    let mut gifters = HashSet::with_capacity(pairs.len());
    let mut giftees = HashSet::with_capacity(pairs.len());
    let mut edges: HashMap<&T, &T> = HashMap::with_capacity(pairs.len());

    for pair in pairs {
        if pair.gifter == pair.giftee
            || !members.contains(&pair.gifter)
            || !members.contains(&pair.giftee)
        {
            return false;
        }
        if !gifters.insert(&pair.gifter) || !giftees.insert(&pair.giftee) {
            return false;
        }
        edges.insert(&pair.gifter, &pair.giftee);
    }

    edges.iter().all(|(gifter, giftee)| edges.get(giftee) != Some(gifter))
}

fn check_roster<T>(roster: &[T]) -> Result<(), PairingError>
where
    T: Eq + Hash,
{
    if roster.len() < MIN_PARTICIPANTS {
        return Err(PairingError::InsufficientParticipants {
            found: roster.len(),
        });
    }

    let mut seen = HashSet::with_capacity(roster.len());
    if !roster.iter().all(|id| seen.insert(id)) {
        return Err(PairingError::DuplicateParticipant);
    }
    Ok(())
}

fn accept<T>(roster: &[T], shuffled: &[T]) -> Option<Vec<Pair<T>>>
where
    T: Clone + Eq + Hash,
{
    let mut accepted: HashMap<&T, &T> = HashMap::with_capacity(roster.len());
    for (gifter, giftee) in roster.iter().zip(shuffled) {
        if gifter == giftee {
            return None;
        }
        // giftee already gifts back to this gifter
        if accepted.get(giftee) == Some(&gifter) {
            return None;
        }
        accepted.insert(gifter, giftee);
    }

    Some(
        roster
            .iter()
            .zip(shuffled)
            .map(|(gifter, giftee)| Pair {
                gifter: gifter.clone(),
                giftee: giftee.clone(),
            })
            .collect(),
    )
}
