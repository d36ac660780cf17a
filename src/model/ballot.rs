use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use super::mongodb::Id;

/// One (position, candidate) choice within a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub position_id: Id,
    pub candidate_id: Id,
}

/// Core ballot data, as stored in the database.
///
/// A ballot is a voter's complete set of selections for one election,
/// persisted as a single document so that the write is atomic: readers see
/// the whole ballot or nothing. The `(voter_id, election_id)` pair carries a
/// unique index; that index, not any pre-check, is what guarantees at most
/// one ballot per voter per election. Ballots are immutable and undeletable
/// once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotCore {
    pub voter_id: Id,
    pub election_id: Id,
    /// At most one selection per position; the validator rejects duplicates
    /// before any write reaches the store.
    pub selections: Vec<Selection>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
}

impl BallotCore {
    pub fn new(
        voter_id: Id,
        election_id: Id,
        selections: Vec<Selection>,
        cast_at: DateTime<Utc>,
    ) -> Self {
        Self {
            voter_id,
            election_id,
            selections,
            cast_at,
        }
    }
}

/// A ballot from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub ballot: BallotCore,
}

impl Deref for Ballot {
    type Target = BallotCore;

    fn deref(&self) -> &Self::Target {
        &self.ballot
    }
}
