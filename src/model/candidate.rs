use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::mongodb::Id;

/// Core candidate data, as stored in the database.
///
/// A candidate stands for exactly one position, and (transitively) in exactly
/// one election. The partylist affiliation, if set, must belong to the same
/// election; the admin operations enforce this at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    pub election_id: Id,
    pub position_id: Id,
    pub name: String,
    /// Optional partylist affiliation, within the same election.
    pub partylist_id: Option<Id>,
    /// Optional campaign platform text.
    pub platform: Option<String>,
}

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

/// A candidate specification, as submitted by an administrator. The target
/// election is passed separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub position_id: Id,
    pub name: String,
    pub partylist_id: Option<Id>,
    pub platform: Option<String>,
}
