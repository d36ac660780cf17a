//! An in-memory store with the same observable semantics as the MongoDB
//! store. One mutex arbitrates all tables: insert-if-absent and the status
//! compare-and-set happen entirely under the lock, which is the single-writer
//! arbitration the ledger's guarantees rest on. The lock is never held
//! across an await point.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    ballot::{Ballot, BallotCore},
    candidate::{Candidate, CandidateCore},
    election::{Election, ElectionCore, ElectionStatus},
    mongodb::Id,
    partylist::{Partylist, PartylistCore},
    position::{Position, PositionCore},
    voter::VoterCore,
};

use super::{InsertOutcome, Store};

#[derive(Debug, Default)]
struct Tables {
    elections: HashMap<Id, ElectionCore>,
    positions: HashMap<Id, PositionCore>,
    candidates: HashMap<Id, CandidateCore>,
    partylists: HashMap<Id, PartylistCore>,
    /// Keyed by `voter_id` (the account ID), mirroring the unique index.
    voters: HashMap<Id, VoterCore>,
    /// Keyed by `(voter_id, election_id)`, mirroring the unique index.
    ballots: HashMap<(Id, Id), Ballot>,
}

/// In-memory [`Store`] implementation, used by the test suite and suitable
/// for embedding where no database is wanted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.inner.lock().expect("store mutex poisoned")
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_election(&self, election: ElectionCore) -> Result<InsertOutcome> {
        let mut tables = self.lock();
        if tables.elections.values().any(|e| e.slug == election.slug) {
            return Ok(InsertOutcome::Duplicate);
        }
        let id = Id::new();
        tables.elections.insert(id, election);
        Ok(InsertOutcome::Inserted(id))
    }

    async fn election(&self, id: Id) -> Result<Option<Election>> {
        let tables = self.lock();
        Ok(tables.elections.get(&id).map(|core| Election {
            id,
            election: core.clone(),
        }))
    }

    async fn election_by_slug(&self, slug: &str) -> Result<Option<Election>> {
        let tables = self.lock();
        Ok(tables
            .elections
            .iter()
            .find(|(_, core)| core.slug == slug)
            .map(|(id, core)| Election {
                id: *id,
                election: core.clone(),
            }))
    }

    async fn update_status(
        &self,
        id: Id,
        allowed_from: &[ElectionStatus],
        to: ElectionStatus,
    ) -> Result<bool> {
        let mut tables = self.lock();
        match tables.elections.get_mut(&id) {
            Some(election) if allowed_from.contains(&election.status) => {
                election.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_position(&self, position: PositionCore) -> Result<Id> {
        let id = Id::new();
        self.lock().positions.insert(id, position);
        Ok(id)
    }

    async fn position(&self, id: Id) -> Result<Option<Position>> {
        Ok(self.lock().positions.get(&id).map(|core| Position {
            id,
            position: core.clone(),
        }))
    }

    async fn positions(&self, election_id: Id) -> Result<Vec<Position>> {
        Ok(self
            .lock()
            .positions
            .iter()
            .filter(|(_, core)| core.election_id == election_id)
            .map(|(id, core)| Position {
                id: *id,
                position: core.clone(),
            })
            .collect())
    }

    async fn update_position_name(&self, id: Id, name: &str) -> Result<bool> {
        let mut tables = self.lock();
        match tables.positions.get_mut(&id) {
            Some(position) => {
                position.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_position(&self, id: Id) -> Result<bool> {
        Ok(self.lock().positions.remove(&id).is_some())
    }

    async fn insert_candidate(&self, candidate: CandidateCore) -> Result<Id> {
        let id = Id::new();
        self.lock().candidates.insert(id, candidate);
        Ok(id)
    }

    async fn candidate(&self, id: Id) -> Result<Option<Candidate>> {
        Ok(self.lock().candidates.get(&id).map(|core| Candidate {
            id,
            candidate: core.clone(),
        }))
    }

    async fn candidates(&self, election_id: Id) -> Result<Vec<Candidate>> {
        Ok(self
            .lock()
            .candidates
            .iter()
            .filter(|(_, core)| core.election_id == election_id)
            .map(|(id, core)| Candidate {
                id: *id,
                candidate: core.clone(),
            })
            .collect())
    }

    async fn update_candidate(&self, id: Id, candidate: CandidateCore) -> Result<bool> {
        let mut tables = self.lock();
        match tables.candidates.get_mut(&id) {
            Some(existing) => {
                *existing = candidate;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_partylist(&self, partylist: PartylistCore) -> Result<InsertOutcome> {
        let mut tables = self.lock();
        let taken = tables
            .partylists
            .values()
            .any(|p| p.election_id == partylist.election_id && p.name == partylist.name);
        if taken {
            return Ok(InsertOutcome::Duplicate);
        }
        let id = Id::new();
        tables.partylists.insert(id, partylist);
        Ok(InsertOutcome::Inserted(id))
    }

    async fn partylist(&self, id: Id) -> Result<Option<Partylist>> {
        Ok(self.lock().partylists.get(&id).map(|core| Partylist {
            id,
            partylist: core.clone(),
        }))
    }

    async fn partylists(&self, election_id: Id) -> Result<Vec<Partylist>> {
        Ok(self
            .lock()
            .partylists
            .iter()
            .filter(|(_, core)| core.election_id == election_id)
            .map(|(id, core)| Partylist {
                id: *id,
                partylist: core.clone(),
            })
            .collect())
    }

    async fn insert_voter(&self, voter: VoterCore) -> Result<InsertOutcome> {
        let mut tables = self.lock();
        if tables.voters.contains_key(&voter.voter_id) {
            return Ok(InsertOutcome::Duplicate);
        }
        let id = Id::new();
        tables.voters.insert(voter.voter_id, voter);
        Ok(InsertOutcome::Inserted(id))
    }

    async fn has_voter_profile(&self, voter_id: Id) -> Result<bool> {
        Ok(self.lock().voters.contains_key(&voter_id))
    }

    async fn insert_ballot(&self, ballot: BallotCore) -> Result<InsertOutcome> {
        let mut tables = self.lock();
        let key = (ballot.voter_id, ballot.election_id);
        if tables.ballots.contains_key(&key) {
            return Ok(InsertOutcome::Duplicate);
        }
        let id = Id::new();
        tables.ballots.insert(key, Ballot { id, ballot });
        Ok(InsertOutcome::Inserted(id))
    }

    async fn ballots(&self, election_id: Id) -> Result<Vec<Ballot>> {
        Ok(self
            .lock()
            .ballots
            .values()
            .filter(|ballot| ballot.election_id == election_id)
            .cloned()
            .collect())
    }
}
