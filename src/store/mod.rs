//! The storage contract the engine depends on.
//!
//! The engine never performs check-then-insert: every uniqueness rule is
//! enforced by the store in a single atomic write, and the engine translates
//! [`InsertOutcome::Duplicate`] into the matching domain error. A store
//! implementation must uphold:
//!
//! - [`Store::insert_ballot`] is an atomic insert-if-absent keyed on
//!   `(voter_id, election_id)`;
//! - [`Store::insert_voter`] likewise on `voter_id`, and
//!   [`Store::insert_election`] on `slug`, [`Store::insert_partylist`] on
//!   `(election_id, name)`;
//! - [`Store::update_status`] is a single compare-and-set, so two racing
//!   admin transitions can never both succeed;
//! - reads may run concurrently with writes.

mod memory;
mod mongo;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

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

/// Outcome of an atomic insert-if-absent write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was written and assigned this ID.
    Inserted(Id),
    /// A uniqueness constraint rejected the write; nothing was stored.
    Duplicate,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Elections

    /// Insert a new election; `Duplicate` iff the slug is already taken.
    async fn insert_election(&self, election: ElectionCore) -> Result<InsertOutcome>;
    async fn election(&self, id: Id) -> Result<Option<Election>>;
    async fn election_by_slug(&self, slug: &str) -> Result<Option<Election>>;
    /// Compare-and-set on the stored status. Returns false iff the election
    /// was absent or its stored status was outside `allowed_from` at the
    /// moment of the write.
    async fn update_status(
        &self,
        id: Id,
        allowed_from: &[ElectionStatus],
        to: ElectionStatus,
    ) -> Result<bool>;

    // Positions

    async fn insert_position(&self, position: PositionCore) -> Result<Id>;
    async fn position(&self, id: Id) -> Result<Option<Position>>;
    async fn positions(&self, election_id: Id) -> Result<Vec<Position>>;
    /// Returns false if the position was absent.
    async fn update_position_name(&self, id: Id, name: &str) -> Result<bool>;
    /// Returns false if the position was absent.
    async fn remove_position(&self, id: Id) -> Result<bool>;

    // Candidates

    async fn insert_candidate(&self, candidate: CandidateCore) -> Result<Id>;
    async fn candidate(&self, id: Id) -> Result<Option<Candidate>>;
    async fn candidates(&self, election_id: Id) -> Result<Vec<Candidate>>;
    /// Replace a candidate's data. Returns false if the candidate was absent.
    async fn update_candidate(&self, id: Id, candidate: CandidateCore) -> Result<bool>;

    // Partylists

    /// `Duplicate` iff the election already has a partylist with this name.
    async fn insert_partylist(&self, partylist: PartylistCore) -> Result<InsertOutcome>;
    async fn partylist(&self, id: Id) -> Result<Option<Partylist>>;
    async fn partylists(&self, election_id: Id) -> Result<Vec<Partylist>>;

    // Voters

    /// `Duplicate` iff a profile already exists for this `voter_id`.
    async fn insert_voter(&self, voter: VoterCore) -> Result<InsertOutcome>;
    async fn has_voter_profile(&self, voter_id: Id) -> Result<bool>;

    // Ballots

    /// The one write the ballot ledger performs. Atomic insert-if-absent on
    /// `(voter_id, election_id)`: under concurrent calls for the same pair,
    /// exactly one returns `Inserted` and the rest `Duplicate`.
    async fn insert_ballot(&self, ballot: BallotCore) -> Result<InsertOutcome>;
    async fn ballots(&self, election_id: Id) -> Result<Vec<Ballot>>;
}
