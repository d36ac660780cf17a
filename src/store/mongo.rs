//! MongoDB-backed [`Store`] implementation.
//!
//! Uniqueness lives in the indexes created by
//! [`ensure_indexes_exist`](crate::model::mongodb::ensure_indexes_exist);
//! a duplicate-key write error is translated into
//! [`InsertOutcome::Duplicate`], never surfaced as a generic failure. The
//! status compare-and-set is a single filtered `update_one`, so it holds the
//! document's row lock for the whole read-modify-write.

use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson},
    error::Error as DbError,
    results::InsertOneResult,
    Client, Database,
};

use crate::error::Result;
use crate::model::{
    ballot::{Ballot, BallotCore},
    candidate::{Candidate, CandidateCore},
    election::{Election, ElectionCore, ElectionStatus},
    mongodb::{ensure_indexes_exist, is_duplicate_key_error, Coll, Id},
    partylist::{Partylist, PartylistCore},
    position::{Position, PositionCore},
    voter::{Voter, VoterCore},
};

use super::{InsertOutcome, Store};

use async_trait::async_trait;

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Wrap an existing database handle. The caller is responsible for
    /// having run [`ensure_indexes`](Self::ensure_indexes).
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connect to the given URI and database, creating the unique indexes
    /// the engine's guarantees depend on.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let store = Self::new(client.database(db_name));
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// Idempotently create the unique indexes. Must have completed before
    /// the store serves writes.
    pub async fn ensure_indexes(&self) -> Result<()> {
        ensure_indexes_exist(&self.db).await?;
        Ok(())
    }

    fn coll<T: crate::model::mongodb::MongoCollection>(&self) -> Coll<T> {
        Coll::from_db(&self.db)
    }
}

/// Translate an insert result, treating a duplicate-key rejection as
/// [`InsertOutcome::Duplicate`].
fn insert_outcome(result: std::result::Result<InsertOneResult, DbError>) -> Result<InsertOutcome> {
    match result {
        Ok(res) => {
            let id = res
                .inserted_id
                .as_object_id()
                .unwrap() // Valid because the ID comes directly from the DB.
                .into();
            Ok(InsertOutcome::Inserted(id))
        }
        Err(err) if is_duplicate_key_error(&err) => Ok(InsertOutcome::Duplicate),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn insert_election(&self, election: ElectionCore) -> Result<InsertOutcome> {
        insert_outcome(self.coll::<ElectionCore>().insert_one(&election, None).await)
    }

    async fn election(&self, id: Id) -> Result<Option<Election>> {
        Ok(self.coll::<Election>().find_one(id.as_doc(), None).await?)
    }

    async fn election_by_slug(&self, slug: &str) -> Result<Option<Election>> {
        Ok(self
            .coll::<Election>()
            .find_one(doc! { "slug": slug }, None)
            .await?)
    }

    async fn update_status(
        &self,
        id: Id,
        allowed_from: &[ElectionStatus],
        to: ElectionStatus,
    ) -> Result<bool> {
        let froms = allowed_from
            .iter()
            .map(|status| Bson::from(*status))
            .collect::<Vec<_>>();
        let filter = doc! {
            "_id": *id,
            "status": { "$in": froms },
        };
        let update = doc! {
            "$set": { "status": to },
        };
        let result = self
            .coll::<Election>()
            .update_one(filter, update, None)
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn insert_position(&self, position: PositionCore) -> Result<Id> {
        let result = self
            .coll::<PositionCore>()
            .insert_one(&position, None)
            .await?;
        Ok(result
            .inserted_id
            .as_object_id()
            .unwrap() // Valid because the ID comes directly from the DB.
            .into())
    }

    async fn position(&self, id: Id) -> Result<Option<Position>> {
        Ok(self.coll::<Position>().find_one(id.as_doc(), None).await?)
    }

    async fn positions(&self, election_id: Id) -> Result<Vec<Position>> {
        Ok(self
            .coll::<Position>()
            .find(doc! { "election_id": *election_id }, None)
            .await?
            .try_collect()
            .await?)
    }

    async fn update_position_name(&self, id: Id, name: &str) -> Result<bool> {
        let update = doc! {
            "$set": { "name": name },
        };
        let result = self
            .coll::<Position>()
            .update_one(id.as_doc(), update, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn remove_position(&self, id: Id) -> Result<bool> {
        let result = self.coll::<Position>().delete_one(id.as_doc(), None).await?;
        Ok(result.deleted_count == 1)
    }

    async fn insert_candidate(&self, candidate: CandidateCore) -> Result<Id> {
        let result = self
            .coll::<CandidateCore>()
            .insert_one(&candidate, None)
            .await?;
        Ok(result
            .inserted_id
            .as_object_id()
            .unwrap() // Valid because the ID comes directly from the DB.
            .into())
    }

    async fn candidate(&self, id: Id) -> Result<Option<Candidate>> {
        Ok(self.coll::<Candidate>().find_one(id.as_doc(), None).await?)
    }

    async fn candidates(&self, election_id: Id) -> Result<Vec<Candidate>> {
        Ok(self
            .coll::<Candidate>()
            .find(doc! { "election_id": *election_id }, None)
            .await?
            .try_collect()
            .await?)
    }

    async fn update_candidate(&self, id: Id, candidate: CandidateCore) -> Result<bool> {
        let result = self
            .coll::<CandidateCore>()
            .replace_one(id.as_doc(), &candidate, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn insert_partylist(&self, partylist: PartylistCore) -> Result<InsertOutcome> {
        insert_outcome(
            self.coll::<PartylistCore>()
                .insert_one(&partylist, None)
                .await,
        )
    }

    async fn partylist(&self, id: Id) -> Result<Option<Partylist>> {
        Ok(self.coll::<Partylist>().find_one(id.as_doc(), None).await?)
    }

    async fn partylists(&self, election_id: Id) -> Result<Vec<Partylist>> {
        Ok(self
            .coll::<Partylist>()
            .find(doc! { "election_id": *election_id }, None)
            .await?
            .try_collect()
            .await?)
    }

    async fn insert_voter(&self, voter: VoterCore) -> Result<InsertOutcome> {
        insert_outcome(self.coll::<VoterCore>().insert_one(&voter, None).await)
    }

    async fn has_voter_profile(&self, voter_id: Id) -> Result<bool> {
        let voter = self
            .coll::<Voter>()
            .find_one(doc! { "voter_id": *voter_id }, None)
            .await?;
        Ok(voter.is_some())
    }

    async fn insert_ballot(&self, ballot: BallotCore) -> Result<InsertOutcome> {
        // The unique (voter_id, election_id) index arbitrates concurrent
        // casts; selections ride inside the same document, so the write is
        // all-or-nothing.
        insert_outcome(self.coll::<BallotCore>().insert_one(&ballot, None).await)
    }

    async fn ballots(&self, election_id: Id) -> Result<Vec<Ballot>> {
        Ok(self
            .coll::<Ballot>()
            .find(doc! { "election_id": *election_id }, None)
            .await?
            .try_collect()
            .await?)
    }
}
