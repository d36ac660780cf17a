//! Lifecycle-gated administrative mutations.
//!
//! Every mutation here follows the same shape: check the caller holds the
//! admin role, resolve the election, gate the mutation against the current
//! *effective* status, then write. Uniqueness rules (election slug,
//! partylist name) are enforced by the store's constrained insert, not by a
//! racy existence pre-check.

use chrono::Utc;
use log::info;

use crate::error::{Error, Result};
use crate::lifecycle::{may_mutate, MutationKind};
use crate::model::{
    candidate::{Candidate, CandidateCore, CandidateSpec},
    election::{Election, ElectionCore, ElectionSpec, ElectionStatus},
    mongodb::Id,
    partylist::{Partylist, PartylistCore},
    position::{Position, PositionCore},
    Identity,
};
use crate::store::{InsertOutcome, Store};

/// Resolve an election and gate `kind` against its effective status.
/// Admin-only.
async fn editable_election<S>(
    store: &S,
    identity: &Identity,
    election_id: Id,
    kind: MutationKind,
) -> Result<Election>
where
    S: Store + ?Sized,
{
    identity.require_admin()?;
    let election = store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {}", election_id)))?;
    may_mutate(election.effective_status(Utc::now()), kind)?;
    Ok(election)
}

/// Create a new election in its initial `Pending` or `Scheduled` status.
pub async fn create_election<S>(
    store: &S,
    identity: &Identity,
    spec: ElectionSpec,
) -> Result<Election>
where
    S: Store + ?Sized,
{
    identity.require_admin()?;
    let election = ElectionCore::new(spec, Utc::now())?;
    match store.insert_election(election.clone()).await? {
        InsertOutcome::Inserted(id) => {
            info!("Admin {} created election '{}'", identity.id, election.slug);
            Ok(Election { id, election })
        }
        InsertOutcome::Duplicate => Err(Error::BadRequest(format!(
            "Election slug '{}' already in use",
            election.slug
        ))),
    }
}

pub async fn add_position<S>(
    store: &S,
    identity: &Identity,
    election_id: Id,
    name: String,
) -> Result<Position>
where
    S: Store + ?Sized,
{
    editable_election(store, identity, election_id, MutationKind::AddOrEditPosition).await?;
    let position = PositionCore { election_id, name };
    let id = store.insert_position(position.clone()).await?;
    Ok(Position { id, position })
}

pub async fn rename_position<S>(
    store: &S,
    identity: &Identity,
    position_id: Id,
    name: String,
) -> Result<()>
where
    S: Store + ?Sized,
{
    let position = store
        .position(position_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Position {}", position_id)))?;
    editable_election(
        store,
        identity,
        position.election_id,
        MutationKind::AddOrEditPosition,
    )
    .await?;
    if !store.update_position_name(position_id, &name).await? {
        return Err(Error::not_found(format!("Position {}", position_id)));
    }
    Ok(())
}

/// Remove a position from an election.
///
/// Gated like any position edit, with one extra rule: once the election has
/// left the pre-ongoing phase (the only editable status after that point is
/// `Paused`), a position that already has candidates cannot be removed.
pub async fn remove_position<S>(store: &S, identity: &Identity, position_id: Id) -> Result<()>
where
    S: Store + ?Sized,
{
    let position = store
        .position(position_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Position {}", position_id)))?;
    let election = editable_election(
        store,
        identity,
        position.election_id,
        MutationKind::AddOrEditPosition,
    )
    .await?;

    if election.effective_status(Utc::now()) == ElectionStatus::Paused {
        let candidates = store.candidates(position.election_id).await?;
        if candidates
            .iter()
            .any(|candidate| candidate.position_id == position_id)
        {
            return Err(Error::BadRequest(format!(
                "Position '{}' has candidates and voting has begun; it can no longer be removed",
                position.name
            )));
        }
    }

    if !store.remove_position(position_id).await? {
        return Err(Error::not_found(format!("Position {}", position_id)));
    }
    Ok(())
}

/// Check a candidate spec's references: the position must belong to the
/// election, and the partylist (if any) must belong to the same election.
async fn check_candidate_refs<S>(store: &S, election_id: Id, spec: &CandidateSpec) -> Result<()>
where
    S: Store + ?Sized,
{
    let position = store
        .position(spec.position_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Position {}", spec.position_id)))?;
    if position.election_id != election_id {
        return Err(Error::BadRequest(format!(
            "Position '{}' belongs to a different election",
            position.name
        )));
    }

    if let Some(partylist_id) = spec.partylist_id {
        let partylist = store
            .partylist(partylist_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Partylist {}", partylist_id)))?;
        if partylist.election_id != election_id {
            return Err(Error::BadRequest(format!(
                "Partylist '{}' belongs to a different election",
                partylist.name
            )));
        }
    }

    Ok(())
}

pub async fn add_candidate<S>(
    store: &S,
    identity: &Identity,
    election_id: Id,
    spec: CandidateSpec,
) -> Result<Candidate>
where
    S: Store + ?Sized,
{
    editable_election(store, identity, election_id, MutationKind::AddOrEditCandidate).await?;
    check_candidate_refs(store, election_id, &spec).await?;

    let candidate = CandidateCore {
        election_id,
        position_id: spec.position_id,
        name: spec.name,
        partylist_id: spec.partylist_id,
        platform: spec.platform,
    };
    let id = store.insert_candidate(candidate.clone()).await?;
    Ok(Candidate { id, candidate })
}

pub async fn edit_candidate<S>(
    store: &S,
    identity: &Identity,
    candidate_id: Id,
    spec: CandidateSpec,
) -> Result<()>
where
    S: Store + ?Sized,
{
    let existing = store
        .candidate(candidate_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {}", candidate_id)))?;
    editable_election(
        store,
        identity,
        existing.election_id,
        MutationKind::AddOrEditCandidate,
    )
    .await?;
    check_candidate_refs(store, existing.election_id, &spec).await?;

    let candidate = CandidateCore {
        election_id: existing.election_id,
        position_id: spec.position_id,
        name: spec.name,
        partylist_id: spec.partylist_id,
        platform: spec.platform,
    };
    if !store.update_candidate(candidate_id, candidate).await? {
        return Err(Error::not_found(format!("Candidate {}", candidate_id)));
    }
    Ok(())
}

pub async fn add_partylist<S>(
    store: &S,
    identity: &Identity,
    election_id: Id,
    name: String,
) -> Result<Partylist>
where
    S: Store + ?Sized,
{
    editable_election(store, identity, election_id, MutationKind::AddPartylist).await?;
    let partylist = PartylistCore { election_id, name };
    match store.insert_partylist(partylist.clone()).await? {
        InsertOutcome::Inserted(id) => Ok(Partylist { id, partylist }),
        InsertOutcome::Duplicate => Err(Error::BadRequest(format!(
            "Partylist name '{}' already in use in this election",
            partylist.name
        ))),
    }
}
