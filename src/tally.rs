//! Vote counts, derived by querying the ballot ledger.
//!
//! Counts are never maintained incrementally: a second, incrementally
//! updated source of truth could drift from the ledger, so every tally is a
//! fresh fold over the recorded ballots.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{ballot::Ballot, candidate::Candidate, mongodb::Id};
use crate::store::Store;

/// The number of votes one candidate has received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateTally {
    pub position_id: Id,
    pub candidate_id: Id,
    pub candidate_name: String,
    pub votes: u64,
}

/// Fold per-candidate counts out of a set of ballots. Pure; candidates with
/// no votes appear with a count of zero.
pub fn tally(candidates: &[Candidate], ballots: &[Ballot]) -> Vec<CandidateTally> {
    let mut counts: HashMap<Id, u64> = candidates
        .iter()
        .map(|candidate| (candidate.id, 0))
        .collect();
    for ballot in ballots {
        for selection in &ballot.selections {
            if let Some(count) = counts.get_mut(&selection.candidate_id) {
                *count += 1;
            }
        }
    }

    candidates
        .iter()
        .map(|candidate| CandidateTally {
            position_id: candidate.position_id,
            candidate_id: candidate.id,
            candidate_name: candidate.name.clone(),
            votes: counts[&candidate.id],
        })
        .collect()
}

/// Tally an election straight from the store.
pub async fn election_tally<S>(store: &S, election_id: Id) -> Result<Vec<CandidateTally>>
where
    S: Store + ?Sized,
{
    if store.election(election_id).await?.is_none() {
        return Err(Error::not_found(format!("Election {}", election_id)));
    }
    let candidates = store.candidates(election_id).await?;
    let ballots = store.ballots(election_id).await?;
    Ok(tally(&candidates, &ballots))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::{
        ballot::{BallotCore, Selection},
        candidate::CandidateCore,
    };

    fn candidate(election_id: Id, position_id: Id, name: &str) -> Candidate {
        Candidate {
            id: Id::new(),
            candidate: CandidateCore {
                election_id,
                position_id,
                name: name.to_string(),
                partylist_id: None,
                platform: None,
            },
        }
    }

    fn ballot(election_id: Id, selections: Vec<Selection>) -> Ballot {
        Ballot {
            id: Id::new(),
            ballot: BallotCore::new(Id::new(), election_id, selections, Utc::now()),
        }
    }

    #[test]
    fn counts_fold_from_ballots() {
        let election_id = Id::new();
        let position_id = Id::new();
        let first = candidate(election_id, position_id, "First");
        let second = candidate(election_id, position_id, "Second");

        let ballots = vec![
            ballot(
                election_id,
                vec![Selection {
                    position_id,
                    candidate_id: first.id,
                }],
            ),
            ballot(
                election_id,
                vec![Selection {
                    position_id,
                    candidate_id: first.id,
                }],
            ),
            ballot(
                election_id,
                vec![Selection {
                    position_id,
                    candidate_id: second.id,
                }],
            ),
            // An abstention contributes nothing.
            ballot(election_id, vec![]),
        ];

        let totals = tally(&[first.clone(), second.clone()], &ballots);
        let votes_for = |id: Id| {
            totals
                .iter()
                .find(|t| t.candidate_id == id)
                .expect("candidate present")
                .votes
        };
        assert_eq!(votes_for(first.id), 2);
        assert_eq!(votes_for(second.id), 1);
    }

    #[test]
    fn candidates_without_votes_appear_as_zero() {
        let election_id = Id::new();
        let position_id = Id::new();
        let lonely = candidate(election_id, position_id, "Lonely");
        let totals = tally(&[lonely.clone()], &[]);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].votes, 0);
        assert_eq!(totals[0].candidate_name, "Lonely");
    }
}
