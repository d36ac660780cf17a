//! Structural ballot validation. Pure: never touches storage, never reads
//! the clock.

use std::collections::HashSet;

use crate::config::Config;
use crate::error::{BallotFault, Error, Result};
use crate::model::{
    ballot::Selection,
    candidate::Candidate,
    mongodb::Id,
    position::Position,
};

/// Check a proposed selection set against the target election's positions
/// and candidates.
///
/// Rules, in order of checking:
/// - every selection must reference a candidate that exists in the target
///   election (a selection forged into another election's race is rejected
///   outright);
/// - the candidate must stand for exactly the position the selection claims;
/// - at most one selection per position;
/// - under [`Config::require_full_ballot`], every open position must carry a
///   selection; otherwise blank positions are permitted abstentions.
pub fn validate_ballot(
    selections: &[Selection],
    election_id: Id,
    positions: &[Position],
    candidates: &[Candidate],
    config: &Config,
) -> Result<()> {
    let mut filled: HashSet<Id> = HashSet::new();

    for selection in selections {
        let candidate = candidates
            .iter()
            .find(|candidate| candidate.id == selection.candidate_id)
            .filter(|candidate| candidate.election_id == election_id)
            .ok_or(Error::InvalidBallot(BallotFault::ForeignCandidate {
                candidate: selection.candidate_id,
            }))?;

        let position_in_election = positions
            .iter()
            .any(|position| position.id == selection.position_id && position.election_id == election_id);
        if candidate.position_id != selection.position_id || !position_in_election {
            return Err(Error::InvalidBallot(BallotFault::WrongPosition {
                candidate: selection.candidate_id,
                position: selection.position_id,
            }));
        }

        if !filled.insert(selection.position_id) {
            return Err(Error::InvalidBallot(BallotFault::DuplicatePosition {
                position: selection.position_id,
            }));
        }
    }

    if config.require_full_ballot() {
        for position in positions
            .iter()
            .filter(|position| position.election_id == election_id)
        {
            if !filled.contains(&position.id) {
                return Err(Error::InvalidBallot(BallotFault::MissingPosition {
                    position: position.id,
                }));
            }
        }
    }

    Ok(())
}
