use mongodb::error::Error as DbError;
use thiserror::Error;

use crate::lifecycle::MutationKind;
use crate::model::election::ElectionStatus;
use crate::model::mongodb::Id;

pub type Result<T> = std::result::Result<T, Error>;

/// The specific rule a ballot broke during structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BallotFault {
    /// The selected candidate does not exist in the target election.
    #[error("candidate {candidate} does not exist in this election")]
    ForeignCandidate { candidate: Id },
    /// The selected candidate exists but does not stand for the claimed position.
    #[error("candidate {candidate} does not stand for position {position}")]
    WrongPosition { candidate: Id, position: Id },
    /// Two selections name the same position.
    #[error("multiple selections for position {position}")]
    DuplicatePosition { position: Id },
    /// An open position was left blank while full ballots are required.
    #[error("no selection for open position {position}")]
    MissingPosition { position: Id },
}

#[derive(Debug, Error)]
pub enum Error {
    /// Storage-layer failure; propagated unchanged for the caller to retry or surface.
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// The lifecycle guard denied a mutation for the current effective status.
    #[error("Invalid transition: cannot {action} while the election is {status}")]
    InvalidTransition {
        status: ElectionStatus,
        action: MutationKind,
    },
    #[error("Invalid ballot: {0}")]
    InvalidBallot(BallotFault),
    /// The (voter, election) ballot uniqueness constraint fired.
    #[error("A ballot has already been cast in this election by this voter")]
    AlreadyVoted,
    #[error("Ballots are only accepted while the election is ongoing, not {0}")]
    ElectionNotOngoing(ElectionStatus),
    #[error("Not eligible to vote: {0}")]
    NotEligible(String),
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(item: impl std::fmt::Display) -> Self {
        Self::NotFound(item.to_string())
    }
}
