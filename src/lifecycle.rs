//! The lifecycle guard: which mutations are legal in which effective status.

use std::fmt::{self, Display, Formatter};

use crate::error::{Error, Result};
use crate::model::election::ElectionStatus;

/// The kinds of mutation gated by the election lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MutationKind {
    AddOrEditPosition,
    AddOrEditCandidate,
    AddPartylist,
    CastBallot,
    AdminStartOrResume,
    AdminPause,
    AdminStop,
}

impl MutationKind {
    /// The effective statuses under which this mutation is permitted.
    ///
    /// `Stopped` and `Completed` appear in no row: they absorb everything.
    pub fn permitted_in(self) -> &'static [ElectionStatus] {
        use ElectionStatus::*;
        match self {
            Self::AddOrEditPosition
            | Self::AddOrEditCandidate
            | Self::AddPartylist
            | Self::AdminStartOrResume => &[Pending, Scheduled, Paused],
            Self::CastBallot | Self::AdminPause => &[Ongoing],
            Self::AdminStop => &[Pending, Scheduled, Ongoing, Paused],
        }
    }
}

impl Display for MutationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let action = match self {
            Self::AddOrEditPosition => "add or edit a position",
            Self::AddOrEditCandidate => "add or edit a candidate",
            Self::AddPartylist => "add a partylist",
            Self::CastBallot => "cast a ballot",
            Self::AdminStartOrResume => "start or resume voting",
            Self::AdminPause => "pause voting",
            Self::AdminStop => "stop the election",
        };
        write!(f, "{}", action)
    }
}

/// Decide whether the given mutation is legal under the given effective
/// status. Denials name the offending status so callers can surface it.
pub fn may_mutate(effective: ElectionStatus, kind: MutationKind) -> Result<()> {
    if kind.permitted_in().contains(&effective) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            status: effective,
            action: kind,
        })
    }
}
