use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use mongodb::bson::{self, serde_helpers::chrono_datetime_as_bson_datetime, Bson};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::spec::ElectionSpec;

/// Stored statuses in the election lifecycle.
///
/// Every status except `Scheduled` is authoritative as stored: time never
/// overrides an explicit admin setting. `Scheduled` is the one status whose
/// effective value is derived from the clock, see
/// [`ElectionCore::effective_status`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElectionStatus {
    /// Created but not scheduled; opens only by explicit admin action.
    Pending,
    /// Start and end times drive the effective status automatically.
    Scheduled,
    /// Voting is open.
    Ongoing,
    /// Voting is suspended; editing is allowed again.
    Paused,
    /// Terminated by an admin. Terminal.
    Stopped,
    /// The voting window has passed. Terminal.
    Completed,
}

impl ElectionStatus {
    /// Terminal statuses permit no further transitions, edits, or ballots.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Completed)
    }
}

impl Display for ElectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Ongoing => "ongoing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

impl From<ElectionStatus> for Bson {
    fn from(status: ElectionStatus) -> Self {
        bson::to_bson(&status).expect("Serialisation is infallible")
    }
}

/// Core election data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCore {
    /// Election name.
    pub name: String,
    /// Human-readable identifier, unique across the system.
    pub slug: String,
    /// Election description.
    pub description: String,
    /// The stored status. Gating decisions must go through
    /// [`effective_status`](Self::effective_status), never read this directly.
    pub status: ElectionStatus,
    /// Election start time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    /// Election end time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_time: DateTime<Utc>,
    /// Creation time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ElectionCore {
    /// Build a new election from an admin-submitted spec.
    ///
    /// Rejects inverted time bounds and any initial status other than
    /// `Pending` or `Scheduled`.
    pub fn new(spec: ElectionSpec, now: DateTime<Utc>) -> Result<Self> {
        if spec.start_time >= spec.end_time {
            return Err(Error::BadRequest(
                "election start time must be before its end time".to_string(),
            ));
        }
        if !matches!(
            spec.status,
            ElectionStatus::Pending | ElectionStatus::Scheduled
        ) {
            return Err(Error::BadRequest(format!(
                "an election cannot be created {}; it must start pending or scheduled",
                spec.status
            )));
        }

        Ok(Self {
            name: spec.name,
            slug: spec.slug,
            description: spec.description,
            status: spec.status,
            start_time: spec.start_time,
            end_time: spec.end_time,
            created_at: now,
        })
    }

    /// The status used for all gating decisions.
    ///
    /// An explicitly stored status is returned unchanged; only `Scheduled`
    /// derives from the clock: past the end time the election is completed
    /// (whether or not voting ever opened), at or past the start time it is
    /// ongoing. The derived value is never written back; the stored status
    /// stays `Scheduled` until an admin transition writes a new one.
    pub fn effective_status(&self, now: DateTime<Utc>) -> ElectionStatus {
        if self.status != ElectionStatus::Scheduled {
            return self.status;
        }
        if now > self.end_time {
            ElectionStatus::Completed
        } else if now >= self.start_time {
            ElectionStatus::Ongoing
        } else {
            ElectionStatus::Scheduled
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use chrono::Duration;

    use super::*;

    impl ElectionCore {
        /// Scheduled, with the voting window currently open.
        pub fn scheduled_open_example() -> Self {
            let now = Utc::now();
            Self::new(ElectionSpec::scheduled_example(now - Duration::hours(1)), now)
                .expect("example is valid")
        }
    }
}
