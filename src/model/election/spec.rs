use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ElectionStatus;

/// An election specification, as submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSpec {
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Initial stored status; must be `Pending` or `Scheduled`.
    pub status: ElectionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use chrono::Duration;

    use super::*;

    impl ElectionSpec {
        /// A scheduled election whose window opens at `start` and runs a week.
        pub fn scheduled_example(start: DateTime<Utc>) -> Self {
            Self {
                name: "Student Council 2026".to_string(),
                slug: "student-council-2026".to_string(),
                description: "Annual student council election".to_string(),
                status: ElectionStatus::Scheduled,
                start_time: start,
                end_time: start + Duration::days(7),
            }
        }

        /// A pending election; it opens only by explicit admin action.
        pub fn pending_example() -> Self {
            Self {
                status: ElectionStatus::Pending,
                ..Self::scheduled_example(Utc::now() + Duration::days(1))
            }
        }
    }
}
