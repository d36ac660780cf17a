//! Explicit administrator-initiated lifecycle transitions.
//!
//! Legality is checked twice: once against the *effective* status via the
//! lifecycle guard, and again at write time by a compare-and-set on the
//! stored status. The second check is what serializes racing admin actions:
//! of two simultaneous contradictory transitions, at most one lands.

use std::fmt::{self, Display, Formatter};

use chrono::Utc;
use log::info;

use crate::error::{Error, Result};
use crate::lifecycle::{may_mutate, MutationKind};
use crate::model::{election::ElectionStatus, mongodb::Id, Identity};
use crate::store::Store;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    Start,
    Pause,
    Resume,
    Stop,
}

impl Transition {
    /// The guard row this transition falls under.
    pub fn mutation_kind(self) -> MutationKind {
        match self {
            Self::Start | Self::Resume => MutationKind::AdminStartOrResume,
            Self::Pause => MutationKind::AdminPause,
            Self::Stop => MutationKind::AdminStop,
        }
    }

    /// Stored statuses the compare-and-set may move from.
    ///
    /// `Scheduled` appears in the pause window because a scheduled election
    /// can be *effectively* ongoing on the clock while still stored as
    /// `Scheduled`; the guard has already confirmed the effective status.
    pub fn allowed_from(self) -> &'static [ElectionStatus] {
        use ElectionStatus::*;
        match self {
            Self::Start | Self::Resume => &[Pending, Scheduled, Paused],
            Self::Pause => &[Ongoing, Scheduled],
            Self::Stop => &[Pending, Scheduled, Ongoing, Paused],
        }
    }

    /// The stored status this transition writes.
    pub fn target(self) -> ElectionStatus {
        match self {
            Self::Start | Self::Resume => ElectionStatus::Ongoing,
            Self::Pause => ElectionStatus::Paused,
            Self::Stop => ElectionStatus::Stopped,
        }
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
        };
        write!(f, "{}", name)
    }
}

/// Apply an explicit admin transition to an election's stored status.
///
/// The stored-status write is the only mutation this performs. Terminal
/// statuses (`Stopped`, `Completed`) are absorbing: the guard denies every
/// transition out of them.
pub async fn apply_transition<S>(
    store: &S,
    identity: &Identity,
    election_id: Id,
    transition: Transition,
) -> Result<()>
where
    S: Store + ?Sized,
{
    identity.require_admin()?;
    let election = store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {}", election_id)))?;
    let effective = election.effective_status(Utc::now());
    may_mutate(effective, transition.mutation_kind())?;

    let updated = store
        .update_status(election_id, transition.allowed_from(), transition.target())
        .await?;
    if !updated {
        // A concurrent transition won the race between our read and write.
        return Err(Error::InvalidTransition {
            status: effective,
            action: transition.mutation_kind(),
        });
    }

    info!(
        "Admin {} applied '{}' to election '{}' ({} -> {})",
        identity.id,
        transition,
        election.slug,
        election.status,
        transition.target()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::election::ElectionSpec;
    use crate::ops::testing::seeded;

    async fn status_of(scenario: &crate::ops::testing::Scenario) -> ElectionStatus {
        scenario
            .store
            .election(scenario.election_id)
            .await
            .unwrap()
            .expect("election present")
            .status
    }

    #[tokio::test]
    async fn start_pause_resume_stop_round_trip() {
        let scenario = seeded(ElectionSpec::pending_example()).await;
        let store = &scenario.store;
        let admin = &scenario.admin;
        let id = scenario.election_id;

        apply_transition(store, admin, id, Transition::Start)
            .await
            .unwrap();
        assert_eq!(status_of(&scenario).await, ElectionStatus::Ongoing);

        apply_transition(store, admin, id, Transition::Pause)
            .await
            .unwrap();
        assert_eq!(status_of(&scenario).await, ElectionStatus::Paused);

        apply_transition(store, admin, id, Transition::Resume)
            .await
            .unwrap();
        assert_eq!(status_of(&scenario).await, ElectionStatus::Ongoing);

        apply_transition(store, admin, id, Transition::Stop)
            .await
            .unwrap();
        assert_eq!(status_of(&scenario).await, ElectionStatus::Stopped);
    }

    #[tokio::test]
    async fn stop_on_a_stopped_election_is_invalid() {
        let scenario = seeded(ElectionSpec::pending_example()).await;
        apply_transition(
            &scenario.store,
            &scenario.admin,
            scenario.election_id,
            Transition::Stop,
        )
        .await
        .unwrap();

        let err = apply_transition(
            &scenario.store,
            &scenario.admin,
            scenario.election_id,
            Transition::Stop,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                status: ElectionStatus::Stopped,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn terminal_statuses_absorb_all_transitions() {
        for terminal in [Transition::Stop] {
            let scenario = seeded(ElectionSpec::pending_example()).await;
            apply_transition(
                &scenario.store,
                &scenario.admin,
                scenario.election_id,
                terminal,
            )
            .await
            .unwrap();

            for attempt in [
                Transition::Start,
                Transition::Pause,
                Transition::Resume,
                Transition::Stop,
            ] {
                let err = apply_transition(
                    &scenario.store,
                    &scenario.admin,
                    scenario.election_id,
                    attempt,
                )
                .await
                .unwrap_err();
                assert!(matches!(err, Error::InvalidTransition { .. }), "{attempt}");
            }
        }
    }

    #[tokio::test]
    async fn pause_requires_ongoing() {
        let scenario = seeded(ElectionSpec::pending_example()).await;
        let err = apply_transition(
            &scenario.store,
            &scenario.admin,
            scenario.election_id,
            Transition::Pause,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                status: ElectionStatus::Pending,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn non_admin_cannot_transition() {
        let scenario = seeded(ElectionSpec::pending_example()).await;
        let err = apply_transition(
            &scenario.store,
            &scenario.voter,
            scenario.election_id,
            Transition::Start,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn missing_election_is_not_found() {
        let scenario = seeded(ElectionSpec::pending_example()).await;
        let err = apply_transition(
            &scenario.store,
            &scenario.admin,
            Id::new(),
            Transition::Start,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
