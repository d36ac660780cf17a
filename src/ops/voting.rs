//! Voter-facing operations: profile registration and the ballot ledger.

use chrono::Utc;
use log::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lifecycle::{may_mutate, MutationKind};
use crate::model::{
    ballot::{BallotCore, Selection},
    mongodb::Id,
    voter::{VoterCore, VoterProfile},
    Identity,
};
use crate::store::{InsertOutcome, Store};
use crate::validate::validate_ballot;

/// Register the caller's voter profile. One profile per account, collected
/// once and immutable thereafter; the store's insert-if-absent enforces the
/// uniqueness.
pub async fn register_voter<S>(store: &S, identity: &Identity, profile: VoterProfile) -> Result<()>
where
    S: Store + ?Sized,
{
    if !identity.email_verified {
        return Err(Error::Unauthorized(
            "email must be verified before registering to vote".to_string(),
        ));
    }

    let voter = VoterCore::new(identity.id, profile, Utc::now());
    match store.insert_voter(voter).await? {
        InsertOutcome::Inserted(_) => {
            info!("Voter {} registered a profile", identity.id);
            Ok(())
        }
        InsertOutcome::Duplicate => Err(Error::BadRequest(
            "a voter profile is already registered for this account".to_string(),
        )),
    }
}

/// Record the caller's ballot for an election.
///
/// Preconditions, in order: the caller has a registered voter profile, the
/// election exists, its effective status admits ballots, and the selection
/// set is structurally valid. Then the ballot and its selections are
/// persisted in one atomic constrained insert. The unique
/// `(voter_id, election_id)` key decides who voted first, not any pre-check;
/// the loser of a race fails fast with [`Error::AlreadyVoted`].
pub async fn cast_ballot<S>(
    store: &S,
    config: &Config,
    identity: &Identity,
    election_id: Id,
    selections: Vec<Selection>,
) -> Result<()>
where
    S: Store + ?Sized,
{
    if !store.has_voter_profile(identity.id).await? {
        return Err(Error::NotEligible(
            "no voter profile is registered for this account".to_string(),
        ));
    }

    let election = store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {}", election_id)))?;

    let now = Utc::now();
    let effective = election.effective_status(now);
    may_mutate(effective, MutationKind::CastBallot)
        .map_err(|_| Error::ElectionNotOngoing(effective))?;

    let positions = store.positions(election_id).await?;
    let candidates = store.candidates(election_id).await?;
    validate_ballot(&selections, election_id, &positions, &candidates, config)?;

    let ballot = BallotCore::new(identity.id, election_id, selections, now);
    match store.insert_ballot(ballot).await? {
        InsertOutcome::Inserted(_) => {
            info!(
                "Voter {} cast a ballot in election '{}'",
                identity.id, election.slug
            );
            Ok(())
        }
        InsertOutcome::Duplicate => Err(Error::AlreadyVoted),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::model::{
        ballot::Ballot,
        candidate::CandidateCore,
        election::{ElectionCore, ElectionSpec},
        position::PositionCore,
    };
    use crate::ops::testing::{seeded, Scenario};
    use crate::ops::transition::{apply_transition, Transition};
    use crate::store::MemoryStore;

    /// Seed and open an election by explicit admin start.
    async fn open_scenario() -> Scenario {
        let scenario = seeded(ElectionSpec::pending_example()).await;
        apply_transition(
            &scenario.store,
            &scenario.admin,
            scenario.election_id,
            Transition::Start,
        )
        .await
        .unwrap();
        scenario
    }

    fn president_selection(scenario: &Scenario, candidate_index: usize) -> Selection {
        Selection {
            position_id: scenario.president.id,
            candidate_id: scenario.pres_candidates[candidate_index].id,
        }
    }

    async fn recorded_ballots(scenario: &Scenario) -> Vec<Ballot> {
        scenario.store.ballots(scenario.election_id).await.unwrap()
    }

    #[tokio::test]
    async fn partial_ballot_accepted_by_default() {
        let scenario = open_scenario().await;
        // President only; Secretary left blank.
        cast_ballot(
            &scenario.store,
            &Config::default(),
            &scenario.voter,
            scenario.election_id,
            vec![president_selection(&scenario, 0)],
        )
        .await
        .unwrap();

        let ballots = recorded_ballots(&scenario).await;
        assert_eq!(ballots.len(), 1);
        assert_eq!(ballots[0].voter_id, scenario.voter.id);
        assert_eq!(ballots[0].selections.len(), 1);
    }

    #[tokio::test]
    async fn second_ballot_is_already_voted() {
        let scenario = open_scenario().await;
        let config = Config::default();
        cast_ballot(
            &scenario.store,
            &config,
            &scenario.voter,
            scenario.election_id,
            vec![president_selection(&scenario, 0)],
        )
        .await
        .unwrap();

        // Any second attempt fails, whatever it selects.
        let err = cast_ballot(
            &scenario.store,
            &config,
            &scenario.voter,
            scenario.election_id,
            vec![president_selection(&scenario, 1)],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::AlreadyVoted));
        assert_eq!(recorded_ballots(&scenario).await.len(), 1);
    }

    #[tokio::test]
    async fn unregistered_voter_is_not_eligible() {
        let scenario = open_scenario().await;
        let stranger = Identity::voter_example();
        let err = cast_ballot(
            &scenario.store,
            &Config::default(),
            &stranger,
            scenario.election_id,
            vec![president_selection(&scenario, 0)],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotEligible(_)));
    }

    #[tokio::test]
    async fn ballots_rejected_outside_the_ongoing_window() {
        // Still pending: voting has not opened.
        let scenario = seeded(ElectionSpec::pending_example()).await;
        let err = cast_ballot(
            &scenario.store,
            &Config::default(),
            &scenario.voter,
            scenario.election_id,
            vec![president_selection(&scenario, 0)],
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::ElectionNotOngoing(crate::model::election::ElectionStatus::Pending)
        ));

        // Stopped: voting is over for good.
        let scenario = open_scenario().await;
        apply_transition(
            &scenario.store,
            &scenario.admin,
            scenario.election_id,
            Transition::Stop,
        )
        .await
        .unwrap();
        let err = cast_ballot(
            &scenario.store,
            &Config::default(),
            &scenario.voter,
            scenario.election_id,
            vec![president_selection(&scenario, 0)],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::ElectionNotOngoing(_)));
    }

    #[tokio::test]
    async fn invalid_selections_never_reach_the_store() {
        let scenario = open_scenario().await;
        let err = cast_ballot(
            &scenario.store,
            &Config::default(),
            &scenario.voter,
            scenario.election_id,
            vec![
                president_selection(&scenario, 0),
                president_selection(&scenario, 1),
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBallot(_)));
        assert!(recorded_ballots(&scenario).await.is_empty());
        // The failed attempt must not consume the voter's one ballot.
        cast_ballot(
            &scenario.store,
            &Config::default(),
            &scenario.voter,
            scenario.election_id,
            vec![president_selection(&scenario, 0)],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn full_ballot_required_when_configured() {
        let scenario = open_scenario().await;
        let config = Config::new(true);
        let err = cast_ballot(
            &scenario.store,
            &config,
            &scenario.voter,
            scenario.election_id,
            vec![president_selection(&scenario, 0)],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBallot(_)));

        cast_ballot(
            &scenario.store,
            &config,
            &scenario.voter,
            scenario.election_id,
            vec![
                president_selection(&scenario, 0),
                Selection {
                    position_id: scenario.secretary.id,
                    candidate_id: scenario.sec_candidate.id,
                },
            ],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn time_opened_scheduled_election_accepts_ballots() {
        // A scheduled election whose window is already open: the stored
        // status stays Scheduled, the effective status is Ongoing. Seeded
        // straight into the store since the editing window has passed.
        let store = MemoryStore::new();
        let voter = Identity::voter_example();
        let now = Utc::now();
        let election = ElectionCore::new(
            ElectionSpec::scheduled_example(now - Duration::hours(1)),
            now - Duration::days(1),
        )
        .unwrap();
        let election_id = match store.insert_election(election).await.unwrap() {
            crate::store::InsertOutcome::Inserted(id) => id,
            crate::store::InsertOutcome::Duplicate => unreachable!("fresh store"),
        };
        let position_id = store
            .insert_position(PositionCore {
                election_id,
                name: "President".to_string(),
            })
            .await
            .unwrap();
        let candidate_id = store
            .insert_candidate(CandidateCore {
                election_id,
                position_id,
                name: "Inigo Montoya".to_string(),
                partylist_id: None,
                platform: None,
            })
            .await
            .unwrap();
        register_voter(&store, &voter, VoterProfile::example())
            .await
            .unwrap();

        cast_ballot(
            &store,
            &Config::default(),
            &voter,
            election_id,
            vec![Selection {
                position_id,
                candidate_id,
            }],
        )
        .await
        .unwrap();

        // The stored status was never written back.
        let stored = store.election(election_id).await.unwrap().unwrap();
        assert_eq!(
            stored.status,
            crate::model::election::ElectionStatus::Scheduled
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_casts_accept_exactly_one() {
        // This test enters the ledger from many tasks at once, so enable logging.
        log4rs_test_utils::test_logging::init_logging_once_for(["councilvote"], None, None);

        const ATTEMPTS: usize = 8;

        let scenario = Arc::new(open_scenario().await);
        let config = Config::default();

        let mut handles = Vec::with_capacity(ATTEMPTS);
        for attempt in 0..ATTEMPTS {
            let scenario = Arc::clone(&scenario);
            let config = config.clone();
            handles.push(tokio::spawn(async move {
                // Valid but distinct selection sets across attempts.
                let selection = president_selection(&scenario, attempt % 2);
                cast_ballot(
                    &scenario.store,
                    &config,
                    &scenario.voter,
                    scenario.election_id,
                    vec![selection],
                )
                .await
            }));
        }

        let mut accepted = 0;
        let mut already_voted = 0;
        for handle in handles {
            match handle.await.expect("task panicked") {
                Ok(()) => accepted += 1,
                Err(Error::AlreadyVoted) => already_voted += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(already_voted, ATTEMPTS - 1);
        assert_eq!(recorded_ballots(&scenario).await.len(), 1);
    }

    #[tokio::test]
    async fn unverified_email_cannot_register() {
        let store = MemoryStore::new();
        let mut voter = Identity::voter_example();
        voter.email_verified = false;
        let err = register_voter(&store, &voter, VoterProfile::example())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn double_registration_is_rejected() {
        let store = MemoryStore::new();
        let voter = Identity::voter_example();
        register_voter(&store, &voter, VoterProfile::example())
            .await
            .unwrap();
        let err = register_voter(&store, &voter, VoterProfile::example())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert!(store.has_voter_profile(voter.id).await.unwrap());
    }

    #[tokio::test]
    async fn tally_reflects_recorded_ballots() {
        let scenario = open_scenario().await;
        let config = Config::default();
        cast_ballot(
            &scenario.store,
            &config,
            &scenario.voter,
            scenario.election_id,
            vec![president_selection(&scenario, 0)],
        )
        .await
        .unwrap();

        // A second registered voter picks the other candidate.
        let rival_fan = Identity::voter_example();
        register_voter(&scenario.store, &rival_fan, VoterProfile::example())
            .await
            .unwrap();
        cast_ballot(
            &scenario.store,
            &config,
            &rival_fan,
            scenario.election_id,
            vec![president_selection(&scenario, 1)],
        )
        .await
        .unwrap();

        let totals = crate::tally::election_tally(&scenario.store, scenario.election_id)
            .await
            .unwrap();
        let votes_for = |id| {
            totals
                .iter()
                .find(|t| t.candidate_id == id)
                .expect("candidate present")
                .votes
        };
        assert_eq!(votes_for(scenario.pres_candidates[0].id), 1);
        assert_eq!(votes_for(scenario.pres_candidates[1].id), 1);
        assert_eq!(votes_for(scenario.sec_candidate.id), 0);

        // Nonexistent elections don't tally.
        let err = crate::tally::election_tally(&scenario.store, crate::model::mongodb::Id::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_election_is_not_found() {
        let scenario = open_scenario().await;
        let err = cast_ballot(
            &scenario.store,
            &Config::default(),
            &scenario.voter,
            Id::new(),
            vec![],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
