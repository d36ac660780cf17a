//! Election lifecycle and ballot integrity engine.
//!
//! The engine is invoked in-process by request handlers; it owns no wire
//! protocol and runs no server. Callers hand every operation an explicit
//! [`Identity`](model::Identity) rather than relying on ambient session state.
//!
//! The entry points are:
//! - [`ElectionCore::effective_status`](model::election::ElectionCore::effective_status)
//!   for time-aware status derivation,
//! - [`lifecycle::may_mutate`] for lifecycle gating,
//! - [`validate::validate_ballot`] for structural ballot validation,
//! - [`ops::voting::cast_ballot`] for the at-most-one-ballot guarantee,
//! - [`ops::transition::apply_transition`] for explicit admin transitions,
//! - [`ops::admin`] for lifecycle-gated administrative mutations.
//!
//! Persistence sits behind the [`store::Store`] trait; see
//! [`store::MongoStore`] and [`store::MemoryStore`].

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod ops;
pub mod store;
pub mod tally;
pub mod validate;

pub use config::Config;
pub use error::{Error, Result};
