mod db;
mod election_core;
mod spec;

pub use db::Election;
pub use election_core::{ElectionCore, ElectionStatus};
pub use spec::ElectionSpec;
