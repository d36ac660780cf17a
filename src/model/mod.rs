pub mod ballot;
pub mod candidate;
pub mod election;
pub mod identity;
pub mod mongodb;
pub mod partylist;
pub mod position;
pub mod voter;

pub use identity::{Identity, Role};
