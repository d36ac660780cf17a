use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::mongodb::Id;

/// Core position data, as stored in the database. A position is one seat
/// being contested in a single election; ordering carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCore {
    /// The election this position belongs to.
    pub election_id: Id,
    /// Position name, e.g. "President".
    pub name: String,
}

/// A position from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub position: PositionCore,
}

impl Deref for Position {
    type Target = PositionCore;

    fn deref(&self) -> &Self::Target {
        &self.position
    }
}
