use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::mongodb::Id;

/// Core partylist data, as stored in the database. Partylist names are
/// unique within their election (unique index on `(election_id, name)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartylistCore {
    pub election_id: Id,
    pub name: String,
}

/// A partylist from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partylist {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub partylist: PartylistCore,
}

impl Deref for Partylist {
    type Target = PartylistCore;

    fn deref(&self) -> &Self::Target {
        &self.partylist
    }
}
