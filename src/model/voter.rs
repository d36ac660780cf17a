use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use super::mongodb::Id;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Core voter profile data, as stored in the database.
///
/// Collected once at registration and immutable thereafter; a voter without
/// a profile is not eligible to cast ballots. `voter_id` is the
/// authenticated account ID and carries a unique index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCore {
    /// The account this profile belongs to. One profile per account.
    pub voter_id: Id,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub address: String,
    pub phone: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub registered_at: DateTime<Utc>,
}

impl VoterCore {
    pub fn new(voter_id: Id, profile: VoterProfile, now: DateTime<Utc>) -> Self {
        Self {
            voter_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            birth_date: profile.birth_date,
            gender: profile.gender,
            address: profile.address,
            phone: profile.phone,
            registered_at: now,
        }
    }
}

/// A voter from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

/// Profile attributes submitted once at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterProfile {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub address: String,
    pub phone: String,
}
