use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::mongodb::Id;

/// The role attached to an authenticated account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Voter,
}

/// An authenticated caller, as attested by the session collaborator.
///
/// The engine trusts this value; producing it (cookies, tokens, whatever) is
/// the embedding application's job. Every operation takes it as an explicit
/// argument instead of reading ambient session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Account ID. For voters this is also the key of their voter profile.
    pub id: Id,
    pub role: Role,
    pub email_verified: bool,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject the caller unless they hold the admin role.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Unauthorized(
                "administrator role required".to_string(),
            ))
        }
    }
}
