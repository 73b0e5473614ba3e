#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::User;

/// The authenticated identity for the current client. Token pair and cached
/// profile are one record so they can never be persisted half-written.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub user: User,
    #[serde(default)]
    pub saved_at: String,
}

impl Session {
    /// A session without an access token is no session at all. Restores and
    /// authentication checks must treat it as absent.
    pub fn is_valid(&self) -> bool {
        return !self.access_token.is_empty();
    }
}
