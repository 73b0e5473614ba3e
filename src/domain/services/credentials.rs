#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Session;

const SESSION_FILE: &str = "session.json";

/// Durable client-side persistence for the session record. The whole record
/// is one JSON file written through a temp-file rename, so a token can never
/// be stored without its profile or vice versa.
pub struct CredentialStore {
    pub state_dir: path::PathBuf,
}

impl Default for CredentialStore {
    fn default() -> CredentialStore {
        return CredentialStore::new(path::PathBuf::from(Config::get(ConfigKey::StateDir)));
    }
}

impl CredentialStore {
    pub fn new(state_dir: path::PathBuf) -> CredentialStore {
        return CredentialStore { state_dir };
    }

    fn session_path(&self) -> path::PathBuf {
        return self.state_dir.join(SESSION_FILE);
    }

    /// Loads the persisted session, if any. A missing, unreadable, or
    /// tokenless record all count as "no session" so startup restore can only
    /// land in authenticated or anonymous, never in between.
    pub async fn load(&self) -> Result<Option<Session>> {
        let session_path = self.session_path();
        if !session_path.exists() {
            return Ok(None);
        }

        let payload = fs::read_to_string(&session_path).await?;
        let session: Session = match serde_json::from_str(&payload) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = ?err, "stored session is unreadable, treating as absent");
                return Ok(None);
            }
        };

        if !session.is_valid() {
            return Ok(None);
        }

        return Ok(Some(session));
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        let payload = serde_json::to_string(session)?;

        if !self.state_dir.exists() {
            fs::create_dir_all(&self.state_dir).await?;
        }

        let tmp_path = self.state_dir.join(format!("{SESSION_FILE}.tmp"));
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(payload.as_bytes()).await?;
        file.flush().await?;
        fs::rename(&tmp_path, self.session_path()).await?;

        return Ok(());
    }

    /// Removes the stored session. Clearing an already empty store succeeds.
    pub async fn clear(&self) -> Result<()> {
        let session_path = self.session_path();
        if !session_path.exists() {
            return Ok(());
        }

        fs::remove_file(session_path).await?;
        return Ok(());
    }
}
