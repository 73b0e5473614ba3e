#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::RwLock;

use chrono::Local;
use chrono::SecondsFormat;
use tokio::sync::mpsc;

use super::CredentialStore;
use crate::domain::models::Event;
use crate::domain::models::GatewayBox;
use crate::domain::models::LoginData;
use crate::domain::models::Notice;
use crate::domain::models::RegisterData;
use crate::domain::models::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Restoring,
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Shared read-only projection of the current session. Every component that
/// needs the identity or the bearer token holds a clone of this handle; only
/// the [`SessionManager`] in this module can replace its contents.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    pub fn current(&self) -> Option<Session> {
        return self.inner.read().unwrap().clone();
    }

    /// The bearer token, when a session with a non-empty token is present.
    pub fn access_token(&self) -> Option<String> {
        return self
            .inner
            .read()
            .unwrap()
            .as_ref()
            .filter(|session| return session.is_valid())
            .map(|session| return session.access_token.to_string());
    }

    /// Derived from token presence. There is no separate flag to drift out of
    /// sync with the stored session.
    pub fn is_authenticated(&self) -> bool {
        return self.access_token().is_some();
    }

    fn replace(&self, session: Option<Session>) {
        *self.inner.write().unwrap() = session;
    }

    #[cfg(test)]
    pub(crate) fn stub(session: Option<Session>) -> SessionHandle {
        let handle = SessionHandle::default();
        handle.replace(session);
        return handle;
    }
}

/// Owns the authentication state machine and the credential store. Login,
/// logout, and register report their outcome as a plain boolean so the view
/// layer can decide where to navigate; errors never escape this boundary.
pub struct SessionManager {
    store: CredentialStore,
    gateway: GatewayBox,
    handle: SessionHandle,
    state: AuthState,
    registering: bool,
    tx: mpsc::UnboundedSender<Event>,
}

impl SessionManager {
    pub fn new(
        store: CredentialStore,
        gateway: GatewayBox,
        handle: SessionHandle,
        tx: mpsc::UnboundedSender<Event>,
    ) -> SessionManager {
        return SessionManager {
            store,
            gateway,
            handle,
            state: AuthState::Restoring,
            registering: false,
            tx,
        };
    }

    pub fn handle(&self) -> SessionHandle {
        return self.handle.clone();
    }

    pub fn state(&self) -> AuthState {
        return self.state;
    }

    pub fn is_authenticated(&self) -> bool {
        return self.handle.is_authenticated();
    }

    /// Rehydrates the session from the credential store. Runs once per
    /// process before any command executes; subsequent calls are no-ops.
    pub async fn restore(&mut self) {
        if self.state != AuthState::Restoring {
            return;
        }

        match self.store.load().await {
            Ok(Some(session)) => {
                self.handle.replace(Some(session));
                self.state = AuthState::Authenticated;
            }
            Ok(None) => {
                self.state = AuthState::Anonymous;
            }
            Err(err) => {
                tracing::warn!(error = ?err, "failed to read the credential store");
                self.state = AuthState::Anonymous;
            }
        }
    }

    /// Returns true when the caller should navigate to the signed-in area.
    /// Any failure lands back in anonymous with a notice already surfaced.
    pub async fn login(&mut self, data: &LoginData) -> bool {
        if self.state == AuthState::Authenticating {
            return false;
        }
        self.state = AuthState::Authenticating;

        let res = match self.gateway.login(data).await {
            Ok(res) => res,
            Err(_) => {
                // The gateway already surfaced the transport error.
                self.state = AuthState::Anonymous;
                return false;
            }
        };

        let accepted = res.success
            && res.access.as_deref().is_some_and(|token| return !token.is_empty())
            && res.user.is_some();
        if !accepted {
            let message = res.message.unwrap_or_else(|| return "Login failed".to_string());
            self.notify(Notice::error(&message));
            self.state = AuthState::Anonymous;
            return false;
        }

        let session = Session {
            access_token: res.access.unwrap(),
            refresh_token: res.refresh.unwrap_or_default(),
            user: res.user.unwrap(),
            saved_at: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        };

        if let Err(err) = self.store.save(&session).await {
            tracing::error!(error = ?err, "failed to persist the session");
            self.notify(Notice::error("Login succeeded but the session could not be saved"));
            let _ = self.store.clear().await;
            self.state = AuthState::Anonymous;
            return false;
        }

        self.handle.replace(Some(session));
        self.state = AuthState::Authenticated;
        self.notify(Notice::success("Login successful"));
        return true;
    }

    /// Unconditional. Store failures are logged, never raised, so logout can
    /// always complete.
    pub async fn logout(&mut self) {
        self.handle.replace(None);
        self.state = AuthState::Anonymous;

        if let Err(err) = self.store.clear().await {
            tracing::warn!(error = ?err, "failed to clear the credential store");
        }

        self.notify(Notice::success("Successfully logged out"));
    }

    /// Registration never changes the authentication state; it only reports
    /// whether the caller should route the user to the login screen.
    pub async fn register(&mut self, data: &RegisterData) -> bool {
        if self.registering {
            return false;
        }
        self.registering = true;
        let res = self.gateway.register(data).await;
        self.registering = false;

        match res {
            Ok(res) if res.success => {
                self.notify(Notice::success("Registration successful. Please log in."));
                return true;
            }
            Ok(res) => {
                let message = res
                    .message
                    .unwrap_or_else(|| return "Registration failed".to_string());
                self.notify(Notice::error(&message));
                return false;
            }
            Err(_) => {
                return false;
            }
        }
    }

    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(Event::Notice(notice));
    }
}
