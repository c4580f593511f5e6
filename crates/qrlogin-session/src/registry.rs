//! Process-wide holder of the current login session.

use std::sync::Arc;

use qrlogin_core::{LoginProvider, PollPolicy, SessionState, TokenResult};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::machine::{PublicChallenge, Session, SessionError, SessionMachine};

/// Registry error.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("No active session")]
    NoActiveSession,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Login challenge expired and no replacement could be issued: {0}")]
    ReplacementFailed(#[source] SessionError),
}

/// Result of polling the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum PollResponse {
    /// The provider issued a token.
    Token(TokenResult),
    /// The window elapsed; `replacement` is now the current session.
    Expired {
        attempts: u32,
        replacement: PublicChallenge,
    },
}

/// Single-slot registry of the current login session.
///
/// At most one session is current. Creating a session retires the previous
/// one; its connection context is dropped once no poll loop holds it.
pub struct SessionRegistry<P>
where
    P: LoginProvider,
{
    machine: SessionMachine<P>,
    current: Mutex<Option<Arc<Session<P::Connection>>>>,
}

impl<P> SessionRegistry<P>
where
    P: LoginProvider,
{
    /// Create an empty registry.
    #[must_use]
    pub fn new(provider: Arc<P>, policy: PollPolicy) -> Self {
        Self {
            machine: SessionMachine::new(provider, policy),
            current: Mutex::new(None),
        }
    }

    /// Polling cadence and window applied to every session.
    #[must_use]
    pub const fn policy(&self) -> PollPolicy {
        self.machine.policy()
    }

    /// Start a new session and make it current.
    ///
    /// The slot stays locked for the whole handshake, so concurrent creators
    /// are serialized. On failure the previous session stays current.
    ///
    /// # Errors
    /// Returns error if the provider handshake fails.
    pub async fn create_new(&self) -> Result<PublicChallenge, RegistryError> {
        let mut slot = self.current.lock().await;
        let session = Arc::new(self.machine.start().await?);
        let public = session.public();

        if let Some(previous) = slot.replace(session) {
            previous.retire();
            info!(
                previous = %previous.id(),
                current = %public.session_id,
                "replaced current session"
            );
        }

        Ok(public)
    }

    /// Poll the current session until it resolves.
    ///
    /// On expiry the registry issues a replacement before returning, so the
    /// caller always gets either a token or a fresh challenge.
    ///
    /// # Errors
    /// Returns [`RegistryError::NoActiveSession`] if no session was ever
    /// created, [`RegistryError::ReplacementFailed`] if the expired session
    /// could not be replaced, or the session error that aborted polling.
    pub async fn poll_current(&self) -> Result<PollResponse, RegistryError> {
        let session = self
            .current
            .lock()
            .await
            .clone()
            .ok_or(RegistryError::NoActiveSession)?;

        match self.machine.poll_until_resolved(&session).await {
            Ok(token) => Ok(PollResponse::Token(token)),
            Err(SessionError::Expired { attempts, .. }) => {
                let replacement = self.replace_expired(&session).await?;
                Ok(PollResponse::Expired {
                    attempts,
                    replacement,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Public fields of the current session, if any.
    pub async fn current(&self) -> Option<PublicChallenge> {
        self.current.lock().await.as_ref().map(|s| s.public())
    }

    /// Lifecycle state of the current session, if any.
    pub async fn current_state(&self) -> Option<SessionState> {
        self.current.lock().await.as_ref().map(|s| s.state())
    }

    async fn replace_expired(
        &self,
        expired: &Arc<Session<P::Connection>>,
    ) -> Result<PublicChallenge, RegistryError> {
        let mut slot = self.current.lock().await;

        // Another caller may have replaced it while we were polling.
        if let Some(current) = slot.as_ref() {
            if !Arc::ptr_eq(current, expired) {
                return Ok(current.public());
            }
        }

        let session = match self.machine.start().await {
            Ok(session) => Arc::new(session),
            Err(e) => {
                warn!(expired = %expired.id(), "failed to issue replacement challenge: {e}");
                return Err(RegistryError::ReplacementFailed(e));
            }
        };
        let public = session.public();

        expired.retire();
        *slot = Some(session);
        info!(
            expired = %expired.id(),
            current = %public.session_id,
            "regenerated expired login challenge"
        );

        Ok(public)
    }
}
