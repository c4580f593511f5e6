//! Lifecycle of a single login attempt.

use std::{
    sync::{
        Arc, Mutex, OnceLock, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use qrlogin_core::{
    ChallengeId, LoginChallenge, LoginProvider, PollOutcome, PollPolicy, ProviderError,
    RetryOutcome, SessionId, SessionState, TokenResult,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session error.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Polling window of {}s elapsed after {attempts} attempts", .window.as_secs())]
    Expired { attempts: u32, window: Duration },
    #[error("Session {0} was replaced while polling")]
    Superseded(SessionId),
}

/// Fields a caller needs to render the login link or QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicChallenge {
    pub login_url: String,
    pub cluster: String,
    pub suuid: String,
    pub timestamp: String,
    pub session_id: SessionId,
    pub challenge_id: ChallengeId,
}

/// One login attempt bound to its connection context.
///
/// The connection is never shared with another session. Once retired (replaced
/// in the registry) the session is never polled again.
pub struct Session<C> {
    id: SessionId,
    challenge: LoginChallenge,
    connection: C,
    state: Mutex<SessionState>,
    token: OnceLock<TokenResult>,
    retired: AtomicBool,
    // Serializes poll loops against the same connection.
    poll_lock: tokio::sync::Mutex<()>,
}

impl<C> Session<C> {
    fn new(id: SessionId, challenge: LoginChallenge, connection: C) -> Self {
        Self {
            id,
            challenge,
            connection,
            state: Mutex::new(SessionState::Created),
            token: OnceLock::new(),
            retired: AtomicBool::new(false),
            poll_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Correlation identifier sent with every provider call.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The challenge this session was created for.
    #[must_use]
    pub const fn challenge(&self) -> &LoginChallenge {
        &self.challenge
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a newer session has replaced this one.
    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Public fields for rendering.
    #[must_use]
    pub fn public(&self) -> PublicChallenge {
        PublicChallenge {
            login_url: self.challenge.login_url(),
            cluster: self.challenge.cluster.clone(),
            suuid: self.challenge.suuid.clone(),
            timestamp: self.challenge.timestamp.clone(),
            session_id: self.id,
            challenge_id: self.challenge.id,
        }
    }

    pub(crate) fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(session_id = %self.id, from = ?*state, to = ?next, "session state change");
        *state = next;
    }
}

impl<C> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("challenge", &self.challenge)
            .field("state", &self.state())
            .field("retired", &self.is_retired())
            .finish_non_exhaustive()
    }
}

/// Drives sessions from challenge issuance to a terminal outcome.
pub struct SessionMachine<P>
where
    P: LoginProvider,
{
    provider: Arc<P>,
    policy: PollPolicy,
}

impl<P> SessionMachine<P>
where
    P: LoginProvider,
{
    /// Create a new state machine.
    #[must_use]
    pub const fn new(provider: Arc<P>, policy: PollPolicy) -> Self {
        Self { provider, policy }
    }

    /// Polling cadence and window.
    #[must_use]
    pub const fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Start a new login attempt.
    ///
    /// # Errors
    /// Returns error if the provider handshake fails or omits challenge fields.
    pub async fn start(&self) -> Result<Session<P::Connection>, SessionError> {
        let session_id = Uuid::new_v4();
        let (challenge, connection) = self.provider.begin_challenge(session_id).await?;

        info!(
            session_id = %session_id,
            challenge_id = %challenge.id,
            cluster = %challenge.cluster,
            "login challenge issued"
        );

        Ok(Session::new(session_id, challenge, connection))
    }

    /// Poll until the provider returns a token or the window elapses.
    ///
    /// Suspends the calling task for up to the whole polling window.
    /// A completed session returns its token again without a provider call.
    ///
    /// # Errors
    /// Returns [`SessionError::Expired`] when no attempt succeeded within the
    /// window, [`SessionError::Superseded`] when the session was replaced, or
    /// the provider error that aborted the attempt.
    pub async fn poll_until_resolved(
        &self,
        session: &Session<P::Connection>,
    ) -> Result<TokenResult, SessionError> {
        let _guard = session.poll_lock.lock().await;

        if session.state().is_terminal() {
            // The token is only ever set on completion.
            return match session.token.get() {
                Some(token) => Ok(token.clone()),
                None => Err(SessionError::Expired {
                    attempts: 0,
                    window: self.policy.window,
                }),
            };
        }
        if session.is_retired() {
            return Err(SessionError::Superseded(session.id));
        }

        session.set_state(SessionState::Polling);
        let started = Instant::now();

        let outcome = self
            .policy
            .run(move |attempt| async move {
                if session.is_retired() {
                    return Err(SessionError::Superseded(session.id));
                }
                match self.provider.poll_once(&session.connection, session.id).await? {
                    PollOutcome::Ready(token) => Ok(Some(token)),
                    PollOutcome::NotReady { status } => {
                        debug!(session_id = %session.id, attempt, status, "token not ready");
                        Ok(None)
                    }
                }
            })
            .await;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match outcome {
            Ok(RetryOutcome::Ready { value, attempts }) => {
                info!(session_id = %session.id, attempts, elapsed_ms, "login completed");
                let token = session.token.get_or_init(|| value).clone();
                session.set_state(SessionState::Completed);
                Ok(token)
            }
            Ok(RetryOutcome::DeadlineElapsed { attempts }) => {
                info!(session_id = %session.id, attempts, elapsed_ms, "polling window elapsed");
                session.set_state(SessionState::Expired);
                Err(SessionError::Expired {
                    attempts,
                    window: self.policy.window,
                })
            }
            Err(SessionError::Superseded(id)) => {
                debug!(session_id = %id, "stopped polling replaced session");
                Err(SessionError::Superseded(id))
            }
            Err(e) => {
                warn!(session_id = %session.id, elapsed_ms, "poll aborted: {e}");
                // Connection state is still valid, so the session stays pollable.
                session.set_state(SessionState::Created);
                Err(e)
            }
        }
    }
}
