//! Core traits for talking to the identity provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{LoginChallenge, SessionId, TokenResult};

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Challenge issued, no poll started yet.
    Created,
    /// A poll loop is running against the provider.
    Polling,
    /// The provider returned a token.
    Completed,
    /// The polling window elapsed without a token.
    Expired,
}

impl SessionState {
    /// Whether the session can never be polled again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }
}

/// Result of a single poll call.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The provider answered with a completed token payload.
    Ready(TokenResult),
    /// Any non-success status. The mobile side has not finished yet.
    NotReady {
        /// HTTP status reported by the provider.
        status: u16,
    },
}

/// Provider error.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Required fields missing from login response: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Transport error during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },
    #[error("Malformed response during {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Whether the login-initiation response lacked correlation fields.
    #[must_use]
    pub const fn is_missing_fields(&self) -> bool {
        matches!(self, Self::MissingFields(_))
    }
}

/// Trait for identity provider clients.
///
/// Implementations carry no retry logic; every method maps to one remote
/// exchange (or the fixed handshake sequence for [`begin_challenge`]).
///
/// [`begin_challenge`]: LoginProvider::begin_challenge
#[async_trait]
pub trait LoginProvider: Send + Sync {
    /// Transport state that must be reused for every call of one session
    /// (cookie jar, pooled connections).
    type Connection: Send + Sync + 'static;

    /// Run the handshake and obtain a fresh login challenge.
    ///
    /// # Errors
    /// Returns [`ProviderError::MissingFields`] if the provider omitted any of
    /// the challenge identifiers, or a transport/decode error.
    async fn begin_challenge(
        &self,
        session_id: SessionId,
    ) -> Result<(LoginChallenge, Self::Connection), ProviderError>;

    /// Ask once whether the challenge has been completed.
    ///
    /// # Errors
    /// Returns error only on transport failure or an unreadable success body.
    /// A non-success status is [`PollOutcome::NotReady`].
    async fn poll_once(
        &self,
        connection: &Self::Connection,
        session_id: SessionId,
    ) -> Result<PollOutcome, ProviderError>;
}
