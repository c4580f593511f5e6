//! Wire protocol for the login endpoints.

use std::collections::BTreeMap;

use qrlogin_session::PublicChallenge;
use serde::{Deserialize, Serialize};

/// Body of a successful `POST /login_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUrlResponse {
    pub login_url: String,
    pub cluster: String,
    pub suuid: String,
    pub timestamp: String,
    /// Session correlation id.
    pub sdk_sid: String,
}

impl From<PublicChallenge> for LoginUrlResponse {
    fn from(challenge: PublicChallenge) -> Self {
        Self {
            login_url: challenge.login_url,
            cluster: challenge.cluster,
            suuid: challenge.suuid,
            timestamp: challenge.timestamp,
            sdk_sid: challenge.session_id.to_string(),
        }
    }
}

/// Body of `POST /get_token` when the challenge expired and was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiredResponse {
    pub error: String,
    pub new_url: String,
    /// Full replacement challenge.
    pub challenge: LoginUrlResponse,
}

impl ExpiredResponse {
    /// Build the expiry notice for a replacement challenge.
    #[must_use]
    pub fn new(window_secs: u64, replacement: PublicChallenge) -> Self {
        let challenge = LoginUrlResponse::from(replacement);
        Self {
            error: format!("Login URL expired after {window_secs}s; a new one was generated"),
            new_url: challenge.login_url.clone(),
            challenge,
        }
    }
}

/// Body of `POST /get_token` when a newer challenge replaced the one being
/// polled. `challenge` is whatever is current by the time the poll stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupersededResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<LoginUrlResponse>,
}

impl SupersededResponse {
    /// Build the notice, pointing at the current challenge if any.
    #[must_use]
    pub fn new(message: impl Into<String>, current: Option<PublicChallenge>) -> Self {
        let challenge = current.map(LoginUrlResponse::from);
        Self {
            error: message.into(),
            new_url: challenge.as_ref().map(|c| c.login_url.clone()),
            challenge,
        }
    }
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `GET /auth/{lang}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelsResponse {
    pub lang: String,
    pub labels: BTreeMap<String, String>,
}
