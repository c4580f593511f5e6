//! Login challenge and token payload types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Session correlation identifier (sent as `sdksid` on every provider call).
pub type SessionId = Uuid;

/// Opaque identifier for one issued challenge.
pub type ChallengeId = Uuid;

/// Base of the mobile QR login page.
const LOGIN_URL_BASE: &str = "https://qrlogin.riotgames.com/riotmobile/";

/// Fixed campaign suffix appended to every login URL.
const LOGIN_URL_TRACKING: &str =
    "utm_source=riotclient&utm_medium=client&utm_campaign=qrlogin-riotmobile";

/// Build the scannable login URL for a challenge.
///
/// The values are inserted verbatim. QR renderers downstream compare the
/// result byte-for-byte, so no percent-encoding is applied.
#[must_use]
pub fn login_url(cluster: &str, suuid: &str, timestamp: &str) -> String {
    format!(
        "{LOGIN_URL_BASE}?cluster={cluster}&suuid={suuid}&timestamp={timestamp}&{LOGIN_URL_TRACKING}"
    )
}

/// Identifiers issued by the provider's login-initiation call.
///
/// Immutable once created. An expired challenge is superseded by a new one,
/// never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginChallenge {
    /// Locally minted identifier for this challenge.
    pub id: ChallengeId,
    /// Provider cluster that issued the challenge.
    pub cluster: String,
    /// Subject UUID assigned by the provider.
    pub suuid: String,
    /// Issue timestamp, kept in the provider's textual form.
    pub timestamp: String,
}

impl LoginChallenge {
    /// Create a challenge with a fresh identifier.
    #[must_use]
    pub fn new(
        cluster: impl Into<String>,
        suuid: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            cluster: cluster.into(),
            suuid: suuid.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Login URL for this challenge.
    #[must_use]
    pub fn login_url(&self) -> String {
        login_url(&self.cluster, &self.suuid, &self.timestamp)
    }
}

/// Token payload returned by the provider once the mobile side completes.
///
/// Only its presence is meaningful here; the content is handed back to the
/// caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenResult(Value);

impl TokenResult {
    /// Wrap a raw provider payload.
    #[must_use]
    pub const fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Borrow the raw payload.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the raw payload.
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }
}
