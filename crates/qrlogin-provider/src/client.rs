//! Riot RSO login provider over reqwest.

use async_trait::async_trait;
use qrlogin_core::{
    LoginChallenge, LoginProvider, PollOutcome, ProviderError, SessionId, TokenResult,
};
use reqwest::{
    Client, RequestBuilder, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, USER_AGENT},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    profile::{Endpoint, ProviderProfile},
    trace,
};

/// Cookie jar and connection pool for one login session.
///
/// Created by [`RiotClient::begin_challenge`] and reused for every later call
/// of the same session. Never shared across sessions.
#[derive(Debug, Clone)]
pub struct ProviderConnection {
    http: Client,
}

/// Login-initiation response. Only the challenge identifiers are read.
#[derive(Debug, Deserialize)]
struct LoginInitResponse {
    #[serde(default)]
    cluster: Option<Value>,
    #[serde(default)]
    suuid: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
}

/// Stateless client for the QR-code login endpoints.
#[derive(Debug, Clone, Default)]
pub struct RiotClient {
    profile: ProviderProfile,
}

impl RiotClient {
    /// Create a client for a provider profile.
    #[must_use]
    pub const fn new(profile: ProviderProfile) -> Self {
        Self { profile }
    }

    /// Request metadata table in use.
    #[must_use]
    pub const fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    fn connect(&self) -> Result<ProviderConnection, ProviderError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(self.profile.request_timeout)
            .build()
            .map_err(transport("client setup"))?;
        Ok(ProviderConnection { http })
    }

    /// Attach client identity and correlation headers. The trace id is fresh
    /// for every call.
    fn decorate(
        &self,
        request: RequestBuilder,
        endpoint: Endpoint,
        session_id: SessionId,
    ) -> RequestBuilder {
        let request = request
            .header(USER_AGENT, self.profile.user_agent(endpoint))
            .header(ACCEPT, "application/json")
            .header("baggage", trace::baggage(session_id))
            .header("traceparent", trace::traceparent());
        match endpoint.content_type() {
            Some(content_type) => request.header(CONTENT_TYPE, content_type),
            None => request,
        }
    }
}

#[async_trait]
impl LoginProvider for RiotClient {
    type Connection = ProviderConnection;

    async fn begin_challenge(
        &self,
        session_id: SessionId,
    ) -> Result<(LoginChallenge, ProviderConnection), ProviderError> {
        let connection = self.connect()?;
        let http = &connection.http;

        // Config and discovery bodies are irrelevant; they only seed cookies.
        let response = self
            .decorate(
                http.get(self.profile.client_config_url()),
                Endpoint::ClientConfig,
                session_id,
            )
            .query(&self.profile.client_config_query())
            .send()
            .await
            .map_err(transport("client config"))?;
        debug!(session_id = %session_id, status = response.status().as_u16(), "client config fetched");

        let response = self
            .decorate(
                http.get(self.profile.discovery_url()),
                Endpoint::Auth,
                session_id,
            )
            .send()
            .await
            .map_err(transport("auth discovery"))?;
        debug!(session_id = %session_id, status = response.status().as_u16(), "auth discovery fetched");

        let response = self
            .decorate(
                http.post(self.profile.login_url()),
                Endpoint::Authenticator,
                session_id,
            )
            .json(&self.profile.login_payload())
            .send()
            .await
            .map_err(transport("login initiation"))?;
        debug!(session_id = %session_id, status = response.status().as_u16(), "login initiated");

        let body: LoginInitResponse = response.json().await.map_err(decode("login initiation"))?;
        let challenge = challenge_from(body)?;

        Ok((challenge, connection))
    }

    async fn poll_once(
        &self,
        connection: &ProviderConnection,
        session_id: SessionId,
    ) -> Result<PollOutcome, ProviderError> {
        let response = self
            .decorate(
                connection.http.get(self.profile.login_url()),
                Endpoint::Authenticator,
                session_id,
            )
            .send()
            .await
            .map_err(transport("token poll"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(PollOutcome::NotReady {
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await.map_err(decode("token poll"))?;
        Ok(PollOutcome::Ready(TokenResult::new(payload)))
    }
}

fn challenge_from(body: LoginInitResponse) -> Result<LoginChallenge, ProviderError> {
    let cluster = field_text(body.cluster);
    let suuid = field_text(body.suuid);
    let timestamp = field_text(body.timestamp);

    match (cluster, suuid, timestamp) {
        (Some(cluster), Some(suuid), Some(timestamp)) => {
            Ok(LoginChallenge::new(cluster, suuid, timestamp))
        }
        (cluster, suuid, timestamp) => {
            let missing = [
                ("cluster", cluster.is_none()),
                ("suuid", suuid.is_none()),
                ("timestamp", timestamp.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            Err(ProviderError::MissingFields(missing))
        }
    }
}

/// Textual form of a challenge field. Null, empty and non-scalar values
/// count as absent.
fn field_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn transport(operation: &'static str) -> impl FnOnce(reqwest::Error) -> ProviderError {
    move |e| ProviderError::Transport {
        operation,
        message: e.to_string(),
    }
}

fn decode(operation: &'static str) -> impl FnOnce(reqwest::Error) -> ProviderError {
    move |e| ProviderError::Decode {
        operation,
        message: e.to_string(),
    }
}
