//! Request metadata the provider expects from a desktop Riot Client.
//!
//! Everything the handshake sends that is not session-specific lives here,
//! so a protocol bump only touches this table.

use std::time::Duration;

use serde_json::{Value, json};

/// Riot Client SDK version reported in user agents and the login payload.
pub const SDK_VERSION: &str = "24.9.1.4445";

/// Client build reported to the config service.
pub const CLIENT_VERSION: &str = "97.0.1.2366";

/// Default timeout for a single provider request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider endpoint families. Each identifies itself with its own
/// user-agent component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `clientconfig.rpg.riotgames.com`
    ClientConfig,
    /// `auth.riotgames.com`
    Auth,
    /// `authenticate.riotgames.com`
    Authenticator,
}

impl Endpoint {
    /// User-agent component name.
    #[must_use]
    pub const fn component(self) -> &'static str {
        match self {
            Self::ClientConfig => "client-config",
            Self::Auth => "rso-auth",
            Self::Authenticator => "rso-authenticator",
        }
    }

    /// `content-type` the endpoint expects on every call, bodiless polls
    /// included.
    #[must_use]
    pub const fn content_type(self) -> Option<&'static str> {
        match self {
            Self::Authenticator => Some("application/json"),
            Self::ClientConfig | Self::Auth => None,
        }
    }
}

/// Versioned client identity and endpoint table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub client_config_base: String,
    pub auth_base: String,
    pub authenticate_base: String,
    pub sdk_version: String,
    pub client_version: String,
    pub region: String,
    pub language: String,
    pub patchline: String,
    pub request_timeout: Duration,
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self {
            client_config_base: "https://clientconfig.rpg.riotgames.com".to_string(),
            auth_base: "https://auth.riotgames.com".to_string(),
            authenticate_base: "https://authenticate.riotgames.com".to_string(),
            sdk_version: SDK_VERSION.to_string(),
            client_version: CLIENT_VERSION.to_string(),
            region: "KR".to_string(),
            language: "ko_KR".to_string(),
            patchline: "KeystoneFoundationLiveWin".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ProviderProfile {
    /// Point all three endpoint families at one base URL.
    #[must_use]
    pub fn with_base_url(self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.with_client_config_base(base.clone())
            .with_auth_base(base.clone())
            .with_authenticate_base(base)
    }

    /// Override the config service base URL.
    #[must_use]
    pub fn with_client_config_base(mut self, base: impl Into<String>) -> Self {
        self.client_config_base = trim_base(base.into());
        self
    }

    /// Override the auth discovery base URL.
    #[must_use]
    pub fn with_auth_base(mut self, base: impl Into<String>) -> Self {
        self.auth_base = trim_base(base.into());
        self
    }

    /// Override the authenticator base URL.
    #[must_use]
    pub fn with_authenticate_base(mut self, base: impl Into<String>) -> Self {
        self.authenticate_base = trim_base(base.into());
        self
    }

    /// Override the region sent to the config service.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Override the login language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `user-agent` for an endpoint family.
    #[must_use]
    pub fn user_agent(&self, endpoint: Endpoint) -> String {
        format!(
            "RiotGamesApi/{} {} (Windows;10;;Professional, x64) riot_client/0",
            self.sdk_version,
            endpoint.component()
        )
    }

    #[must_use]
    pub fn client_config_url(&self) -> String {
        format!("{}/api/v1/config/public", self.client_config_base)
    }

    #[must_use]
    pub fn discovery_url(&self) -> String {
        format!("{}/.well-known/openid-configuration", self.auth_base)
    }

    /// Login initiation (POST) and token poll (GET) share this URL.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/api/v1/login", self.authenticate_base)
    }

    /// Query string for the config handshake.
    #[must_use]
    pub fn client_config_query(&self) -> [(&'static str, &str); 5] {
        [
            ("os", "windows"),
            ("region", &self.region),
            ("app", "Riot Client"),
            ("version", &self.client_version),
            ("patchline", &self.patchline),
        ]
    }

    /// Login initiation body requesting a QR-code flow.
    #[must_use]
    pub fn login_payload(&self) -> Value {
        json!({
            "apple": null,
            "campaign": null,
            "clientId": "riot-client",
            "code": null,
            "facebook": null,
            "gamecenter": null,
            "google": null,
            "language": self.language,
            "mockDeviceId": null,
            "mockPlatform": null,
            "multifactor": null,
            "nintendo": null,
            "platform": "windows",
            "playstation": null,
            "qrcode": {},
            "remember": false,
            "riot_identity": null,
            "riot_identity_signup": null,
            "rso": null,
            "sdkVersion": self.sdk_version,
            "type": "auth",
            "xbox": null
        })
    }
}

fn trim_base(base: String) -> String {
    match base.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => base,
    }
}
