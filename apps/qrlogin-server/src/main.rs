//! QR-code login proxy server.
//!
//! Run with: cargo run -p qrlogin-server -- --bind 127.0.0.1:3000
//!
//! `POST /login_url` issues a challenge, `POST /get_token` waits for the
//! mobile app to complete it, `GET /auth/{lang}` serves translated labels.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use qrlogin_core::PollPolicy;
use qrlogin_provider::{ProviderProfile, RiotClient};
use qrlogin_session::SessionRegistry;
use qrlogin_transport::{AppState, GoogleTranslator, create_router, i18n::SOURCE_LANGUAGE};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// QR-code login proxy
#[derive(Parser, Debug)]
#[command(name = "qrlogin-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "QRLOGIN_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Seconds between token polls
    #[arg(long, env = "QRLOGIN_POLL_INTERVAL_SECS", default_value = "2")]
    poll_interval_secs: u64,

    /// Seconds a login URL stays pollable before it is regenerated
    #[arg(long, env = "QRLOGIN_POLL_WINDOW_SECS", default_value = "60")]
    poll_window_secs: u64,

    /// Timeout for each provider and translation request, in seconds
    #[arg(long, env = "QRLOGIN_REQUEST_TIMEOUT_SECS", default_value = "10")]
    request_timeout_secs: u64,

    /// Region reported to the client config service
    #[arg(long, env = "QRLOGIN_REGION", default_value = "KR")]
    region: String,

    /// Login language sent with the login request
    #[arg(long, env = "QRLOGIN_LANGUAGE", default_value = "ko_KR")]
    language: String,

    /// Language the page labels are written in
    #[arg(long, env = "QRLOGIN_SOURCE_LANG", default_value = SOURCE_LANGUAGE)]
    source_lang: String,

    /// Override the client config service base URL
    #[arg(long, env = "QRLOGIN_CLIENT_CONFIG_BASE")]
    client_config_base: Option<String>,

    /// Override the auth discovery base URL
    #[arg(long, env = "QRLOGIN_AUTH_BASE")]
    auth_base: Option<String>,

    /// Override the authenticator base URL
    #[arg(long, env = "QRLOGIN_AUTHENTICATE_BASE")]
    authenticate_base: Option<String>,
}

impl Args {
    fn policy(&self) -> PollPolicy {
        PollPolicy::default()
            .with_interval(Duration::from_secs(self.poll_interval_secs))
            .with_window(Duration::from_secs(self.poll_window_secs))
    }

    fn profile(&self) -> ProviderProfile {
        let mut profile = ProviderProfile::default()
            .with_region(self.region.clone())
            .with_language(self.language.clone())
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs));
        if let Some(base) = &self.client_config_base {
            profile = profile.with_client_config_base(base.clone());
        }
        if let Some(base) = &self.auth_base {
            profile = profile.with_auth_base(base.clone());
        }
        if let Some(base) = &self.authenticate_base {
            profile = profile.with_authenticate_base(base.clone());
        }
        profile
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let policy = args.policy();

    let provider = Arc::new(RiotClient::new(args.profile()));
    let region = provider.profile().region.clone();
    let registry = Arc::new(SessionRegistry::new(provider, policy));
    let translator = GoogleTranslator::new(Duration::from_secs(args.request_timeout_secs))?;
    let state = AppState::new(registry, Arc::new(translator), args.source_lang.as_str());

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(
        interval_secs = policy.interval.as_secs(),
        window_secs = policy.window.as_secs(),
        region = %region,
        "Server listening on http://{}",
        args.bind
    );

    axum::serve(listener, app).await?;
    Ok(())
}
