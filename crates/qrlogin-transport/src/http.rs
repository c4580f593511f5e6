//! HTTP request handlers.
//!
//! `POST /get_token` holds its request open for up to one polling window.
//! Each request runs on its own task, so other requests are unaffected.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use qrlogin_core::{LoginProvider, ProviderError};
use qrlogin_session::{PollResponse, RegistryError, SessionError, SessionRegistry};
use tracing::{debug, warn};

use crate::{
    i18n::{LABELS, TranslateError, Translator, translate_batch, validate_language},
    protocol::{
        ErrorResponse, ExpiredResponse, LabelsResponse, LoginUrlResponse, SupersededResponse,
    },
};

/// Application state shared across handlers.
pub struct AppState<P>
where
    P: LoginProvider,
{
    /// Current-session registry.
    pub registry: Arc<SessionRegistry<P>>,
    /// Label translation backend.
    pub translator: Arc<dyn Translator>,
    /// Language the labels are written in.
    pub source_language: Arc<str>,
}

impl<P> AppState<P>
where
    P: LoginProvider,
{
    /// Create new application state.
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry<P>>,
        translator: Arc<dyn Translator>,
        source_language: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            registry,
            translator,
            source_language: source_language.into(),
        }
    }
}

impl<P> Clone for AppState<P>
where
    P: LoginProvider,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            translator: Arc::clone(&self.translator),
            source_language: Arc::clone(&self.source_language),
        }
    }
}

/// Create the login API router.
///
/// # Example
/// ```ignore
/// let app = create_router(state).layer(TraceLayer::new_for_http());
/// ```
pub fn create_router<P>(state: AppState<P>) -> Router
where
    P: LoginProvider + 'static,
{
    Router::new()
        .route("/login_url", post(login_url_handler::<P>))
        .route("/get_token", post(get_token_handler::<P>))
        .route("/auth/{lang}", get(labels_handler::<P>))
        .route("/auth/{lang}/", get(labels_handler::<P>))
        .with_state(state)
}

/// Error surfaced to HTTP callers.
#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    Translate(TranslateError),
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<TranslateError> for ApiError {
    fn from(e: TranslateError) -> Self {
        Self::Translate(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Registry(RegistryError::NoActiveSession) => StatusCode::BAD_REQUEST,
            Self::Registry(
                RegistryError::Session(SessionError::Provider(e))
                | RegistryError::ReplacementFailed(SessionError::Provider(e)),
            ) => provider_status(e),
            Self::Registry(RegistryError::Session(SessionError::Superseded(_))) => {
                StatusCode::CONFLICT
            }
            Self::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Translate(TranslateError::UnsupportedLanguage(_)) => StatusCode::BAD_REQUEST,
            Self::Translate(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Registry(e) => e.to_string(),
            Self::Translate(e) => e.to_string(),
        }
    }
}

const fn provider_status(e: &ProviderError) -> StatusCode {
    if e.is_missing_fields() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.message();
        if status.is_server_error() {
            warn!(status = status.as_u16(), "request failed: {error}");
        } else {
            debug!(status = status.as_u16(), "request rejected: {error}");
        }
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Start a new login challenge and make it current.
async fn login_url_handler<P>(
    State(state): State<AppState<P>>,
) -> Result<Json<LoginUrlResponse>, ApiError>
where
    P: LoginProvider + 'static,
{
    let challenge = state.registry.create_new().await?;
    Ok(Json(challenge.into()))
}

/// Wait for the current challenge to be scanned.
async fn get_token_handler<P>(State(state): State<AppState<P>>) -> Result<Response, ApiError>
where
    P: LoginProvider + 'static,
{
    match state.registry.poll_current().await {
        Ok(PollResponse::Token(token)) => Ok(Json(token.into_inner()).into_response()),
        Ok(PollResponse::Expired { replacement, .. }) => {
            let window = state.registry.policy().window.as_secs();
            Ok(Json(ExpiredResponse::new(window, replacement)).into_response())
        }
        Err(e @ RegistryError::Session(SessionError::Superseded(_))) => {
            debug!("poll stopped: {e}");
            let current = state.registry.current().await;
            let body = SupersededResponse::new(e.to_string(), current);
            Ok((StatusCode::CONFLICT, Json(body)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Login page labels in the requested language.
async fn labels_handler<P>(
    State(state): State<AppState<P>>,
    Path(lang): Path<String>,
) -> Result<Json<LabelsResponse>, ApiError>
where
    P: LoginProvider + 'static,
{
    let target = validate_language(&lang)?;
    let texts: Vec<&str> = LABELS.iter().map(|(_, text)| *text).collect();

    let translated = translate_batch(
        state.translator.as_ref(),
        &texts,
        &state.source_language,
        target,
    )
    .await?;

    let labels: BTreeMap<String, String> = LABELS
        .iter()
        .map(|(key, _)| (*key).to_string())
        .zip(translated)
        .collect();

    Ok(Json(LabelsResponse {
        lang: target.to_string(),
        labels,
    }))
}
