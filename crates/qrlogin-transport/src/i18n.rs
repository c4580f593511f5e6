//! Translation of the login page labels.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// Language the labels are written in.
pub const SOURCE_LANGUAGE: &str = "ko";

/// Login page labels, keyed by role.
pub const LABELS: [(&str, &str); 14] = [
    ("title", "로그인"),
    ("description", "라이엇 모바일을 통해 로그인"),
    ("generating", "로그인 Url 생성중.."),
    ("generation_failed", "로그인 Url 생성 실패"),
    ("mobile_login", "모바일 환경에서 바로 로그인하기"),
    ("scan_prompt", "QR코드를 스캔하거나 Url에 방문해주세요."),
    ("expired", "로그인 Url만료 새 Url을 생성합니다."),
    ("remaining_time", "남은 시간"),
    ("token_error", "토큰 확인 중 오류 발생"),
    ("login_complete", "로그인 완료"),
    ("support", "고객지원"),
    ("privacy_policy", "개인정보 처리방침"),
    ("terms_of_service", "서비스 약관"),
    ("cookie_settings", "쿠키 설정"),
];

/// Translation error.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),
    #[error("Translation request failed: {0}")]
    Transport(String),
    #[error("Unexpected translation response: {0}")]
    Decode(String),
}

/// Trait for translation backends.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one string.
    async fn translate(&self, text: &str, source: &str, target: &str)
    -> Result<String, TranslateError>;
}

/// Accept short BCP-47-ish codes such as `en`, `pt-BR` or `zh_TW`.
///
/// # Errors
/// Returns [`TranslateError::UnsupportedLanguage`] for anything else.
pub fn validate_language(code: &str) -> Result<&str, TranslateError> {
    let valid = !code.is_empty()
        && code.len() <= 16
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(code)
    } else {
        Err(TranslateError::UnsupportedLanguage(code.to_string()))
    }
}

/// Translate all `texts` concurrently.
///
/// Output index `i` is the translation of input index `i`. When `source`
/// equals `target` the input is returned without calling the backend.
///
/// # Errors
/// Returns the first backend error.
pub async fn translate_batch(
    translator: &dyn Translator,
    texts: &[&str],
    source: &str,
    target: &str,
) -> Result<Vec<String>, TranslateError> {
    if source == target {
        return Ok(texts.iter().map(|t| (*t).to_string()).collect());
    }

    try_join_all(
        texts
            .iter()
            .map(|text| translator.translate(text, source, target)),
    )
    .await
}

/// Google Translate web endpoint backend.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    http: Client,
    endpoint: String,
}

impl GoogleTranslator {
    /// Create a backend with a per-request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, TranslateError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslateError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
        })
    }

    /// Override the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslateError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Decode(e.to_string()))?;
        join_segments(&body)
    }
}

/// The endpoint answers `[[["<translated>", "<original>", ...], ...], ...]`.
fn join_segments(body: &Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Decode("missing segment list".to_string()))?;

    segments
        .iter()
        .map(|segment| {
            segment
                .get(0)
                .and_then(Value::as_str)
                .ok_or_else(|| TranslateError::Decode("segment without text".to_string()))
        })
        .collect()
}
