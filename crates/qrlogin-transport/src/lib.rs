//! HTTP JSON adapter for QR-code login.
//!
//! Provides:
//! - Wire protocol (JSON response bodies)
//! - Axum router over a `SessionRegistry`
//! - Label translation with a pass-through fast path

pub mod http;
pub mod i18n;
pub mod protocol;

pub use http::{AppState, create_router};
pub use i18n::{GoogleTranslator, TranslateError, Translator, translate_batch};
pub use protocol::{
    ErrorResponse, ExpiredResponse, LabelsResponse, LoginUrlResponse, SupersededResponse,
};
