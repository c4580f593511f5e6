//! Core abstractions for QR-code login sessions.
//!
//! This crate provides the fundamental building blocks:
//! - `LoginChallenge` - Provider-issued identifiers behind a scannable login URL
//! - `TokenResult` - Opaque token payload passed through to callers
//! - `PollPolicy` - Fixed-cadence retry bounded by a polling window
//! - `LoginProvider` trait

pub mod challenge;
pub mod retry;
pub mod traits;

pub use challenge::{ChallengeId, LoginChallenge, SessionId, TokenResult, login_url};
pub use retry::{PollPolicy, RetryOutcome};
pub use traits::{LoginProvider, PollOutcome, ProviderError, SessionState};
