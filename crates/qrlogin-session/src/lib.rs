//! Login session orchestration.
//!
//! Provides:
//! - `SessionMachine` - Drive one login attempt from challenge to token or expiry
//! - `SessionRegistry` - Hold the single current session and regenerate it on expiry

pub mod machine;
pub mod registry;

pub use machine::{PublicChallenge, Session, SessionError, SessionMachine};
pub use registry::{PollResponse, RegistryError, SessionRegistry};
