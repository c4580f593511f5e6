//! HTTP client for the Riot RSO QR-code login handshake.
//!
//! Provides:
//! - `ProviderProfile` - Versioned request metadata (hosts, client identity, payload)
//! - `RiotClient` - `LoginProvider` implementation over reqwest
//! - Trace context helpers for per-call correlation headers

pub mod client;
pub mod profile;
pub mod trace;

pub use client::{ProviderConnection, RiotClient};
pub use profile::{Endpoint, ProviderProfile};
