//! Correlation headers sent with every provider call.

use uuid::Uuid;

use qrlogin_core::SessionId;

/// W3C `traceparent` with a fresh trace and parent id.
///
/// Format: `00-<32 hex trace id>-<16 hex parent id>-00`.
#[must_use]
pub fn traceparent() -> String {
    let trace_id = Uuid::new_v4().simple().to_string();
    let parent_id = Uuid::new_v4().simple().to_string();
    format!("00-{trace_id}-{}-00", &parent_id[..16])
}

/// `baggage` value carrying the session correlation id.
#[must_use]
pub fn baggage(session_id: SessionId) -> String {
    format!("sdksid={session_id}")
}
