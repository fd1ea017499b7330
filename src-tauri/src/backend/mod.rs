//! HTTP client for the clinic backend, the system of record.
//!
//! One typed method per endpoint; every response body is normalized into
//! domain types at this boundary with explicit required/optional fields.
//! Nothing else in the crate touches the wire format.

mod client;
mod types;

pub use client::BackendClient;
pub use types::{wire_date, wire_datetime};

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

/// Failures talking to or decoding the clinic backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Cannot reach the clinic backend at {0}")]
    Connection(String),
    #[error("Backend request timed out after {0}s")]
    Timeout(u64),
    #[error("Backend returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Malformed backend response: {0}")]
    Decode(String),
    #[error("Backend response missing {field} on {object}")]
    MissingField {
        object: &'static str,
        field: &'static str,
    },
    #[error("Unreadable timestamp in backend response: {0}")]
    BadTimestamp(String),
}
