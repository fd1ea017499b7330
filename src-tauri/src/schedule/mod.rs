//! Day-view scheduling core: time-grid geometry, conflict detection, the
//! optimistic appointment store, and the drag/resize/create gesture pipeline.
//!
//! Everything here is UI-free. The webview forwards pointer coordinates and
//! form payloads through the command layer; this module turns them into
//! validated store mutations and view models. The backend remains the system
//! of record; local edits are optimistic shadows reconciled per call.

pub mod conflict;
pub mod gesture;
pub mod geometry;
pub mod layout;
pub mod status;
pub mod store;
pub mod types;

pub use status::AppointmentStatus;
pub use types::Appointment;

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

/// Rejections produced by the scheduling core before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Appointment not found: {0}")]
    NotFound(String),
    #[error("Time slot overlaps another appointment: {title}")]
    Overlap { title: String },
    #[error("Cannot create appointments for past dates")]
    PastDate,
    #[error("Previous change to this appointment is still being saved")]
    EditInFlight,
    #[error("No matching gesture is active")]
    StaleGesture,
    #[error("Status cannot change from {from} to {to}")]
    IllegalTransition { from: &'static str, to: &'static str },
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
    #[error("A cancellation reason is required")]
    RemarkRequired,
    #[error("{0} is required")]
    MissingField(&'static str),
}
