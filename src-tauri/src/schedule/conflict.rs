//! Double-booking detection for the day board.
//!
//! Two bookings conflict when they occupy the same resource and their
//! half-open `[start, end)` intervals intersect: back-to-back appointments
//! sharing a boundary instant do not conflict. The check runs against the
//! full visible day before any gesture or creation is accepted, and again on
//! every intermediate resize step. Status transitions are never gated here.

use chrono::NaiveDateTime;

use crate::schedule::types::Appointment;

/// A proposed occupancy to test against the existing day.
#[derive(Debug, Clone, Copy)]
pub struct SlotClaim<'a> {
    /// Id of the appointment being edited; `None` for not-yet-created
    /// records, so a new booking is compared against everything.
    pub id: Option<&'a str>,
    pub resource_id: &'a str,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl<'a> SlotClaim<'a> {
    pub fn for_existing(appt: &'a Appointment) -> Self {
        Self {
            id: Some(&appt.id),
            resource_id: &appt.resource_id,
            start: appt.start,
            end: appt.end,
        }
    }
}

/// First appointment the claim would double-book, if any. Self-comparison is
/// excluded by id; other resources' bookings are ignored.
pub fn first_overlap<'a>(
    claim: SlotClaim<'_>,
    existing: &'a [Appointment],
) -> Option<&'a Appointment> {
    existing.iter().find(|other| {
        claim.id != Some(other.id.as_str())
            && other.resource_id == claim.resource_id
            && claim.start < other.end
            && claim.end > other.start
    })
}

/// Whether the claim would double-book any existing appointment.
pub fn overlaps_any(claim: SlotClaim<'_>, existing: &[Appointment]) -> bool {
    first_overlap(claim, existing).is_some()
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
