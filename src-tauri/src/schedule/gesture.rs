//! Pointer gestures: move, edge-resize, double-click create.
//!
//! Each gesture is split into a begin step that captures what the pointer
//! grabbed (a ticket the webview echoes back) and pure span math that turns
//! later pointer positions into a proposed `[start, end)`. Resize deltas are
//! always applied to the geometry captured at begin time, so suppressed
//! intermediate steps never skew the gesture. Conflict gating and store
//! mutation happen in the command layer; nothing here touches state.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::geometry::{snap_floor, snap_round, GridGeometry};
use crate::schedule::types::Appointment;

// ═══════════════════════════════════════════════════════════
// Gesture tickets
// ═══════════════════════════════════════════════════════════

/// Which edge of the block a resize drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeEdge {
    Top,
    Bottom,
}

/// An in-flight move: what was grabbed and where inside the block.
#[derive(Debug, Clone, Serialize)]
pub struct DragGesture {
    pub ticket: Uuid,
    pub appointment_id: String,
    pub duration_minutes: i64,
    /// Pointer offset from the block's top edge at grab time (px).
    pub grab_offset_px: f32,
}

impl DragGesture {
    pub fn begin(appt: &Appointment, grab_offset_px: f32) -> Self {
        Self {
            ticket: Uuid::new_v4(),
            appointment_id: appt.id.clone(),
            duration_minutes: appt.duration_minutes(),
            grab_offset_px,
        }
    }
}

/// An in-flight resize: the edge being dragged and the geometry it started
/// from. Every preview recomputes from these initial values, so the store
/// can track accepted steps without skewing later ones.
#[derive(Debug, Clone, Serialize)]
pub struct ResizeGesture {
    pub ticket: Uuid,
    pub appointment_id: String,
    pub edge: ResizeEdge,
    pub initial_start: NaiveDateTime,
    pub initial_end: NaiveDateTime,
}

impl ResizeGesture {
    pub fn begin(appt: &Appointment, edge: ResizeEdge) -> Self {
        Self {
            ticket: Uuid::new_v4(),
            appointment_id: appt.id.clone(),
            edge,
            initial_start: appt.start,
            initial_end: appt.end,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Span math
// ═══════════════════════════════════════════════════════════

/// Where a dragged block lands: the block's top edge (pointer minus grab
/// offset) floor-snaps to a slot start, duration is preserved, and an end
/// past close shifts the whole block up rather than truncating it.
pub fn dropped_span(
    geom: &GridGeometry,
    date: NaiveDate,
    duration_minutes: i64,
    pointer_y: f32,
    grab_offset_px: f32,
) -> (NaiveDateTime, NaiveDateTime) {
    let top_px = pointer_y - grab_offset_px;
    let start = geom.slot_at_pixel(top_px);
    let end = (start + duration_minutes).min(geom.total_minutes());
    let start = end - duration_minutes;
    (geom.datetime_at(date, start), geom.datetime_at(date, end))
}

/// Where a resized block's edges land. The pixel delta round-snaps to whole
/// slots and moves only the grabbed edge; the block never shrinks below one
/// slot and never leaves the window.
pub fn resized_span(
    geom: &GridGeometry,
    gesture: &ResizeGesture,
    delta_px: f32,
) -> (NaiveDateTime, NaiveDateTime) {
    let date = gesture.initial_start.date();
    let delta = snap_round(geom.pixel_to_minutes(delta_px), geom.slot_minutes);
    let init_start = geom.minutes_from_open(gesture.initial_start);
    let init_end = geom.minutes_from_open(gesture.initial_end);

    match gesture.edge {
        ResizeEdge::Top => {
            let mut start = init_start + delta;
            if start >= init_end {
                start = init_end - geom.slot_minutes;
            }
            if start < 0 {
                start = 0;
            }
            let start = snap_floor(start as f64, geom.slot_minutes);
            (geom.datetime_at(date, start), gesture.initial_end)
        }
        ResizeEdge::Bottom => {
            let mut end = init_end + delta;
            if end <= init_start {
                end = init_start + geom.slot_minutes;
            }
            if end > geom.total_minutes() {
                end = geom.total_minutes();
            }
            let mut end = snap_floor(end as f64, geom.slot_minutes);
            if end <= init_start {
                end = init_start + geom.slot_minutes;
            }
            (gesture.initial_start, geom.datetime_at(date, end))
        }
    }
}

/// The one-slot draft a double-click proposes: floor-snapped to the slot
/// under the pointer, clamped into the window.
pub fn creation_span(
    geom: &GridGeometry,
    date: NaiveDate,
    pointer_y: f32,
) -> (NaiveDateTime, NaiveDateTime) {
    let start = geom.slot_at_pixel(pointer_y);
    (
        geom.datetime_at(date, start),
        geom.datetime_at(date, start + geom.slot_minutes),
    )
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
