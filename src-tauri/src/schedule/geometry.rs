//! Pixel ↔ time-of-day mapping for the booking grid.
//!
//! The grid is a column of fixed-height slot rows between the clinic's
//! opening and closing hours. All conversions run through minutes-from-open:
//! pointer pixels floor-snap to the slot they fall inside, resize deltas
//! round-snap to the nearest slot multiple, and every slot start is clamped
//! so a full slot still fits before close. Pure math, no UI types.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// First bookable hour of the day (inclusive).
pub const DEFAULT_START_HOUR: u32 = 8;

/// Hour the booking window closes (exclusive).
pub const DEFAULT_END_HOUR: u32 = 21;

/// Booking granularity in minutes.
pub const DEFAULT_SLOT_MINUTES: i64 = 30;

/// Rendered height of one slot row (px).
pub const DEFAULT_SLOT_HEIGHT: f32 = 45.0;

/// Rendered height of the sticky resource header (px).
pub const HEADER_HEIGHT: f32 = 40.0;

// ═══════════════════════════════════════════════════════════
// Snapping
// ═══════════════════════════════════════════════════════════

/// Floor `minutes` to a multiple of `step`: a raw pointer position becomes
/// the start of the slot it falls inside.
pub fn snap_floor(minutes: f64, step: i64) -> i64 {
    let step = step.max(1); // avoid division by zero
    (minutes / step as f64).floor() as i64 * step
}

/// Round `minutes` to the nearest multiple of `step`, halves toward positive
/// infinity. A resize delta becomes a whole number of slots.
pub fn snap_round(minutes: f64, step: i64) -> i64 {
    let step = step.max(1); // avoid division by zero
    (minutes / step as f64 + 0.5).floor() as i64 * step
}

// ═══════════════════════════════════════════════════════════
// Grid geometry
// ═══════════════════════════════════════════════════════════

/// Booking-grid shape: day bounds, slot granularity, row height.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GridGeometry {
    pub start_hour: u32,
    pub end_hour: u32,
    pub slot_minutes: i64,
    pub slot_height: f32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::custom(
            DEFAULT_START_HOUR,
            DEFAULT_END_HOUR,
            DEFAULT_SLOT_MINUTES,
            DEFAULT_SLOT_HEIGHT,
        )
    }
}

impl GridGeometry {
    /// Build a grid with explicit bounds, normalizing degenerate input so the
    /// window spans at least one slot.
    pub fn custom(start_hour: u32, end_hour: u32, slot_minutes: i64, slot_height: f32) -> Self {
        let start_hour = start_hour.min(23);
        let end_hour = end_hour.clamp(start_hour + 1, 24);
        let window = (end_hour - start_hour) as i64 * 60;
        Self {
            start_hour,
            end_hour,
            slot_minutes: slot_minutes.clamp(5, window),
            slot_height: slot_height.max(8.0),
        }
    }

    /// Length of the booking window in minutes.
    pub fn total_minutes(&self) -> i64 {
        (self.end_hour - self.start_hour) as i64 * 60
    }

    /// Number of slot rows in the grid.
    pub fn slot_count(&self) -> i64 {
        self.total_minutes() / self.slot_minutes
    }

    /// Latest minute-from-open at which a full slot still fits.
    pub fn max_slot_start(&self) -> i64 {
        self.total_minutes() - self.slot_minutes
    }

    /// Raw (un-snapped) minutes-from-open under a pixel offset from the grid
    /// top.
    pub fn pixel_to_minutes(&self, y: f32) -> f64 {
        (y as f64 / self.slot_height as f64) * self.slot_minutes as f64
    }

    /// Pixel offset of a minutes-from-open value from the grid top.
    pub fn pixel_at_minutes(&self, minutes_from_open: i64) -> f32 {
        (minutes_from_open as f32 / self.slot_minutes as f32) * self.slot_height
    }

    /// Clamp a slot start into `[0, max_slot_start]`.
    pub fn clamp_slot_start(&self, minutes_from_open: i64) -> i64 {
        minutes_from_open.clamp(0, self.max_slot_start())
    }

    /// The slot start under a pointer: floor-snapped, then clamped so the
    /// slot fits inside the window. A pointer above the grid yields the first
    /// slot; below the last row, the final one.
    pub fn slot_at_pixel(&self, y: f32) -> i64 {
        self.clamp_slot_start(snap_floor(self.pixel_to_minutes(y), self.slot_minutes))
    }

    /// Wall-clock instant on `date` for a minutes-from-open value.
    pub fn datetime_at(&self, date: NaiveDate, minutes_from_open: i64) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN)
            + Duration::minutes(self.start_hour as i64 * 60 + minutes_from_open)
    }

    /// Minutes-from-open of a wall-clock instant (negative before open).
    pub fn minutes_from_open(&self, t: NaiveDateTime) -> i64 {
        (t.hour() as i64 - self.start_hour as i64) * 60 + t.minute() as i64
    }

    /// `(hour, minute)` wall-clock of a minutes-from-open value.
    pub fn clock_at(&self, minutes_from_open: i64) -> (u32, u32) {
        let total = self.start_hour as i64 * 60 + minutes_from_open;
        (total.div_euclid(60) as u32, total.rem_euclid(60) as u32)
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
