//! View-model assembly for the day board.
//!
//! The webview never computes geometry: every paint is a pure function of
//! core state, serialized as `BoardView`. Blocks arrive absolutely
//! positioned (top/height in px), the ruler arrives pre-labeled, and the
//! modals get ready-made prefill payloads.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::directory::{LoadState, Resource};
use crate::schedule::geometry::{GridGeometry, HEADER_HEIGHT};
use crate::schedule::status::AppointmentStatus;
use crate::schedule::store::DayStore;
use crate::schedule::types::Appointment;

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Shortest duration a block is drawn at, so slivers stay clickable (min).
const MIN_RENDER_MINUTES: i64 = 15;

/// Absolute floor on rendered block height (px).
const MIN_BLOCK_PX: f32 = 16.0;

/// Header dot color when a resource has none assigned.
const FALLBACK_DOT: &str = "#789";

// ═══════════════════════════════════════════════════════════
// View models
// ═══════════════════════════════════════════════════════════

/// Everything the webview needs to paint the day board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub date: NaiveDate,
    /// Long-form toolbar label, e.g. "Monday, Mar 9".
    pub date_label: String,
    pub is_today: bool,
    pub grid: GridSpec,
    pub ruler: Vec<RulerRow>,
    pub columns: Vec<ResourceColumn>,
    pub resources_load: LoadState,
    pub appointments_load: LoadState,
}

/// Grid metrics the webview lays containers out with.
#[derive(Debug, Clone, Serialize)]
pub struct GridSpec {
    pub slot_height: f32,
    pub header_height: f32,
    /// Full column height: `slot_count * slot_height`.
    pub grid_height: f32,
    pub slot_count: i64,
    pub slot_minutes: i64,
}

/// One slot row in the time ruler. Only :00 and :30 rows carry a label.
#[derive(Debug, Clone, Serialize)]
pub struct RulerRow {
    pub minutes_from_open: i64,
    pub label: Option<String>,
}

/// One resource column with its positioned blocks.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceColumn {
    pub resource_id: String,
    pub name: String,
    pub dot_color: String,
    pub blocks: Vec<BlockView>,
}

/// One absolutely positioned appointment block.
#[derive(Debug, Clone, Serialize)]
pub struct BlockView {
    pub id: String,
    pub title: String,
    /// "08:00 AM - 08:30 AM"
    pub time_label: String,
    /// "Client: Ana Petrova", omitted when the booking has no client.
    pub client_line: Option<String>,
    pub status: AppointmentStatus,
    pub status_label: &'static str,
    pub top_px: f32,
    pub height_px: f32,
    /// A change to this record is still being persisted; render translucent.
    pub in_flight: bool,
}

/// Prefill for the creation modal after a double-click.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointmentDraft {
    pub resource_id: String,
    pub resource_name: String,
    pub date: NaiveDate,
    pub date_label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// "10:00 AM - 10:30 AM"
    pub slot_label: String,
}

/// A status the detail view may offer as a one-click change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOption {
    pub value: AppointmentStatus,
    pub label: &'static str,
}

/// Contents of the appointment detail modal.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetailView {
    pub id: String,
    pub title: String,
    /// "N/A" when the booking has no client, matching the modal copy.
    pub client_name: String,
    pub time_label: String,
    /// Resolved resource name; falls back to the raw id.
    pub resource_name: String,
    pub status: AppointmentStatus,
    pub status_label: &'static str,
    pub change_targets: Vec<StatusOption>,
    pub can_cancel: bool,
    pub remarks: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Labels
// ═══════════════════════════════════════════════════════════

/// 12-hour clock label with 2-digit hour and minute: "08:30 AM".
fn clock_label(hour: u32, minute: u32) -> String {
    let (h12, half) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{h12:02}:{minute:02} {half}")
}

fn time_label(t: NaiveDateTime) -> String {
    clock_label(t.hour(), t.minute())
}

/// "08:00 AM - 08:30 AM", the label blocks and drafts carry.
pub fn span_label(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!("{} - {}", time_label(start), time_label(end))
}

/// "Monday, Mar 9"
pub fn date_label(date: NaiveDate) -> String {
    format!("{}, {} {}", date.format("%A"), date.format("%b"), date.day())
}

// ═══════════════════════════════════════════════════════════
// Assembly
// ═══════════════════════════════════════════════════════════

/// Build the full board view from current state.
pub fn assemble_board(
    geom: &GridGeometry,
    today: NaiveDate,
    resources: &[Resource],
    resources_load: LoadState,
    store: &DayStore,
    appointments_load: LoadState,
) -> BoardView {
    let date = store.date();
    BoardView {
        date,
        date_label: date_label(date),
        is_today: date == today,
        grid: GridSpec {
            slot_height: geom.slot_height,
            header_height: HEADER_HEIGHT,
            grid_height: geom.slot_count() as f32 * geom.slot_height,
            slot_count: geom.slot_count(),
            slot_minutes: geom.slot_minutes,
        },
        ruler: assemble_ruler(geom),
        columns: resources
            .iter()
            .map(|r| assemble_column(geom, r, store))
            .collect(),
        resources_load,
        appointments_load,
    }
}

fn assemble_ruler(geom: &GridGeometry) -> Vec<RulerRow> {
    (0..geom.slot_count())
        .map(|i| {
            let minutes_from_open = i * geom.slot_minutes;
            let (hour, minute) = geom.clock_at(minutes_from_open);
            RulerRow {
                minutes_from_open,
                label: (minute == 0 || minute == 30).then(|| clock_label(hour, minute)),
            }
        })
        .collect()
}

fn assemble_column(geom: &GridGeometry, resource: &Resource, store: &DayStore) -> ResourceColumn {
    ResourceColumn {
        resource_id: resource.id.clone(),
        name: resource.name.clone(),
        dot_color: resource
            .color
            .clone()
            .unwrap_or_else(|| FALLBACK_DOT.to_string()),
        blocks: store
            .appointments()
            .iter()
            .filter(|a| a.resource_id == resource.id)
            .map(|a| assemble_block(geom, a, store.has_unresolved_edit(&a.id)))
            .collect(),
    }
}

fn assemble_block(geom: &GridGeometry, appt: &Appointment, in_flight: bool) -> BlockView {
    let top_minutes = geom
        .minutes_from_open(appt.start)
        .clamp(0, geom.total_minutes());
    let shown_minutes = appt.duration_minutes().max(MIN_RENDER_MINUTES);
    BlockView {
        id: appt.id.clone(),
        title: appt.title.clone(),
        time_label: span_label(appt.start, appt.end),
        client_line: appt.client_name.as_ref().map(|c| format!("Client: {c}")),
        status: appt.status,
        status_label: appt.status.label(),
        top_px: geom.pixel_at_minutes(top_minutes),
        height_px: (shown_minutes as f32 / geom.slot_minutes as f32 * geom.slot_height)
            .max(MIN_BLOCK_PX),
        in_flight,
    }
}

/// Prefill for the creation modal.
pub fn new_appointment_draft(
    resource: &Resource,
    date: NaiveDate,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> NewAppointmentDraft {
    NewAppointmentDraft {
        resource_id: resource.id.clone(),
        resource_name: resource.name.clone(),
        date,
        date_label: date_label(date),
        start,
        end,
        slot_label: span_label(start, end),
    }
}

/// Contents of the detail modal for one appointment.
pub fn appointment_detail(appt: &Appointment, resources: &[Resource]) -> AppointmentDetailView {
    let resource_name = resources
        .iter()
        .find(|r| r.id == appt.resource_id)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| appt.resource_id.clone());
    AppointmentDetailView {
        id: appt.id.clone(),
        title: appt.title.clone(),
        client_name: appt
            .client_name
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
        time_label: span_label(appt.start, appt.end),
        resource_name,
        status: appt.status,
        status_label: appt.status.label(),
        change_targets: appt
            .status
            .change_targets()
            .into_iter()
            .map(|value| StatusOption {
                value,
                label: value.label(),
            })
            .collect(),
        can_cancel: appt.status.can_become(AppointmentStatus::Cancelled),
        remarks: appt.remarks.clone(),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
