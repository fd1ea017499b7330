//! Board commands: day navigation, slot creation, drag and resize commits,
//! status changes, cancellation.
//!
//! Commands that persist something run in three steps: a synchronous stage
//! under the write lock (validate, snapshot, apply optimistically), the
//! backend call with no lock held, and a synchronous settle (confirm the
//! echo or revert). Local rejections never reach the network and leave the
//! store untouched. Every board command hands back the refreshed
//! `BoardView` so the webview repaints from authoritative state.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tauri::State;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::BackendError;
use crate::core_state::{clinic_today, CoreState};
use crate::schedule::conflict::{first_overlap, overlaps_any, SlotClaim};
use crate::schedule::gesture::{self, DragGesture, ResizeEdge, ResizeGesture};
use crate::schedule::layout::{self, AppointmentDetailView, BoardView, NewAppointmentDraft};
use crate::schedule::types::NewAppointmentForm;
use crate::schedule::{Appointment, AppointmentStatus, ScheduleError};
use crate::session::{SessionContext, ACTION_CREATE_APPOINTMENT, MODULE_APPOINTMENTS};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Block geometry after one resize step. Accepted steps land in the store
/// right away; a step that would double-book is suppressed and the block
/// holds its last accepted span. Nothing reaches the network until the
/// gesture finishes.
#[derive(Debug, Clone, Serialize)]
pub struct ResizePreview {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub top_px: f32,
    pub height_px: f32,
    pub time_label: String,
}

/// A validated geometry edit, optimistically applied and ready to send.
pub(crate) struct StagedCommit {
    session: SessionContext,
    id: String,
    resource_id: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    /// The gesture landed exactly where the record already is; confirm
    /// locally without a round trip.
    skip_network: bool,
}

// ═══════════════════════════════════════════════════════════
// Read path
// ═══════════════════════════════════════════════════════════

// Lock order everywhere: directory before board.
pub(crate) fn snapshot_board(state: &CoreState) -> Result<BoardView, String> {
    let dir = state.read_directory().map_err(|e| e.to_string())?;
    let board = state.read_board().map_err(|e| e.to_string())?;
    Ok(layout::assemble_board(
        &board.geometry,
        clinic_today(),
        &dir.resources,
        dir.loads().resources,
        &board.store,
        board.load,
    ))
}

/// Current board without touching the network.
#[tauri::command]
pub fn board_view(state: State<'_, Arc<CoreState>>) -> Result<BoardView, String> {
    snapshot_board(state.inner())
}

/// Everything the appointment detail modal shows.
#[tauri::command]
pub fn appointment_detail(
    appointment_id: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<AppointmentDetailView, String> {
    stage_detail(state.inner(), &appointment_id)
}

pub(crate) fn stage_detail(
    state: &CoreState,
    appointment_id: &str,
) -> Result<AppointmentDetailView, String> {
    let dir = state.read_directory().map_err(|e| e.to_string())?;
    let board = state.read_board().map_err(|e| e.to_string())?;
    let appt = board
        .store
        .get(appointment_id)
        .ok_or_else(|| ScheduleError::NotFound(appointment_id.to_string()).to_string())?;
    Ok(layout::appointment_detail(appt, &dir.resources))
}

// ═══════════════════════════════════════════════════════════
// Day navigation
// ═══════════════════════════════════════════════════════════

async fn refresh_day(state: &CoreState, date: NaiveDate) -> Result<BoardView, String> {
    let session = state.session_context().map_err(|e| e.to_string())?;
    // The board flips to `date` before the request leaves, so navigation
    // chains from the pending day and stale replies die by epoch.
    let epoch = state
        .write_board()
        .map_err(|e| e.to_string())?
        .begin_fetch(date);

    let fetched = state.backend().fetch_day(&session, date).await;

    {
        let mut board = state.write_board().map_err(|e| e.to_string())?;
        match fetched {
            Ok(appointments) => {
                if !board.install_day(epoch, appointments) {
                    debug!(%date, "Discarding stale day fetch");
                }
            }
            Err(e) => {
                if board.fail_fetch(epoch) {
                    warn!(error = %e, %date, "Day fetch failed");
                    return Err(e.to_string());
                }
                debug!(%date, "Discarding stale day fetch failure");
            }
        }
    }
    snapshot_board(state)
}

/// Load a specific clinic day (all resources).
#[tauri::command]
pub async fn load_day(date: String, state: State<'_, Arc<CoreState>>) -> Result<BoardView, String> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| "Invalid date format. Use YYYY-MM-DD")?;
    refresh_day(state.inner(), date).await
}

/// Toolbar arrows: move the displayed day by `delta` days.
#[tauri::command]
pub async fn shift_day(delta: i64, state: State<'_, Arc<CoreState>>) -> Result<BoardView, String> {
    let current = state.read_board().map_err(|e| e.to_string())?.store.date();
    refresh_day(state.inner(), current + Duration::days(delta)).await
}

/// Toolbar "Today" button.
#[tauri::command]
pub async fn go_today(state: State<'_, Arc<CoreState>>) -> Result<BoardView, String> {
    refresh_day(state.inner(), clinic_today()).await
}

// ═══════════════════════════════════════════════════════════
// Creation
// ═══════════════════════════════════════════════════════════

pub(crate) fn stage_slot_selection(
    state: &CoreState,
    resource_id: &str,
    pointer_y: f32,
    today: NaiveDate,
) -> Result<NewAppointmentDraft, String> {
    let session = state.session_context().map_err(|e| e.to_string())?;
    if !session.allows(MODULE_APPOINTMENTS, ACTION_CREATE_APPOINTMENT) {
        return Err("You do not have permission to create appointments".into());
    }
    let dir = state.read_directory().map_err(|e| e.to_string())?;
    let board = state.read_board().map_err(|e| e.to_string())?;
    let date = board.store.date();
    if date < today {
        return Err(ScheduleError::PastDate.to_string());
    }
    let resource = dir
        .resources
        .iter()
        .find(|r| r.id == resource_id)
        .ok_or_else(|| format!("Unknown resource: {resource_id}"))?;
    let (start, end) = gesture::creation_span(&board.geometry, date, pointer_y);
    Ok(layout::new_appointment_draft(resource, date, start, end))
}

/// Double-click on empty grid: propose a one-slot booking there.
#[tauri::command]
pub fn begin_slot_selection(
    resource_id: String,
    pointer_y: f32,
    state: State<'_, Arc<CoreState>>,
) -> Result<NewAppointmentDraft, String> {
    stage_slot_selection(state.inner(), &resource_id, pointer_y, clinic_today())
}

pub(crate) fn stage_create(
    state: &CoreState,
    form: &NewAppointmentForm,
    today: NaiveDate,
) -> Result<SessionContext, String> {
    let session = state.session_context().map_err(|e| e.to_string())?;
    if !session.allows(MODULE_APPOINTMENTS, ACTION_CREATE_APPOINTMENT) {
        return Err("You do not have permission to create appointments".into());
    }
    if form.resource_id.trim().is_empty() {
        return Err(ScheduleError::MissingField("resource_id").to_string());
    }
    if form.title.trim().is_empty() {
        return Err(ScheduleError::MissingField("title").to_string());
    }
    if form.start >= form.end {
        return Err("Appointment end must be after its start".into());
    }
    if form.start.date() < today {
        return Err(ScheduleError::PastDate.to_string());
    }
    let board = state.read_board().map_err(|e| e.to_string())?;
    let claim = SlotClaim {
        id: None,
        resource_id: &form.resource_id,
        start: form.start,
        end: form.end,
    };
    if let Some(other) = first_overlap(claim, board.store.appointments()) {
        return Err(ScheduleError::Overlap {
            title: other.title.clone(),
        }
        .to_string());
    }
    Ok(session)
}

pub(crate) fn settle_create(
    state: &CoreState,
    outcome: Result<Appointment, BackendError>,
) -> Result<BoardView, String> {
    match outcome {
        Ok(echo) => {
            let mut board = state.write_board().map_err(|e| e.to_string())?;
            if echo.start.date() == board.store.date() {
                board.store.insert(echo);
            } else {
                debug!("Booked record falls outside the displayed day");
            }
            drop(board);
            snapshot_board(state)
        }
        Err(e) => {
            warn!(error = %e, "Booking failed");
            Err(e.to_string())
        }
    }
}

/// Book the appointment described by the creation form.
#[tauri::command]
pub async fn create_appointment(
    form: NewAppointmentForm,
    state: State<'_, Arc<CoreState>>,
) -> Result<BoardView, String> {
    let session = stage_create(state.inner(), &form, clinic_today())?;
    let outcome = state.backend().book_appointment(&session, &form).await;
    settle_create(state.inner(), outcome)
}

// ═══════════════════════════════════════════════════════════
// Drag (move)
// ═══════════════════════════════════════════════════════════

pub(crate) fn stage_drag(
    state: &CoreState,
    appointment_id: &str,
    grab_offset_px: f32,
) -> Result<DragGesture, String> {
    let mut board = state.write_board().map_err(|e| e.to_string())?;
    if board.store.has_unresolved_edit(appointment_id) {
        return Err(ScheduleError::EditInFlight.to_string());
    }
    let appt = board
        .store
        .get(appointment_id)
        .ok_or_else(|| ScheduleError::NotFound(appointment_id.to_string()).to_string())?;
    let drag = DragGesture::begin(appt, grab_offset_px);
    board.drag = Some(drag.clone());
    Ok(drag)
}

/// Pick a block up. Returns the gesture ticket the drop must present.
#[tauri::command]
pub fn begin_drag(
    appointment_id: String,
    grab_offset_px: f32,
    state: State<'_, Arc<CoreState>>,
) -> Result<DragGesture, String> {
    stage_drag(state.inner(), &appointment_id, grab_offset_px)
}

pub(crate) fn stage_drop(
    state: &CoreState,
    ticket: &str,
    resource_id: &str,
    pointer_y: f32,
) -> Result<StagedCommit, String> {
    let session = state.session_context().map_err(|e| e.to_string())?;
    let ticket =
        Uuid::parse_str(ticket).map_err(|_| ScheduleError::StaleGesture.to_string())?;
    let mut board = state.write_board().map_err(|e| e.to_string())?;
    let drag = match board.drag.take() {
        Some(g) if g.ticket == ticket => g,
        other => {
            board.drag = other;
            return Err(ScheduleError::StaleGesture.to_string());
        }
    };
    let date = board.store.date();
    let (start, end) = gesture::dropped_span(
        &board.geometry,
        date,
        drag.duration_minutes,
        pointer_y,
        drag.grab_offset_px,
    );
    let current = board
        .store
        .get(&drag.appointment_id)
        .ok_or_else(|| ScheduleError::NotFound(drag.appointment_id.clone()).to_string())?;
    if current.resource_id == resource_id && current.start == start && current.end == end {
        return Ok(StagedCommit {
            session,
            id: drag.appointment_id,
            resource_id: resource_id.to_string(),
            start,
            end,
            skip_network: true,
        });
    }
    let claim = SlotClaim {
        id: Some(&drag.appointment_id),
        resource_id,
        start,
        end,
    };
    if let Some(other) = first_overlap(claim, board.store.appointments()) {
        return Err(ScheduleError::Overlap {
            title: other.title.clone(),
        }
        .to_string());
    }
    board
        .store
        .begin_edit(&drag.appointment_id)
        .map_err(|e| e.to_string())?;
    board
        .store
        .apply_geometry(&drag.appointment_id, resource_id, start, end)
        .map_err(|e| e.to_string())?;
    Ok(StagedCommit {
        session,
        id: drag.appointment_id,
        resource_id: resource_id.to_string(),
        start,
        end,
        skip_network: false,
    })
}

/// Drop the dragged block on a column at a vertical offset.
#[tauri::command]
pub async fn drop_appointment(
    ticket: String,
    resource_id: String,
    pointer_y: f32,
    state: State<'_, Arc<CoreState>>,
) -> Result<BoardView, String> {
    let staged = stage_drop(state.inner(), &ticket, &resource_id, pointer_y)?;
    if staged.skip_network {
        return snapshot_board(state.inner());
    }
    let outcome = state
        .backend()
        .reschedule_appointment(
            &staged.session,
            &staged.id,
            &staged.resource_id,
            staged.start,
            staged.end,
        )
        .await;
    settle_edit(state.inner(), "move", &staged.id, outcome)
}

// ═══════════════════════════════════════════════════════════
// Resize
// ═══════════════════════════════════════════════════════════

pub(crate) fn stage_resize(
    state: &CoreState,
    appointment_id: &str,
    edge: ResizeEdge,
) -> Result<ResizeGesture, String> {
    let mut board = state.write_board().map_err(|e| e.to_string())?;
    if board.store.has_unresolved_edit(appointment_id) {
        return Err(ScheduleError::EditInFlight.to_string());
    }
    let appt = board
        .store
        .get(appointment_id)
        .ok_or_else(|| ScheduleError::NotFound(appointment_id.to_string()).to_string())?;
    let resize = ResizeGesture::begin(appt, edge);
    board.resize = Some(resize.clone());
    Ok(resize)
}

/// Grab a block's top or bottom handle.
#[tauri::command]
pub fn begin_resize(
    appointment_id: String,
    edge: ResizeEdge,
    state: State<'_, Arc<CoreState>>,
) -> Result<ResizeGesture, String> {
    stage_resize(state.inner(), &appointment_id, edge)
}

pub(crate) fn stage_resize_preview(
    state: &CoreState,
    ticket: &str,
    delta_px: f32,
) -> Result<ResizePreview, String> {
    let ticket =
        Uuid::parse_str(ticket).map_err(|_| ScheduleError::StaleGesture.to_string())?;
    let mut board = state.write_board().map_err(|e| e.to_string())?;
    let resize = board
        .resize
        .as_ref()
        .filter(|g| g.ticket == ticket)
        .cloned()
        .ok_or_else(|| ScheduleError::StaleGesture.to_string())?;
    let (start, end) = gesture::resized_span(&board.geometry, &resize, delta_px);
    let resource_id = board
        .store
        .get(&resize.appointment_id)
        .map(|a| a.resource_id.clone())
        .ok_or_else(|| ScheduleError::NotFound(resize.appointment_id.clone()).to_string())?;
    let claim = SlotClaim {
        id: Some(&resize.appointment_id),
        resource_id: &resource_id,
        start,
        end,
    };
    if !overlaps_any(claim, board.store.appointments()) {
        board
            .store
            .apply_geometry(&resize.appointment_id, &resource_id, start, end)
            .map_err(|e| e.to_string())?;
    }
    // The block sits wherever the store last accepted.
    let shown = board
        .store
        .get(&resize.appointment_id)
        .ok_or_else(|| ScheduleError::NotFound(resize.appointment_id.clone()).to_string())?;
    let top_px = board
        .geometry
        .pixel_at_minutes(board.geometry.minutes_from_open(shown.start));
    let height_px = board
        .geometry
        .pixel_at_minutes(board.geometry.minutes_from_open(shown.end))
        - top_px;
    Ok(ResizePreview {
        start: shown.start,
        end: shown.end,
        top_px,
        height_px,
        time_label: layout::span_label(shown.start, shown.end),
    })
}

/// One step of a held resize. Colliding positions are suppressed; the
/// block stays at its last accepted span.
#[tauri::command]
pub fn resize_preview(
    ticket: String,
    delta_px: f32,
    state: State<'_, Arc<CoreState>>,
) -> Result<ResizePreview, String> {
    stage_resize_preview(state.inner(), &ticket, delta_px)
}

pub(crate) fn stage_finish_resize(
    state: &CoreState,
    ticket: &str,
    delta_px: f32,
) -> Result<StagedCommit, String> {
    let session = state.session_context().map_err(|e| e.to_string())?;
    let ticket =
        Uuid::parse_str(ticket).map_err(|_| ScheduleError::StaleGesture.to_string())?;
    let mut board = state.write_board().map_err(|e| e.to_string())?;
    let resize = match board.resize.take() {
        Some(g) if g.ticket == ticket => g,
        other => {
            board.resize = other;
            return Err(ScheduleError::StaleGesture.to_string());
        }
    };
    let current = board
        .store
        .get(&resize.appointment_id)
        .ok_or_else(|| ScheduleError::NotFound(resize.appointment_id.clone()).to_string())?;
    let resource_id = current.resource_id.clone();
    let held = (current.start, current.end);

    // The release position wins if it is conflict-free; otherwise the
    // gesture settles at the last span a preview accepted.
    let released = gesture::resized_span(&board.geometry, &resize, delta_px);
    let claim = SlotClaim {
        id: Some(&resize.appointment_id),
        resource_id: &resource_id,
        start: released.0,
        end: released.1,
    };
    let (start, end) = if overlaps_any(claim, board.store.appointments()) {
        held
    } else {
        released
    };

    if (start, end) == (resize.initial_start, resize.initial_end) {
        // Back where it started: undo any accepted previews locally.
        board
            .store
            .apply_geometry(&resize.appointment_id, &resource_id, start, end)
            .map_err(|e| e.to_string())?;
        return Ok(StagedCommit {
            session,
            id: resize.appointment_id,
            resource_id,
            start,
            end,
            skip_network: true,
        });
    }

    // Snapshot the pre-gesture span, not a previewed one, so a failed
    // reschedule restores what the server last confirmed.
    board
        .store
        .apply_geometry(
            &resize.appointment_id,
            &resource_id,
            resize.initial_start,
            resize.initial_end,
        )
        .map_err(|e| e.to_string())?;
    board
        .store
        .begin_edit(&resize.appointment_id)
        .map_err(|e| e.to_string())?;
    board
        .store
        .apply_geometry(&resize.appointment_id, &resource_id, start, end)
        .map_err(|e| e.to_string())?;
    Ok(StagedCommit {
        session,
        id: resize.appointment_id,
        resource_id,
        start,
        end,
        skip_network: false,
    })
}

/// Release the resize handle and persist the span the gesture settled on.
#[tauri::command]
pub async fn finish_resize(
    ticket: String,
    delta_px: f32,
    state: State<'_, Arc<CoreState>>,
) -> Result<BoardView, String> {
    let staged = stage_finish_resize(state.inner(), &ticket, delta_px)?;
    if staged.skip_network {
        return snapshot_board(state.inner());
    }
    let outcome = state
        .backend()
        .reschedule_appointment(
            &staged.session,
            &staged.id,
            &staged.resource_id,
            staged.start,
            staged.end,
        )
        .await;
    settle_edit(state.inner(), "resize", &staged.id, outcome)
}

// ═══════════════════════════════════════════════════════════
// Status lifecycle
// ═══════════════════════════════════════════════════════════

pub(crate) fn stage_status_change(
    state: &CoreState,
    appointment_id: &str,
    status: &str,
) -> Result<(SessionContext, AppointmentStatus), String> {
    let session = state.session_context().map_err(|e| e.to_string())?;
    let target = AppointmentStatus::parse(status).map_err(|e| e.to_string())?;
    if target == AppointmentStatus::Cancelled {
        // Cancellation has its own flow so a reason is always captured.
        return Err(ScheduleError::RemarkRequired.to_string());
    }
    let mut board = state.write_board().map_err(|e| e.to_string())?;
    if board.store.has_unresolved_edit(appointment_id) {
        return Err(ScheduleError::EditInFlight.to_string());
    }
    let appt = board
        .store
        .get(appointment_id)
        .ok_or_else(|| ScheduleError::NotFound(appointment_id.to_string()).to_string())?;
    if !appt.status.can_become(target) {
        return Err(ScheduleError::IllegalTransition {
            from: appt.status.as_str(),
            to: target.as_str(),
        }
        .to_string());
    }
    board
        .store
        .begin_edit(appointment_id)
        .map_err(|e| e.to_string())?;
    Ok((session, target))
}

/// Move a record along the lifecycle (confirm, visited, no-show, close).
#[tauri::command]
pub async fn change_status(
    appointment_id: String,
    status: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<BoardView, String> {
    let (session, target) = stage_status_change(state.inner(), &appointment_id, &status)?;
    let outcome = state
        .backend()
        .update_status(&session, &appointment_id, target)
        .await;
    settle_edit(state.inner(), "status", &appointment_id, outcome)
}

pub(crate) fn stage_cancel(
    state: &CoreState,
    appointment_id: &str,
    remarks: &str,
) -> Result<(SessionContext, String), String> {
    let reason = remarks.trim();
    if reason.is_empty() {
        return Err(ScheduleError::RemarkRequired.to_string());
    }
    let session = state.session_context().map_err(|e| e.to_string())?;
    let mut board = state.write_board().map_err(|e| e.to_string())?;
    if board.store.has_unresolved_edit(appointment_id) {
        return Err(ScheduleError::EditInFlight.to_string());
    }
    let appt = board
        .store
        .get(appointment_id)
        .ok_or_else(|| ScheduleError::NotFound(appointment_id.to_string()).to_string())?;
    if !appt.status.can_become(AppointmentStatus::Cancelled) {
        return Err(ScheduleError::IllegalTransition {
            from: appt.status.as_str(),
            to: AppointmentStatus::Cancelled.as_str(),
        }
        .to_string());
    }
    board
        .store
        .begin_edit(appointment_id)
        .map_err(|e| e.to_string())?;
    Ok((session, reason.to_string()))
}

/// Cancel a booking. The reason is mandatory and stored as remarks.
#[tauri::command]
pub async fn cancel_appointment(
    appointment_id: String,
    remarks: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<BoardView, String> {
    let (session, reason) = stage_cancel(state.inner(), &appointment_id, &remarks)?;
    let outcome = state
        .backend()
        .cancel_appointment(&session, &appointment_id, &reason)
        .await;
    settle_edit(state.inner(), "cancel", &appointment_id, outcome)
}

// ═══════════════════════════════════════════════════════════
// Settle
// ═══════════════════════════════════════════════════════════

/// Resolve a pending edit against the backend's verdict. Success installs
/// the echoed record (unless the board moved to another day meanwhile);
/// failure restores the last confirmed snapshot.
pub(crate) fn settle_edit(
    state: &CoreState,
    op: &'static str,
    id: &str,
    outcome: Result<Appointment, BackendError>,
) -> Result<BoardView, String> {
    {
        let mut board = state.write_board().map_err(|e| e.to_string())?;
        match outcome {
            Ok(echo) => {
                let echo = (echo.start.date() == board.store.date()).then_some(echo);
                board.store.confirm_edit(id, echo);
            }
            Err(e) => {
                warn!(error = %e, id, op, "Backend rejected the edit, reverting");
                board.store.revert_edit(id);
                return Err(e.to_string());
            }
        }
    }
    snapshot_board(state)
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
