//! Shared application state behind the command surface.
//!
//! One `CoreState` is created at startup and handed to Tauri as managed
//! state. Commands take short-lived `RwLock` guards; nothing holds a
//! guard across an await, so slow backend calls never stall the board.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use crate::backend::BackendClient;
use crate::directory::{Directory, LoadState};
use crate::schedule::geometry::GridGeometry;
use crate::schedule::gesture::{DragGesture, ResizeGesture};
use crate::schedule::store::DayStore;
use crate::schedule::Appointment;
use crate::session::{SessionContext, SessionStatus};

/// The clinic day shown on first launch and after `go_today`.
pub fn clinic_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ═══════════════════════════════════════════════════════════
// BoardState: the day view and its in-flight gestures
// ═══════════════════════════════════════════════════════════

/// Everything the day view needs: grid shape, the loaded day, and any
/// gesture currently in progress.
pub struct BoardState {
    pub geometry: GridGeometry,
    pub store: DayStore,
    pub load: LoadState,
    /// Bumped at the start of every day fetch; a reply whose stamp no
    /// longer matches is stale and dropped.
    fetch_epoch: u64,
    pub drag: Option<DragGesture>,
    pub resize: Option<ResizeGesture>,
}

impl BoardState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            geometry: GridGeometry::default(),
            store: DayStore::new(date),
            load: LoadState::Idle,
            fetch_epoch: 0,
            drag: None,
            resize: None,
        }
    }

    /// Mark a fetch as started and return its stamp. The board switches to
    /// `date` right away: the old day's records vanish, gestures die, and
    /// the view shows a loading state. Chained navigation therefore departs
    /// from the day the user last chose, not the day last installed.
    pub fn begin_fetch(&mut self, date: NaiveDate) -> u64 {
        self.fetch_epoch += 1;
        self.store.replace_day(date, Vec::new());
        self.load = LoadState::Loading;
        self.clear_gestures();
        self.fetch_epoch
    }

    pub fn is_current_fetch(&self, epoch: u64) -> bool {
        self.fetch_epoch == epoch
    }

    /// Install a fetched day if its stamp is still current. A stale reply
    /// returns `false` and leaves the board untouched.
    pub fn install_day(&mut self, epoch: u64, appointments: Vec<Appointment>) -> bool {
        if !self.is_current_fetch(epoch) {
            return false;
        }
        let date = self.store.date();
        self.store.replace_day(date, appointments);
        self.load = LoadState::Ready;
        true
    }

    /// Record a failed fetch. The day stays empty rather than showing
    /// records from another date; stale failures are ignored like stale
    /// successes.
    pub fn fail_fetch(&mut self, epoch: u64) -> bool {
        if !self.is_current_fetch(epoch) {
            return false;
        }
        self.load = LoadState::Failed;
        true
    }

    /// Forget the current day while keeping the epoch counter monotonic,
    /// so replies already in flight can never land after a reset.
    pub fn reset(&mut self, date: NaiveDate) {
        self.store = DayStore::new(date);
        self.load = LoadState::Idle;
        self.fetch_epoch += 1;
        self.clear_gestures();
    }

    pub fn clear_gestures(&mut self) {
        self.drag = None;
        self.resize = None;
    }
}

// ═══════════════════════════════════════════════════════════
// CoreState: shared by every command handler
// ═══════════════════════════════════════════════════════════

/// Application state managed by Tauri and shared across commands.
///
/// `RwLock` keeps the common path cheap: rendering reads concurrently,
/// only mutations (sign-in, fetch install, gesture commits) take the
/// write side.
pub struct CoreState {
    /// Active backend session. `None` until `open_session` succeeds.
    session: RwLock<Option<SessionContext>>,
    board: RwLock<BoardState>,
    directory: RwLock<Directory>,
    backend: BackendClient,
}

impl CoreState {
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
            board: RwLock::new(BoardState::new(clinic_today())),
            directory: RwLock::new(Directory::new()),
            backend: BackendClient::from_config(),
        }
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    // ── Session ─────────────────────────────────────────────

    pub fn read_session(
        &self,
    ) -> Result<RwLockReadGuard<'_, Option<SessionContext>>, CoreError> {
        self.session.read().map_err(|_| CoreError::LockPoisoned)
    }

    /// Owned copy of the active session, for use across awaits.
    pub fn session_context(&self) -> Result<SessionContext, CoreError> {
        let guard = self.session.read().map_err(|_| CoreError::LockPoisoned)?;
        guard.clone().ok_or(CoreError::NoActiveSession)
    }

    /// Activate a session. Switching organizations resets the board and
    /// directory so no record from the previous tenant survives, and
    /// bumps both epochs so in-flight replies for the old tenant die.
    pub fn set_session(&self, session: SessionContext) -> Result<(), CoreError> {
        {
            let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
            *guard = Some(session);
        }
        self.write_board()?.reset(clinic_today());
        self.write_directory()?.reset();
        Ok(())
    }

    /// Drop the session and all tenant data.
    pub fn clear_session(&self) -> Result<(), CoreError> {
        {
            let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
            *guard = None;
        }
        self.write_board()?.reset(clinic_today());
        self.write_directory()?.reset();
        Ok(())
    }

    pub fn session_status(&self) -> SessionStatus {
        let org_id = self
            .session
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.org_id.clone()));
        SessionStatus {
            active: org_id.is_some(),
            org_id,
        }
    }

    // ── Board ───────────────────────────────────────────────

    pub fn read_board(&self) -> Result<RwLockReadGuard<'_, BoardState>, CoreError> {
        self.board.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_board(&self) -> Result<RwLockWriteGuard<'_, BoardState>, CoreError> {
        self.board.write().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Directory ───────────────────────────────────────────

    pub fn read_directory(&self) -> Result<RwLockReadGuard<'_, Directory>, CoreError> {
        self.directory.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_directory(&self) -> Result<RwLockWriteGuard<'_, Directory>, CoreError> {
        self.directory.write().map_err(|_| CoreError::LockPoisoned)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No active session")]
    NoActiveSession,
    #[error("Internal lock error")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::AppointmentStatus;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    fn appt(id: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            resource_id: "room-1".to_string(),
            start: day().and_hms_opt(9, 0, 0).unwrap(),
            end: day().and_hms_opt(9, 30, 0).unwrap(),
            title: "Checkup".to_string(),
            client_id: None,
            client_name: None,
            doctor_id: None,
            service_id: None,
            service_name: None,
            status: AppointmentStatus::Booked,
            remarks: None,
        }
    }

    fn session() -> SessionContext {
        SessionContext {
            org_id: "org-9".to_string(),
            token: "tok".to_string(),
            grants: Vec::new(),
        }
    }

    // ── session lifecycle ─────────────────────────────────

    #[test]
    fn new_state_has_no_session() {
        let state = CoreState::new();
        assert!(!state.session_status().active);
        assert!(matches!(
            state.session_context().unwrap_err(),
            CoreError::NoActiveSession
        ));
    }

    #[test]
    fn set_session_activates_status() {
        let state = CoreState::new();
        state.set_session(session()).unwrap();
        let status = state.session_status();
        assert!(status.active);
        assert_eq!(status.org_id.as_deref(), Some("org-9"));
    }

    #[test]
    fn clear_session_wipes_tenant_data() {
        let state = CoreState::new();
        state.set_session(session()).unwrap();
        state.write_board().unwrap().store.insert(appt("a1"));
        state.clear_session().unwrap();
        assert!(!state.session_status().active);
        assert!(state.read_board().unwrap().store.appointments().is_empty());
    }

    #[test]
    fn switching_org_outdates_inflight_fetches() {
        let state = CoreState::new();
        state.set_session(session()).unwrap();
        let epoch = state.write_board().unwrap().begin_fetch(day());
        // A second sign-in (new tenant) lands before the reply does.
        state
            .set_session(SessionContext {
                org_id: "org-2".to_string(),
                token: "tok2".to_string(),
                grants: Vec::new(),
            })
            .unwrap();
        let installed = state
            .write_board()
            .unwrap()
            .install_day(epoch, vec![appt("a1")]);
        assert!(!installed);
        assert!(state.read_board().unwrap().store.appointments().is_empty());
    }

    // ── board fetch stamping ──────────────────────────────

    #[test]
    fn begin_fetch_switches_the_day_immediately() {
        let mut board = BoardState::new(day());
        board.store.insert(appt("old-day"));
        let record = board.store.get("old-day").unwrap().clone();
        board.drag = Some(DragGesture::begin(&record, 10.0));

        let next = day().succ_opt().unwrap();
        board.begin_fetch(next);
        assert_eq!(board.store.date(), next);
        assert!(board.store.appointments().is_empty());
        assert_eq!(board.load, LoadState::Loading);
        assert!(board.drag.is_none());
    }

    #[test]
    fn current_fetch_installs_and_marks_ready() {
        let mut board = BoardState::new(day());
        let epoch = board.begin_fetch(day());
        assert_eq!(board.load, LoadState::Loading);
        assert!(board.install_day(epoch, vec![appt("a1")]));
        assert_eq!(board.load, LoadState::Ready);
        assert_eq!(board.store.appointments().len(), 1);
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let mut board = BoardState::new(day());
        let first = board.begin_fetch(day());
        let second = board.begin_fetch(day());
        assert!(!board.install_day(first, vec![appt("old")]));
        assert!(board.install_day(second, vec![appt("new")]));
        assert_eq!(board.store.appointments()[0].id, "new");
    }

    #[test]
    fn rapid_navigation_chains_from_the_pending_day() {
        let mut board = BoardState::new(day());
        // Two forward clicks before either reply arrives: the second click
        // reads the pending day, so the board ends up two days ahead.
        let first = board.begin_fetch(day().succ_opt().unwrap());
        let target = board.store.date().succ_opt().unwrap();
        let second = board.begin_fetch(target);

        assert!(!board.install_day(first, vec![appt("stale")]));
        assert!(board.install_day(second, vec![appt("fresh")]));
        assert_eq!(board.store.date(), day() + chrono::Duration::days(2));
        assert_eq!(board.store.appointments()[0].id, "fresh");
    }

    #[test]
    fn failed_fetch_leaves_the_day_empty() {
        let mut board = BoardState::new(day());
        board.store.insert(appt("leftover"));
        let epoch = board.begin_fetch(day());
        assert!(board.fail_fetch(epoch));
        assert_eq!(board.load, LoadState::Failed);
        assert!(board.store.appointments().is_empty());
    }

    #[test]
    fn stale_failure_is_also_discarded() {
        let mut board = BoardState::new(day());
        let first = board.begin_fetch(day());
        let second = board.begin_fetch(day());
        assert!(board.install_day(second, vec![appt("a1")]));
        assert!(!board.fail_fetch(first));
        assert_eq!(board.load, LoadState::Ready);
        assert_eq!(board.store.appointments().len(), 1);
    }

    #[test]
    fn reset_keeps_epoch_monotonic() {
        let mut board = BoardState::new(day());
        let before = board.begin_fetch(day());
        board.reset(day());
        assert!(!board.is_current_fetch(before));
        assert_eq!(board.load, LoadState::Idle);
    }

    // ── locking ───────────────────────────────────────────

    #[test]
    fn concurrent_reads_do_not_block() {
        use std::sync::Arc;
        use std::thread;

        let state = Arc::new(CoreState::new());
        let mut handles = vec![];
        for _ in 0..10 {
            let state = Arc::clone(&state);
            handles.push(thread::spawn(move || {
                let guard = state.read_session().unwrap();
                assert!(guard.is_none());
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn core_error_display() {
        assert_eq!(CoreError::NoActiveSession.to_string(), "No active session");
        assert_eq!(CoreError::LockPoisoned.to_string(), "Internal lock error");
    }
}
