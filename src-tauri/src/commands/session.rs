//! Session commands.
//!
//! The login shell runs outside this crate; once it has a token and the
//! feature grants for an organization it calls `open_session`. Every other
//! command refuses to work until that happens, and `close_session` (or a
//! second `open_session` for another organization) wipes all tenant data.

use std::sync::Arc;

use tauri::State;

use crate::core_state::CoreState;
use crate::session::{FeatureGrant, SessionContext, SessionStatus};

pub(crate) fn activate(
    state: &CoreState,
    org_id: String,
    token: String,
    grants: Vec<FeatureGrant>,
) -> Result<SessionStatus, String> {
    if org_id.trim().is_empty() {
        return Err("Organization id is required".into());
    }
    if token.trim().is_empty() {
        return Err("Access token is required".into());
    }
    let context = SessionContext {
        org_id,
        token,
        grants,
    };
    tracing::info!(
        org_id = %context.org_id,
        backend = %state.backend().base_url(),
        "Session opened"
    );
    state.set_session(context).map_err(|e| e.to_string())?;
    Ok(state.session_status())
}

pub(crate) fn deactivate(state: &CoreState) -> Result<SessionStatus, String> {
    state.clear_session().map_err(|e| e.to_string())?;
    tracing::info!("Session closed");
    Ok(state.session_status())
}

/// Activate an organization context delivered by the login shell.
#[tauri::command]
pub fn open_session(
    org_id: String,
    token: String,
    grants: Vec<FeatureGrant>,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionStatus, String> {
    activate(state.inner(), org_id, token, grants)
}

/// Sign out: drops the token and every cached record of the tenant.
#[tauri::command]
pub fn close_session(state: State<'_, Arc<CoreState>>) -> Result<SessionStatus, String> {
    deactivate(state.inner())
}

#[tauri::command]
pub fn session_status(state: State<'_, Arc<CoreState>>) -> SessionStatus {
    state.session_status()
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
