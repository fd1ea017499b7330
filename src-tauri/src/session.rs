//! Injected session context: organization, bearer token, feature grants.
//!
//! The login shell authenticates elsewhere and hands the result to
//! `open_session`; nothing in the core reads ambient storage. Feature checks
//! are default-deny: a grant must name both the module and the action.

use serde::{Deserialize, Serialize};

/// Module key carried by scheduler grants.
pub const MODULE_APPOINTMENTS: &str = "APPOINTMENTS";

/// Action key required to create bookings from the board.
pub const ACTION_CREATE_APPOINTMENT: &str = "CREATE_APPOINTMENT";

/// One module's granted actions, as issued by the login shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureGrant {
    pub module: String,
    pub actions: Vec<String>,
}

/// The active organization context. Everything the backend client needs is
/// here; commands refuse to run without one.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub org_id: String,
    pub token: String,
    #[serde(default)]
    pub grants: Vec<FeatureGrant>,
}

impl SessionContext {
    /// Default-deny feature check.
    pub fn allows(&self, module: &str, action: &str) -> bool {
        self.grants
            .iter()
            .any(|g| g.module == module && g.actions.iter().any(|a| a == action))
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("org_id", &self.org_id)
            .field("token", &"<redacted>")
            .field("grants", &self.grants.len())
            .finish()
    }
}

/// What the webview may know about the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub active: bool,
    pub org_id: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
