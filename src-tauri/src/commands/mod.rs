pub mod board;
pub mod directory;
pub mod session;

/// Health check IPC command, used by the webview to verify the core is up.
#[tauri::command]
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}
