pub mod backend; // Clinic platform REST client
pub mod commands;
pub mod config;
pub mod core_state; // Shared in-memory state behind Tauri
pub mod directory; // Org reference lists (resources, staff, services)
pub mod schedule; // Grid geometry, conflicts, store, gestures, layout
pub mod session; // Org scope, bearer token, feature grants

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Slotboard starting v{}", config::APP_VERSION);

    tauri::Builder::default()
        .manage(Arc::new(core_state::CoreState::new()))
        .invoke_handler(tauri::generate_handler![
            commands::health_check,
            commands::session::open_session,
            commands::session::close_session,
            commands::session::session_status,
            commands::directory::load_directory,
            commands::directory::search_clients,
            commands::board::board_view,
            commands::board::load_day,
            commands::board::shift_day,
            commands::board::go_today,
            commands::board::begin_slot_selection,
            commands::board::create_appointment,
            commands::board::begin_drag,
            commands::board::drop_appointment,
            commands::board::begin_resize,
            commands::board::resize_preview,
            commands::board::finish_resize,
            commands::board::appointment_detail,
            commands::board::change_status,
            commands::board::cancel_appointment,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Slotboard")
}
