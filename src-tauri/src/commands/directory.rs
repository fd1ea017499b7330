//! Directory commands: reference lists and client autocomplete.
//!
//! The four lists load concurrently; each failure empties and flags only its
//! own list. Results are installed only if no newer refresh (or session
//! switch) started while they were in flight.

use std::sync::Arc;

use tauri::State;
use tracing::{debug, warn};

use crate::backend::BackendError;
use crate::core_state::CoreState;
use crate::directory::{
    ClientHit, Directory, DirectoryView, Doctor, Employee, Resource, ServiceItem,
};

/// Blank queries resolve locally to "no candidates"; only a non-empty
/// trimmed query is worth a round trip.
pub(crate) fn normalized_query(query: &str) -> Option<&str> {
    let q = query.trim();
    (!q.is_empty()).then_some(q)
}

/// Install one refresh's results. Returns `false` (leaving the directory
/// untouched) when a newer refresh superseded this one.
pub(crate) fn install_refresh(
    dir: &mut Directory,
    epoch: u64,
    resources: Result<Vec<Resource>, BackendError>,
    employees: Result<Vec<Employee>, BackendError>,
    doctors: Result<Vec<Doctor>, BackendError>,
    services: Result<Vec<ServiceItem>, BackendError>,
) -> bool {
    if !dir.is_current(epoch) {
        debug!(epoch, "Discarding stale directory refresh");
        return false;
    }
    match resources {
        Ok(list) => dir.set_resources(list),
        Err(e) => {
            warn!(error = %e, "Failed to load resources");
            dir.fail_resources();
        }
    }
    match employees {
        Ok(list) => dir.set_employees(list),
        Err(e) => {
            warn!(error = %e, "Failed to load employees");
            dir.fail_employees();
        }
    }
    match doctors {
        Ok(list) => dir.set_doctors(list),
        Err(e) => {
            warn!(error = %e, "Failed to load doctors");
            dir.fail_doctors();
        }
    }
    match services {
        Ok(list) => dir.set_services(list),
        Err(e) => {
            warn!(error = %e, "Failed to load services");
            dir.fail_services();
        }
    }
    true
}

/// Fetch all four reference lists for the active organization.
#[tauri::command]
pub async fn load_directory(state: State<'_, Arc<CoreState>>) -> Result<DirectoryView, String> {
    let session = state.session_context().map_err(|e| e.to_string())?;
    let epoch = state
        .write_directory()
        .map_err(|e| e.to_string())?
        .begin_refresh();

    let backend = state.backend();
    let (resources, employees, doctors, services) = tokio::join!(
        backend.fetch_resources(&session),
        backend.fetch_employees(&session),
        backend.fetch_doctors(&session),
        backend.fetch_services(&session),
    );

    let mut dir = state.write_directory().map_err(|e| e.to_string())?;
    install_refresh(&mut dir, epoch, resources, employees, doctors, services);
    Ok(dir.view())
}

/// Client autocomplete for the creation form. At most five hits.
#[tauri::command]
pub async fn search_clients(
    query: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<Vec<ClientHit>, String> {
    let Some(q) = normalized_query(&query) else {
        return Ok(Vec::new());
    };
    let session = state.session_context().map_err(|e| e.to_string())?;
    state
        .backend()
        .search_clients(&session, q)
        .await
        .map_err(|e| e.to_string())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::LoadState;

    fn resource(id: &str) -> Resource {
        Resource {
            id: id.to_string(),
            name: format!("Room {id}"),
            color: None,
        }
    }

    #[test]
    fn blank_queries_resolve_locally() {
        assert_eq!(normalized_query(""), None);
        assert_eq!(normalized_query("   "), None);
        assert_eq!(normalized_query(" ana "), Some("ana"));
    }

    #[test]
    fn refresh_installs_each_list() {
        let mut dir = Directory::new();
        let epoch = dir.begin_refresh();
        let installed = install_refresh(
            &mut dir,
            epoch,
            Ok(vec![resource("1")]),
            Ok(Vec::new()),
            Ok(Vec::new()),
            Ok(Vec::new()),
        );
        assert!(installed);
        assert_eq!(dir.resources.len(), 1);
        assert_eq!(dir.loads().resources, LoadState::Ready);
        assert_eq!(dir.loads().services, LoadState::Ready);
    }

    #[test]
    fn one_failing_list_flags_only_itself() {
        let mut dir = Directory::new();
        let epoch = dir.begin_refresh();
        install_refresh(
            &mut dir,
            epoch,
            Ok(vec![resource("1")]),
            Err(BackendError::Timeout(15)),
            Ok(Vec::new()),
            Ok(Vec::new()),
        );
        assert_eq!(dir.loads().resources, LoadState::Ready);
        assert_eq!(dir.loads().employees, LoadState::Failed);
        assert!(dir.employees.is_empty());
        assert_eq!(dir.loads().doctors, LoadState::Ready);
    }

    #[test]
    fn superseded_refresh_is_discarded() {
        let mut dir = Directory::new();
        let stale = dir.begin_refresh();
        let current = dir.begin_refresh();
        let installed = install_refresh(
            &mut dir,
            stale,
            Ok(vec![resource("old")]),
            Ok(Vec::new()),
            Ok(Vec::new()),
            Ok(Vec::new()),
        );
        assert!(!installed);
        assert!(dir.resources.is_empty());
        assert_eq!(dir.loads().resources, LoadState::Loading);

        assert!(install_refresh(
            &mut dir,
            current,
            Ok(vec![resource("new")]),
            Ok(Vec::new()),
            Ok(Vec::new()),
            Ok(Vec::new()),
        ));
        assert_eq!(dir.resources[0].id, "new");
    }
}
