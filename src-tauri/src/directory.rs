//! Per-organization reference data: resources (columns), employees, doctors,
//! and services, plus the remote client lookup.
//!
//! Each list is fetched independently and carries its own load flag, so one
//! failing endpoint empties and flags only its own list. A refresh epoch
//! guards against a slow response from a previous organization landing after
//! a session switch.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Fetch state of one reference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// A bookable column on the day board (chair, room, station).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

/// Staff member offered in the creation form's dropdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub description: Option<String>,
}

/// One client autocomplete candidate, label pre-built for the dropdown.
#[derive(Debug, Clone, Serialize)]
pub struct ClientHit {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    /// "Ana Petrova (22 555 0101)" or "Ana Petrova (No phone)".
    pub label: String,
}

impl ClientHit {
    pub fn new(id: String, name: String, phone: Option<String>) -> Self {
        let label = match phone.as_deref() {
            Some(p) if !p.trim().is_empty() => format!("{name} ({p})"),
            _ => format!("{name} (No phone)"),
        };
        Self {
            id,
            name,
            phone,
            label,
        }
    }
}

/// Load flags per reference list.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DirectoryLoads {
    pub resources: LoadState,
    pub employees: LoadState,
    pub doctors: LoadState,
    pub services: LoadState,
}

/// All reference lists for the active organization.
#[derive(Debug)]
pub struct Directory {
    pub resources: Vec<Resource>,
    pub employees: Vec<Employee>,
    pub doctors: Vec<Doctor>,
    pub services: Vec<ServiceItem>,
    loads: DirectoryLoads,
    epoch: u64,
}

/// Serialized snapshot returned to the webview.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryView {
    pub resources: Vec<Resource>,
    pub employees: Vec<Employee>,
    pub doctors: Vec<Doctor>,
    pub services: Vec<ServiceItem>,
    pub loads: DirectoryLoads,
}

// ═══════════════════════════════════════════════════════════
// Directory
// ═══════════════════════════════════════════════════════════

impl Directory {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            employees: Vec::new(),
            doctors: Vec::new(),
            services: Vec::new(),
            loads: DirectoryLoads {
                resources: LoadState::Idle,
                employees: LoadState::Idle,
                doctors: LoadState::Idle,
                services: LoadState::Idle,
            },
            epoch: 0,
        }
    }

    /// Start a refresh: flags every list as loading and returns the epoch
    /// that fetch results must present to be installed.
    pub fn begin_refresh(&mut self) -> u64 {
        self.epoch += 1;
        self.loads = DirectoryLoads {
            resources: LoadState::Loading,
            employees: LoadState::Loading,
            doctors: LoadState::Loading,
            services: LoadState::Loading,
        };
        self.epoch
    }

    /// Whether results stamped with `epoch` are still wanted.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Drop everything (session close / organization switch). Bumping the
    /// epoch orphans any fetch still in the air.
    pub fn reset(&mut self) {
        *self = Self {
            epoch: self.epoch + 1,
            ..Self::new()
        };
    }

    pub fn loads(&self) -> DirectoryLoads {
        self.loads
    }

    pub fn set_resources(&mut self, list: Vec<Resource>) {
        self.resources = list;
        self.loads.resources = LoadState::Ready;
    }

    /// Read failure: show nothing rather than stale data.
    pub fn fail_resources(&mut self) {
        self.resources.clear();
        self.loads.resources = LoadState::Failed;
    }

    pub fn set_employees(&mut self, list: Vec<Employee>) {
        self.employees = list;
        self.loads.employees = LoadState::Ready;
    }

    pub fn fail_employees(&mut self) {
        self.employees.clear();
        self.loads.employees = LoadState::Failed;
    }

    pub fn set_doctors(&mut self, list: Vec<Doctor>) {
        self.doctors = list;
        self.loads.doctors = LoadState::Ready;
    }

    pub fn fail_doctors(&mut self) {
        self.doctors.clear();
        self.loads.doctors = LoadState::Failed;
    }

    pub fn set_services(&mut self, list: Vec<ServiceItem>) {
        self.services = list;
        self.loads.services = LoadState::Ready;
    }

    pub fn fail_services(&mut self) {
        self.services.clear();
        self.loads.services = LoadState::Failed;
    }

    pub fn view(&self) -> DirectoryView {
        DirectoryView {
            resources: self.resources.clone(),
            employees: self.employees.clone(),
            doctors: self.doctors.clone(),
            services: self.services.clone(),
            loads: self.loads,
        }
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
