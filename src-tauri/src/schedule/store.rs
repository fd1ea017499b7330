//! In-memory store for the visible day's appointments.
//!
//! The backend owns the truth; this store holds the optimistic local shadow.
//! Every mutation that will be persisted is bracketed by an edit: `begin_edit`
//! snapshots the confirmed record and refuses a second edit while the first
//! is unresolved, `confirm_edit` drops the snapshot (optionally installing
//! the server's echo), and `revert_edit` rolls the record back to the
//! snapshot when persistence fails. Replacing the day wholesale abandons all
//! snapshots; a fresh fetch is authoritative.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::schedule::types::Appointment;
use crate::schedule::ScheduleError;

#[derive(Debug)]
pub struct DayStore {
    date: NaiveDate,
    appointments: Vec<Appointment>,
    /// Confirmed snapshots of records with an unresolved edit, by id.
    prior: HashMap<String, Appointment>,
}

impl DayStore {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            appointments: Vec::new(),
            prior: HashMap::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Appointment> {
        self.appointments.iter_mut().find(|a| a.id == id)
    }

    /// Install a freshly fetched day, abandoning any unresolved edits.
    pub fn replace_day(&mut self, date: NaiveDate, appointments: Vec<Appointment>) {
        self.date = date;
        self.appointments = appointments;
        self.prior.clear();
    }

    /// Add a server-returned record; an existing record with the same id is
    /// replaced.
    pub fn insert(&mut self, appt: Appointment) {
        match self.get_mut(&appt.id) {
            Some(slot) => *slot = appt,
            None => self.appointments.push(appt),
        }
    }

    // ── Edit bracketing ──────────────────────────────────────────────

    /// Whether a previous change to this record is still being persisted.
    pub fn has_unresolved_edit(&self, id: &str) -> bool {
        self.prior.contains_key(id)
    }

    /// Snapshot the confirmed record before an optimistic change. Refused
    /// while an earlier edit is unresolved; gestures are serialized per
    /// appointment.
    pub fn begin_edit(&mut self, id: &str) -> Result<(), ScheduleError> {
        if self.prior.contains_key(id) {
            return Err(ScheduleError::EditInFlight);
        }
        let current = self
            .get(id)
            .cloned()
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;
        self.prior.insert(id.to_string(), current);
        Ok(())
    }

    /// Resolve an edit as persisted. A server echo, when provided, replaces
    /// the optimistic record.
    pub fn confirm_edit(&mut self, id: &str, echo: Option<Appointment>) {
        self.prior.remove(id);
        if let Some(appt) = echo {
            self.insert(appt);
        }
    }

    /// Resolve an edit as failed, restoring the confirmed snapshot. A record
    /// dropped by a day replacement stays dropped; the fetch already told
    /// the truth.
    pub fn revert_edit(&mut self, id: &str) {
        if let Some(prev) = self.prior.remove(id) {
            if let Some(slot) = self.get_mut(id) {
                *slot = prev;
            }
        }
    }

    // ── Optimistic mutations ─────────────────────────────────────────

    /// Apply new geometry (move or resize) to a record. Status and remarks
    /// are never written optimistically; those land only as server echoes
    /// through `confirm_edit`.
    pub fn apply_geometry(
        &mut self,
        id: &str,
        resource_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<(), ScheduleError> {
        let appt = self
            .get_mut(id)
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;
        appt.resource_id = resource_id.to_string();
        appt.start = start;
        appt.end = end;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
