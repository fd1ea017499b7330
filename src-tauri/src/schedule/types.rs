use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::schedule::status::AppointmentStatus;

/// A booked slot on the day board: the local shadow of a backend record.
///
/// `id` is opaque and server-assigned; the client never mints one. `start`
/// and `end` are clinic-local wall-clock times on the displayed day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub resource_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub title: String,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub doctor_id: Option<String>,
    pub service_id: Option<String>,
    pub service_name: Option<String>,
    pub status: AppointmentStatus,
    pub remarks: Option<String>,
}

impl Appointment {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Form payload for a new booking, produced by the creation modal.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointmentForm {
    pub resource_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub title: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<String>,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn appt(start: NaiveDateTime, end: NaiveDateTime) -> Appointment {
        Appointment {
            id: "a1".into(),
            resource_id: "r1".into(),
            start,
            end,
            title: "Checkup".into(),
            client_id: None,
            client_name: None,
            doctor_id: None,
            service_id: None,
            service_name: None,
            status: AppointmentStatus::Booked,
            remarks: None,
        }
    }

    #[test]
    fn duration_in_minutes() {
        assert_eq!(appt(at(9, 0), at(10, 30)).duration_minutes(), 90);
    }
}
