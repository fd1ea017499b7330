//! Wire-format types for the clinic backend.
//!
//! Response DTOs accept the loose shapes the backend actually emits
//! (numeric or string ids, mixed field casing, several timestamp formats)
//! and normalize them into the crate's domain types exactly once, here.
//! A record missing a required field is an error, not a silent default.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::backend::BackendError;
use crate::directory::{ClientHit, Doctor, Employee, Resource, ServiceItem};
use crate::schedule::{Appointment, AppointmentStatus};

// ═══════════════════════════════════════════════════════════
// Envelopes
// ═══════════════════════════════════════════════════════════

/// Most list/record endpoints wrap their payload as `{"response": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseEnvelope<T> {
    pub response: T,
}

/// Client search wraps its payload as `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

// ═══════════════════════════════════════════════════════════
// Scalar helpers
// ═══════════════════════════════════════════════════════════

/// Identifier as the backend sends it: MySQL rows arrive as JSON numbers,
/// newer records as strings. Normalized to `String` in the domain.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Num(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Num(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

/// Price column comes back as a number or a numeric string depending on
/// the backend's serializer. Non-numeric text normalizes to `None`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WirePrice {
    Num(f64),
    Text(String),
}

impl WirePrice {
    fn into_f64(self) -> Option<f64> {
        match self {
            WirePrice::Num(n) => Some(n),
            WirePrice::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Parses a backend timestamp into a wall-clock datetime.
///
/// Accepted shapes, tried in order:
/// - `2026-03-09T10:00:00` (canonical)
/// - `2026-03-09T10:00:00.000` (fractional seconds)
/// - `2026-03-09 10:00:00` (raw MySQL)
/// - RFC 3339 with an offset, e.g. `2026-03-09T10:00:00.000Z`; the offset
///   is dropped and the written wall time kept, since the backend stores
///   clinic-local times whatever suffix its serializer appends.
pub(crate) fn parse_wire_datetime(raw: &str) -> Result<NaiveDateTime, BackendError> {
    let s = raw.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.naive_local()))
        .map_err(|_| BackendError::BadTimestamp(raw.to_string()))
}

/// Formats a datetime the way the backend expects it: `2026-03-09T10:00:00`.
pub fn wire_datetime(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Formats a date for query strings and request bodies: `2026-03-09`.
pub fn wire_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn require<T>(
    value: Option<T>,
    object: &'static str,
    field: &'static str,
) -> Result<T, BackendError> {
    value.ok_or(BackendError::MissingField { object, field })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// ═══════════════════════════════════════════════════════════
// Response DTOs
// ═══════════════════════════════════════════════════════════

/// Appointment record as `getActiveAppointments` and the mutation
/// endpoints return it. Field casing is mixed on the wire; kept verbatim.
#[derive(Debug, Deserialize)]
pub(crate) struct AppointmentDto {
    pub id: Option<WireId>,
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub resource_id: Option<WireId>,
    #[serde(rename = "clientName")]
    pub client_name: Option<String>,
    pub client_id: Option<WireId>,
    pub doctor_id: Option<WireId>,
    pub service_id: Option<WireId>,
    pub service: Option<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
}

impl AppointmentDto {
    pub(crate) fn into_domain(self) -> Result<Appointment, BackendError> {
        let id = require(self.id, "appointment", "id")?.into_string();
        let resource_id = require(self.resource_id, "appointment", "resource_id")?.into_string();
        let start = parse_wire_datetime(&require(self.start_time, "appointment", "start_time")?)?;
        let end = parse_wire_datetime(&require(self.end_time, "appointment", "end_time")?)?;
        let status = match non_blank(self.status) {
            Some(raw) => AppointmentStatus::parse(&raw)
                .map_err(|_| BackendError::Decode(format!("unknown appointment status `{raw}`")))?,
            None => AppointmentStatus::Booked,
        };
        Ok(Appointment {
            id,
            resource_id,
            start,
            end,
            title: non_blank(self.title).unwrap_or_else(|| "Appointment".to_string()),
            client_id: self.client_id.map(WireId::into_string),
            client_name: non_blank(self.client_name),
            doctor_id: self.doctor_id.map(WireId::into_string),
            service_id: self.service_id.map(WireId::into_string),
            service_name: non_blank(self.service),
            status,
            remarks: non_blank(self.remarks),
        })
    }
}

/// Bookable room or chair column, from `getResources`.
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceDto {
    pub id: Option<WireId>,
    pub name: Option<String>,
    pub color: Option<String>,
}

impl ResourceDto {
    pub(crate) fn into_domain(self) -> Result<Resource, BackendError> {
        Ok(Resource {
            id: require(self.id, "resource", "id")?.into_string(),
            name: require(non_blank(self.name), "resource", "name")?,
            color: non_blank(self.color),
        })
    }
}

/// Staff member, from `getEmployees`. The backend exposes only the
/// given name on this endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct EmployeeDto {
    pub id: Option<WireId>,
    pub first_name: Option<String>,
    pub color: Option<String>,
}

impl EmployeeDto {
    pub(crate) fn into_domain(self) -> Result<Employee, BackendError> {
        Ok(Employee {
            id: require(self.id, "employee", "id")?.into_string(),
            name: require(non_blank(self.first_name), "employee", "first_name")?,
            color: non_blank(self.color),
        })
    }
}

/// Practitioner, from `getDoctors`. Some deployments send a composed
/// `name`, others split `first_name`/`last_name`.
#[derive(Debug, Deserialize)]
pub(crate) struct DoctorDto {
    pub id: Option<WireId>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl DoctorDto {
    pub(crate) fn into_domain(self) -> Result<Doctor, BackendError> {
        let composed = match (non_blank(self.first_name), non_blank(self.last_name)) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first),
            (None, Some(last)) => Some(last),
            (None, None) => None,
        };
        Ok(Doctor {
            id: require(self.id, "doctor", "id")?.into_string(),
            name: require(non_blank(self.name).or(composed), "doctor", "name")?,
        })
    }
}

/// Billable service, from `getServices`.
#[derive(Debug, Deserialize)]
pub(crate) struct ServiceDto {
    pub id: Option<WireId>,
    #[serde(rename = "serviceName")]
    pub service_name: Option<String>,
    pub desc: Option<String>,
    pub price: Option<WirePrice>,
}

impl ServiceDto {
    pub(crate) fn into_domain(self) -> Result<ServiceItem, BackendError> {
        Ok(ServiceItem {
            id: require(self.id, "service", "id")?.into_string(),
            name: require(non_blank(self.service_name), "service", "serviceName")?,
            price: self.price.and_then(WirePrice::into_f64),
            description: non_blank(self.desc),
        })
    }
}

/// Client search hit, from `clientSearch`.
#[derive(Debug, Deserialize)]
pub(crate) struct ClientDto {
    pub id: Option<WireId>,
    pub first_name: Option<String>,
    pub phone: Option<String>,
}

impl ClientDto {
    pub(crate) fn into_domain(self) -> Result<ClientHit, BackendError> {
        Ok(ClientHit::new(
            require(self.id, "client", "id")?.into_string(),
            require(non_blank(self.first_name), "client", "first_name")?,
            self.phone,
        ))
    }
}

// ═══════════════════════════════════════════════════════════
// Request bodies
// ═══════════════════════════════════════════════════════════

/// Body for `POST bookAppointment`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookAppointmentBody {
    pub title: String,
    pub resource_id: String,
    pub org_id: String,
    pub date: String,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Body for `POST rescheduleAppointment`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RescheduleBody {
    pub id: String,
    pub org_id: String,
    pub resource_id: String,
    pub start: String,
    pub end: String,
}

/// Body for `POST updateStatus`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateStatusBody {
    pub id: String,
    pub org_id: String,
    pub status: String,
}

/// Body for `POST cancelAppointment`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CancelBody {
    pub id: String,
    pub org_id: String,
    pub cancel_remarks: String,
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn appointment_json() -> serde_json::Value {
        serde_json::json!({
            "id": 41,
            "title": "Hygiene visit",
            "start_time": "2026-03-09T10:00:00",
            "end_time": "2026-03-09T10:30:00",
            "resource_id": "room-1",
            "clientName": "Dana Reyes",
            "client_id": 7,
            "status": "CONFIRMED",
            "remarks": null
        })
    }

    // ── timestamp parsing ─────────────────────────────────

    #[test]
    fn parses_canonical_timestamp() {
        let t = parse_wire_datetime("2026-03-09T10:30:00").unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert_eq!((t.hour(), t.minute()), (10, 30));
    }

    #[test]
    fn parses_fractional_and_mysql_timestamps() {
        let a = parse_wire_datetime("2026-03-09T10:30:00.250").unwrap();
        let b = parse_wire_datetime("2026-03-09 10:30:00").unwrap();
        assert_eq!(a.minute(), 30);
        assert_eq!(b.minute(), 30);
    }

    #[test]
    fn rfc3339_offset_is_dropped_keeping_wall_time() {
        let zulu = parse_wire_datetime("2026-03-09T10:00:00.000Z").unwrap();
        let offset = parse_wire_datetime("2026-03-09T10:00:00+05:00").unwrap();
        assert_eq!(zulu.hour(), 10);
        assert_eq!(offset.hour(), 10);
    }

    #[test]
    fn garbage_timestamp_is_an_error() {
        let err = parse_wire_datetime("next tuesday").unwrap_err();
        assert!(matches!(err, BackendError::BadTimestamp(_)));
    }

    #[test]
    fn wire_formats_round_trip() {
        let t = NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(wire_datetime(t), "2026-03-09T09:05:00");
        assert_eq!(wire_date(t.date()), "2026-03-09");
        assert_eq!(parse_wire_datetime(&wire_datetime(t)).unwrap(), t);
    }

    // ── appointment normalization ─────────────────────────

    #[test]
    fn appointment_normalizes_with_numeric_ids() {
        let dto: AppointmentDto = serde_json::from_value(appointment_json()).unwrap();
        let appt = dto.into_domain().unwrap();
        assert_eq!(appt.id, "41");
        assert_eq!(appt.resource_id, "room-1");
        assert_eq!(appt.client_id.as_deref(), Some("7"));
        assert_eq!(appt.client_name.as_deref(), Some("Dana Reyes"));
        assert_eq!(appt.status, AppointmentStatus::Confirmed);
        assert_eq!(appt.duration_minutes(), 30);
    }

    #[test]
    fn appointment_without_id_is_rejected() {
        let mut json = appointment_json();
        json.as_object_mut().unwrap().remove("id");
        let dto: AppointmentDto = serde_json::from_value(json).unwrap();
        let err = dto.into_domain().unwrap_err();
        assert!(matches!(
            err,
            BackendError::MissingField {
                object: "appointment",
                field: "id"
            }
        ));
    }

    #[test]
    fn appointment_defaults_title_and_status() {
        let mut json = appointment_json();
        let obj = json.as_object_mut().unwrap();
        obj.insert("title".into(), serde_json::Value::String("  ".into()));
        obj.remove("status");
        let dto: AppointmentDto = serde_json::from_value(json).unwrap();
        let appt = dto.into_domain().unwrap();
        assert_eq!(appt.title, "Appointment");
        assert_eq!(appt.status, AppointmentStatus::Booked);
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let mut json = appointment_json();
        json.as_object_mut()
            .unwrap()
            .insert("status".into(), serde_json::Value::String("PARKED".into()));
        let dto: AppointmentDto = serde_json::from_value(json).unwrap();
        assert!(matches!(
            dto.into_domain().unwrap_err(),
            BackendError::Decode(_)
        ));
    }

    // ── directory normalization ───────────────────────────

    #[test]
    fn resource_requires_name() {
        let dto: ResourceDto =
            serde_json::from_value(serde_json::json!({ "id": 3, "name": "" })).unwrap();
        assert!(matches!(
            dto.into_domain().unwrap_err(),
            BackendError::MissingField {
                object: "resource",
                field: "name"
            }
        ));
    }

    #[test]
    fn doctor_name_composes_from_split_fields() {
        let dto: DoctorDto = serde_json::from_value(serde_json::json!({
            "id": 9,
            "first_name": "Imani",
            "last_name": "Okafor"
        }))
        .unwrap();
        assert_eq!(dto.into_domain().unwrap().name, "Imani Okafor");
    }

    #[test]
    fn service_price_accepts_numeric_string() {
        let dto: ServiceDto = serde_json::from_value(serde_json::json!({
            "id": 2,
            "serviceName": "Cleaning",
            "price": "85.50"
        }))
        .unwrap();
        let service = dto.into_domain().unwrap();
        assert_eq!(service.price, Some(85.5));
    }

    #[test]
    fn client_hit_label_includes_phone() {
        let dto: ClientDto = serde_json::from_value(serde_json::json!({
            "id": "c-12",
            "first_name": "Noor",
            "phone": "555-0188"
        }))
        .unwrap();
        let hit = dto.into_domain().unwrap();
        assert_eq!(hit.label, "Noor (555-0188)");
    }

    // ── request serialization ─────────────────────────────

    #[test]
    fn book_body_uses_camel_case_and_skips_empty_options() {
        let body = BookAppointmentBody {
            title: "Checkup".into(),
            resource_id: "room-1".into(),
            org_id: "org-9".into(),
            date: "2026-03-09".into(),
            start: "2026-03-09T08:00:00".into(),
            end: "2026-03-09T08:30:00".into(),
            client_id: Some("7".into()),
            doctor_id: None,
            service_id: None,
            remarks: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["resourceId"], "room-1");
        assert_eq!(json["orgId"], "org-9");
        assert_eq!(json["clientId"], "7");
        assert!(json.get("doctorId").is_none());
        assert!(json.get("remarks").is_none());
    }

    #[test]
    fn cancel_body_field_name_matches_wire() {
        let body = CancelBody {
            id: "41".into(),
            org_id: "org-9".into(),
            cancel_remarks: "Client called to cancel".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["cancelRemarks"], "Client called to cancel");
    }
}
