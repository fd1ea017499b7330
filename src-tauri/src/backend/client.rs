//! Async HTTP client for the clinic backend.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::backend::types::{
    AppointmentDto, BookAppointmentBody, CancelBody, ClientDto, DataEnvelope, DoctorDto,
    EmployeeDto, ResourceDto, RescheduleBody, ResponseEnvelope, ServiceDto, UpdateStatusBody,
};
use crate::backend::{wire_date, wire_datetime, BackendError};
use crate::config;
use crate::directory::{ClientHit, Doctor, Employee, Resource, ServiceItem};
use crate::schedule::types::NewAppointmentForm;
use crate::schedule::{Appointment, AppointmentStatus};
use crate::session::SessionContext;

/// Client search asks the backend for at most this many hits and trims
/// any overfull reply to the same bound.
pub const CLIENT_SEARCH_LIMIT: usize = 5;

/// Typed access to the clinic backend's REST endpoints.
///
/// Every call carries the session's bearer token and `orgId`, so records
/// never cross tenant boundaries. Connection and timeout failures map to
/// dedicated error variants so the UI can tell "backend down" from
/// "backend said no".
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
    timeout_secs: u64,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            timeout_secs,
        }
    }

    /// Builds a client from `SLOTBOARD_BACKEND_URL` (or the default).
    pub fn from_config() -> Self {
        Self::new(&config::backend_url(), config::REQUEST_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ═══════════════════════════════════════════════════════════
    // Directory endpoints
    // ═══════════════════════════════════════════════════════════

    pub async fn fetch_resources(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<Resource>, BackendError> {
        let envelope: ResponseEnvelope<Vec<ResourceDto>> = self
            .get_json(
                "clientAdmin/resourceManagement/getResources",
                session,
                &[("status", "ENABLED")],
            )
            .await?;
        envelope
            .response
            .into_iter()
            .map(ResourceDto::into_domain)
            .collect()
    }

    pub async fn fetch_employees(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<Employee>, BackendError> {
        let envelope: ResponseEnvelope<Vec<EmployeeDto>> = self
            .get_json(
                "clientAdmin/userMgmt/getEmployees",
                session,
                &[("status", "ENABLED")],
            )
            .await?;
        envelope
            .response
            .into_iter()
            .map(EmployeeDto::into_domain)
            .collect()
    }

    pub async fn fetch_doctors(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<Doctor>, BackendError> {
        let envelope: ResponseEnvelope<Vec<DoctorDto>> = self
            .get_json(
                "clientAdmin/userMgmt/getDoctors",
                session,
                &[("status", "ENABLED")],
            )
            .await?;
        envelope
            .response
            .into_iter()
            .map(DoctorDto::into_domain)
            .collect()
    }

    pub async fn fetch_services(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<ServiceItem>, BackendError> {
        let envelope: ResponseEnvelope<Vec<ServiceDto>> = self
            .get_json("clientAdmin/serviceManagement/getServices", session, &[])
            .await?;
        envelope
            .response
            .into_iter()
            .map(ServiceDto::into_domain)
            .collect()
    }

    pub async fn search_clients(
        &self,
        session: &SessionContext,
        query: &str,
    ) -> Result<Vec<ClientHit>, BackendError> {
        let limit = CLIENT_SEARCH_LIMIT.to_string();
        let envelope: DataEnvelope<Vec<ClientDto>> = self
            .get_json(
                "patient/clients/clientSearch",
                session,
                &[("search", query), ("limit", &limit)],
            )
            .await?;
        let mut hits = envelope
            .data
            .into_iter()
            .map(ClientDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        hits.truncate(CLIENT_SEARCH_LIMIT);
        Ok(hits)
    }

    // ═══════════════════════════════════════════════════════════
    // Appointment endpoints
    // ═══════════════════════════════════════════════════════════

    /// Fetches every active appointment on the given clinic day, all
    /// resources.
    pub async fn fetch_day(
        &self,
        session: &SessionContext,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, BackendError> {
        let date = wire_date(date);
        let envelope: ResponseEnvelope<Vec<AppointmentDto>> = self
            .get_json(
                "appointments/appt/getActiveAppointments",
                session,
                &[("date", &date)],
            )
            .await?;
        envelope
            .response
            .into_iter()
            .map(AppointmentDto::into_domain)
            .collect()
    }

    /// Books a new appointment and returns the persisted record.
    pub async fn book_appointment(
        &self,
        session: &SessionContext,
        form: &NewAppointmentForm,
    ) -> Result<Appointment, BackendError> {
        let body = BookAppointmentBody {
            title: form.title.clone(),
            resource_id: form.resource_id.clone(),
            org_id: session.org_id.clone(),
            date: wire_date(form.start.date()),
            start: wire_datetime(form.start),
            end: wire_datetime(form.end),
            client_id: form.client_id.clone(),
            doctor_id: form.doctor_id.clone(),
            service_id: form.service_id.clone(),
            remarks: form.notes.clone(),
        };
        let envelope: ResponseEnvelope<AppointmentDto> = self
            .post_json("appointments/appt/bookAppointment", session, &body)
            .await?;
        envelope.response.into_domain()
    }

    /// Persists a move or resize: new resource and span for an existing id.
    pub async fn reschedule_appointment(
        &self,
        session: &SessionContext,
        id: &str,
        resource_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Appointment, BackendError> {
        let body = RescheduleBody {
            id: id.to_string(),
            org_id: session.org_id.clone(),
            resource_id: resource_id.to_string(),
            start: wire_datetime(start),
            end: wire_datetime(end),
        };
        let envelope: ResponseEnvelope<AppointmentDto> = self
            .post_json("appointments/appt/rescheduleAppointment", session, &body)
            .await?;
        envelope.response.into_domain()
    }

    pub async fn update_status(
        &self,
        session: &SessionContext,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, BackendError> {
        let body = UpdateStatusBody {
            id: id.to_string(),
            org_id: session.org_id.clone(),
            status: status.as_str().to_string(),
        };
        let envelope: ResponseEnvelope<AppointmentDto> = self
            .post_json("appointments/appt/updateStatus", session, &body)
            .await?;
        envelope.response.into_domain()
    }

    pub async fn cancel_appointment(
        &self,
        session: &SessionContext,
        id: &str,
        remarks: &str,
    ) -> Result<Appointment, BackendError> {
        let body = CancelBody {
            id: id.to_string(),
            org_id: session.org_id.clone(),
            cancel_remarks: remarks.to_string(),
        };
        let envelope: ResponseEnvelope<AppointmentDto> = self
            .post_json("appointments/appt/cancelAppointment", session, &body)
            .await?;
        envelope.response.into_domain()
    }

    // ═══════════════════════════════════════════════════════════
    // Transport helpers
    // ═══════════════════════════════════════════════════════════

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: &SessionContext,
        query: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        debug!(path, "GET backend");
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.token)
            .query(&[("orgId", session.org_id.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        self.decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        session: &SessionContext,
        body: &B,
    ) -> Result<T, BackendError> {
        debug!(path, "POST backend");
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.token)
            .query(&[("orgId", session.org_id.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn send_error(&self, error: reqwest::Error) -> BackendError {
        if error.is_connect() {
            BackendError::Connection(self.base_url.clone())
        } else if error.is_timeout() {
            BackendError::Timeout(self.timeout_secs)
        } else {
            BackendError::Http(error.to_string())
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
