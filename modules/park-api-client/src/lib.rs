pub mod error;
pub mod traits;
pub mod types;

pub use error::{ApiError, Result};
pub use traits::ReservationApi;
pub use types::{
    Acknowledgement, CreatedReservation, Credentials, Park, ParkId, ParkMutation, Reservation,
    ReservationId, ReservationInput, ReservationStatus, StatusChange,
};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use types::{Envelope, ParkName, StatusUpdate};

/// Makes the API answer auth failures with a JSON body instead of a redirect.
const REQUESTED_WITH: &str = "XMLHttpRequest";

/// How a 2xx answer is judged before its payload is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acceptance {
    /// Accepted unless the body says `success: false`.
    Lenient,
    /// Accepted only when the body says `success: true`.
    Flagged,
}

pub struct ParkApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ParkApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Build a client with an optional per-request timeout. The cookie store
    /// keeps the admin session between calls.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static(REQUESTED_WITH));

        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
        acceptance: Acceptance,
    ) -> Result<T> {
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(path, status = status.as_u16(), "API response");

        let body = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => Some(value),
                Err(e) if status.is_success() => return Err(e.into()),
                // Non-JSON error pages are reported by status alone.
                Err(_) => None,
            }
        };

        decode(status, body, acceptance)
    }
}

/// Judge an answer and decode its payload.
fn decode<T: DeserializeOwned>(
    status: StatusCode,
    body: Option<Value>,
    acceptance: Acceptance,
) -> Result<T> {
    let envelope = match body.as_ref() {
        Some(value) if value.is_object() => Envelope::deserialize(value)?,
        _ => Envelope::default(),
    };

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized {
            redirect_url: envelope.redirect_url,
            message: envelope.message,
            error: envelope.error,
        });
    }

    let accepted = status.is_success()
        && match acceptance {
            Acceptance::Lenient => envelope.success != Some(false),
            Acceptance::Flagged => envelope.success == Some(true),
        };
    if !accepted {
        tracing::debug!(status = status.as_u16(), "API rejected request");
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message: envelope.message,
            error: envelope.error,
        });
    }

    let payload = body.unwrap_or_else(|| Value::Object(Default::default()));
    Ok(serde_json::from_value(payload)?)
}

#[async_trait]
impl ReservationApi for ParkApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<Acknowledgement> {
        let path = "/api/admin/login";
        let request = self.client.post(self.url(path)).json(credentials);
        self.send(request, path, Acceptance::Flagged).await
    }

    async fn logout(&self) -> Result<Acknowledgement> {
        let path = "/api/admin/logout";
        let request = self.client.post(self.url(path));
        self.send(request, path, Acceptance::Flagged).await
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        let path = "/api/reservations";
        let request = self.client.get(self.url(path));
        self.send(request, path, Acceptance::Lenient).await
    }

    async fn get_reservation(&self, id: ReservationId) -> Result<Reservation> {
        let path = format!("/api/reservations/{id}");
        let request = self.client.get(self.url(&path));
        self.send(request, &path, Acceptance::Lenient).await
    }

    async fn create_reservation(&self, input: &ReservationInput) -> Result<CreatedReservation> {
        let path = "/api/reservations";
        let request = self.client.post(self.url(path)).json(input);
        let created: CreatedReservation = self.send(request, path, Acceptance::Lenient).await?;
        tracing::info!(id = ?created.id, park = %input.park_name, "Reservation created");
        Ok(created)
    }

    async fn update_reservation(
        &self,
        id: ReservationId,
        input: &ReservationInput,
    ) -> Result<Acknowledgement> {
        let path = format!("/api/reservations/{id}");
        let request = self.client.put(self.url(&path)).json(input);
        let ack: Acknowledgement = self.send(request, &path, Acceptance::Lenient).await?;
        tracing::info!(id, "Reservation updated");
        Ok(ack)
    }

    async fn delete_reservation(&self, id: ReservationId) -> Result<Acknowledgement> {
        let path = format!("/api/reservations/{id}");
        let request = self.client.delete(self.url(&path));
        let ack: Acknowledgement = self.send(request, &path, Acceptance::Lenient).await?;
        tracing::info!(id, "Reservation deleted");
        Ok(ack)
    }

    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<StatusChange> {
        let path = format!("/api/admin/reservations/{id}/status");
        let request = self
            .client
            .post(self.url(&path))
            .json(&StatusUpdate { status });
        let change: StatusChange = self.send(request, &path, Acceptance::Flagged).await?;
        tracing::info!(id, %status, "Reservation status changed");
        Ok(change)
    }

    async fn list_parks(&self) -> Result<Vec<Park>> {
        let path = "/api/parks";
        let request = self.client.get(self.url(path));
        self.send(request, path, Acceptance::Lenient).await
    }

    async fn create_park(&self, name: &str) -> Result<ParkMutation> {
        let path = "/api/admin/parks";
        let request = self.client.post(self.url(path)).json(&ParkName { name });
        let mutation: ParkMutation = self.send(request, path, Acceptance::Flagged).await?;
        tracing::info!(name, "Park created");
        Ok(mutation)
    }

    async fn rename_park(&self, id: ParkId, name: &str) -> Result<ParkMutation> {
        let path = format!("/api/admin/parks/{id}");
        let request = self.client.put(self.url(&path)).json(&ParkName { name });
        let mutation: ParkMutation = self.send(request, &path, Acceptance::Flagged).await?;
        tracing::info!(id, name, "Park renamed");
        Ok(mutation)
    }

    async fn delete_park(&self, id: ParkId) -> Result<Acknowledgement> {
        let path = format!("/api/admin/parks/{id}");
        let request = self.client.delete(self.url(&path));
        let ack: Acknowledgement = self.send(request, &path, Acceptance::Flagged).await?;
        tracing::info!(id, "Park deleted");
        Ok(ack)
    }
}
