// Trait seam over the reservation REST surface.
//
// Page controllers depend on `ReservationApi` rather than on
// `ParkApiClient` so they can run against the in-memory mock in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Acknowledgement, CreatedReservation, Credentials, Park, ParkId, ParkMutation, Reservation,
    ReservationId, ReservationInput, ReservationStatus, StatusChange,
};

#[async_trait]
pub trait ReservationApi: Send + Sync {
    /// `POST /api/admin/login`
    async fn login(&self, credentials: &Credentials) -> Result<Acknowledgement>;

    /// `POST /api/admin/logout`
    async fn logout(&self) -> Result<Acknowledgement>;

    /// `GET /api/reservations`
    async fn list_reservations(&self) -> Result<Vec<Reservation>>;

    /// `GET /api/reservations/:id`
    async fn get_reservation(&self, id: ReservationId) -> Result<Reservation>;

    /// `POST /api/reservations`
    async fn create_reservation(&self, input: &ReservationInput) -> Result<CreatedReservation>;

    /// `PUT /api/reservations/:id`
    async fn update_reservation(
        &self,
        id: ReservationId,
        input: &ReservationInput,
    ) -> Result<Acknowledgement>;

    /// `DELETE /api/reservations/:id`
    async fn delete_reservation(&self, id: ReservationId) -> Result<Acknowledgement>;

    /// `POST /api/admin/reservations/:id/status`
    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<StatusChange>;

    /// `GET /api/parks`
    async fn list_parks(&self) -> Result<Vec<Park>>;

    /// `POST /api/admin/parks`
    async fn create_park(&self, name: &str) -> Result<ParkMutation>;

    /// `PUT /api/admin/parks/:id`
    async fn rename_park(&self, id: ParkId, name: &str) -> Result<ParkMutation>;

    /// `DELETE /api/admin/parks/:id`
    async fn delete_park(&self, id: ParkId) -> Result<Acknowledgement>;
}
