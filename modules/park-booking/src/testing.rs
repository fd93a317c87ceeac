// Test doubles for the page controllers.
//
// Two mocks matching the two trait seams:
// - MockApi (ReservationApi): stateful in-memory reservation server
// - RecordingHost (PageHost): records alerts, confirms and navigations
//
// Plus `reservation()` for building stored rows.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use park_api_client::{
    Acknowledgement, ApiError, CreatedReservation, Credentials, Park, ParkId, ParkMutation,
    Reservation, ReservationApi, ReservationId, ReservationInput, ReservationStatus, StatusChange,
};

use crate::host::PageHost;

const CREATED_AT: &str = "2024-05-20 10:00:00";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A stored reservation with plausible defaults.
pub fn reservation(id: ReservationId, park_name: &str, status: ReservationStatus) -> Reservation {
    Reservation {
        id,
        organization_name: format!("団体{id}"),
        park_name: Some(park_name.to_string()),
        start_datetime: "2024-06-01T09:00".to_string(),
        end_datetime: "2024-06-01T11:00".to_string(),
        purpose: "散歩".to_string(),
        grade: None,
        number_of_people: 10,
        contact_info: "03-0000-0000".to_string(),
        is_exclusive: false,
        status,
        created_at: Some(CREATED_AT.to_string()),
        updated_at: Some(CREATED_AT.to_string()),
    }
}

// ---------------------------------------------------------------------------
// MockApi
// ---------------------------------------------------------------------------

/// A scripted failure returned by every later call to one method.
#[derive(Debug, Clone)]
pub enum Failure {
    Network,
    Rejected {
        status: u16,
        message: Option<String>,
        error: Option<String>,
    },
    Unauthorized {
        redirect_url: Option<String>,
    },
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Failure::Network => ApiError::Network("connection refused".to_string()),
            Failure::Rejected {
                status,
                message,
                error,
            } => ApiError::Rejected {
                status: *status,
                message: message.clone(),
                error: error.clone(),
            },
            Failure::Unauthorized { redirect_url } => ApiError::Unauthorized {
                redirect_url: redirect_url.clone(),
                message: None,
                error: Some("ログインが必要です。".to_string()),
            },
        }
    }
}

struct MockApiInner {
    parks: Vec<Park>,
    reservations: Vec<Reservation>,
    next_park_id: ParkId,
    next_reservation_id: ReservationId,
    admin: Option<(String, String)>,
    failures: HashMap<&'static str, Failure>,
    calls: Vec<&'static str>,
}

/// Stateful in-memory API. Answers the way the reservation server does:
/// unknown park names and null numbers are refused, duplicate park names
/// conflict, and a park still named by a reservation cannot be deleted.
/// Thread-safe via interior Mutex.
pub struct MockApi {
    inner: Mutex<MockApiInner>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockApiInner {
                parks: Vec::new(),
                reservations: Vec::new(),
                next_park_id: 1,
                next_reservation_id: 1,
                admin: None,
                failures: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_park(self, name: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.next_park_id;
            inner.next_park_id += 1;
            inner.parks.push(Park {
                id,
                name: name.to_string(),
            });
        }
        self
    }

    pub fn with_reservation(self, reservation: Reservation) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.next_reservation_id = inner.next_reservation_id.max(reservation.id + 1);
            inner.reservations.push(reservation);
        }
        self
    }

    pub fn with_admin(self, username: &str, password: &str) -> Self {
        self.inner.lock().unwrap().admin = Some((username.to_string(), password.to_string()));
        self
    }

    /// Make every later call to `method` fail. Method names are the
    /// `ReservationApi` method names.
    pub fn fail_on(&self, method: &'static str, failure: Failure) {
        self.inner.lock().unwrap().failures.insert(method, failure);
    }

    pub fn clear_failures(&self) {
        self.inner.lock().unwrap().failures.clear();
    }

    /// Method names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == method)
            .count()
    }

    pub fn parks(&self) -> Vec<Park> {
        self.inner.lock().unwrap().parks.clone()
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.inner.lock().unwrap().reservations.clone()
    }

    pub fn stored(&self, id: ReservationId) -> Option<Reservation> {
        self.inner
            .lock()
            .unwrap()
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Record the call and return the scripted failure, if any.
    fn enter(&self, method: &'static str) -> Result<MutexGuard<'_, MockApiInner>, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(method);
        if let Some(failure) = inner.failures.get(method) {
            return Err(failure.to_error());
        }
        Ok(inner)
    }
}

/// Refusal carrying `{success: false, message}`.
fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        message: Some(message.to_string()),
        error: None,
    }
}

/// Refusal carrying `{error}`, as the plain reservation endpoints answer.
fn failed(status: u16, error: &str) -> ApiError {
    ApiError::Rejected {
        status,
        message: None,
        error: Some(error.to_string()),
    }
}

fn check_input(parks: &[Park], input: &ReservationInput) -> Result<(i64, i64), ApiError> {
    let required = [
        ("park_name", input.park_name.as_str()),
        ("start_datetime", input.start_datetime.as_str()),
        ("end_datetime", input.end_datetime.as_str()),
        ("purpose", input.purpose.as_str()),
        ("organization_name", input.organization_name.as_str()),
        ("contact_info", input.contact_info.as_str()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
        return Err(failed(400, &format!("Missing or empty field: {field}")));
    }
    let Some(people) = input.number_of_people else {
        return Err(failed(400, "Missing or empty field: number_of_people"));
    };
    let Some(exclusive) = input.is_exclusive else {
        return Err(failed(400, "Missing or empty field: is_exclusive"));
    };
    if !parks.iter().any(|p| p.name == input.park_name) {
        return Err(rejected(400, "指定された公園名は存在しません"));
    }
    Ok((people, exclusive))
}

#[async_trait]
impl ReservationApi for MockApi {
    async fn login(&self, credentials: &Credentials) -> park_api_client::Result<Acknowledgement> {
        let inner = self.enter("login")?;
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(rejected(400, "ユーザー名とパスワードを入力してください"));
        }
        match &inner.admin {
            Some((user, pass)) if *user == credentials.username && *pass == credentials.password => {
                Ok(Acknowledgement {
                    message: Some("ログイン成功".to_string()),
                })
            }
            _ => Err(ApiError::Unauthorized {
                redirect_url: None,
                message: Some("ユーザー名またはパスワードが間違っています".to_string()),
                error: None,
            }),
        }
    }

    async fn logout(&self) -> park_api_client::Result<Acknowledgement> {
        self.enter("logout")?;
        Ok(Acknowledgement {
            message: Some("ログアウトしました".to_string()),
        })
    }

    async fn list_reservations(&self) -> park_api_client::Result<Vec<Reservation>> {
        let inner = self.enter("list_reservations")?;
        Ok(inner.reservations.clone())
    }

    async fn get_reservation(&self, id: ReservationId) -> park_api_client::Result<Reservation> {
        let inner = self.enter("get_reservation")?;
        inner
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| failed(404, "Reservation not found"))
    }

    async fn create_reservation(
        &self,
        input: &ReservationInput,
    ) -> park_api_client::Result<CreatedReservation> {
        let mut inner = self.enter("create_reservation")?;
        let (people, exclusive) = check_input(&inner.parks, input)?;

        let id = inner.next_reservation_id;
        inner.next_reservation_id += 1;
        let stored = Reservation {
            id,
            organization_name: input.organization_name.clone(),
            park_name: Some(input.park_name.clone()),
            start_datetime: input.start_datetime.clone(),
            end_datetime: input.end_datetime.clone(),
            purpose: input.purpose.clone(),
            grade: input.grade.clone(),
            number_of_people: people,
            contact_info: input.contact_info.clone(),
            is_exclusive: exclusive != 0,
            status: ReservationStatus::Pending,
            created_at: Some(CREATED_AT.to_string()),
            updated_at: Some(CREATED_AT.to_string()),
        };
        inner.reservations.push(stored.clone());

        Ok(CreatedReservation {
            id: Some(id),
            message: Some("Reservation created successfully".to_string()),
            reservation: Some(stored),
        })
    }

    async fn update_reservation(
        &self,
        id: ReservationId,
        input: &ReservationInput,
    ) -> park_api_client::Result<Acknowledgement> {
        let mut inner = self.enter("update_reservation")?;
        let (people, exclusive) = check_input(&inner.parks, input)?;
        let stored = inner
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| failed(404, "Reservation not found"))?;

        stored.organization_name = input.organization_name.clone();
        stored.park_name = Some(input.park_name.clone());
        stored.start_datetime = input.start_datetime.clone();
        stored.end_datetime = input.end_datetime.clone();
        stored.purpose = input.purpose.clone();
        stored.grade = input.grade.clone();
        stored.number_of_people = people;
        stored.contact_info = input.contact_info.clone();
        stored.is_exclusive = exclusive != 0;
        if let Some(status) = input.status {
            stored.status = status;
        }
        Ok(Acknowledgement::default())
    }

    async fn delete_reservation(&self, id: ReservationId) -> park_api_client::Result<Acknowledgement> {
        let mut inner = self.enter("delete_reservation")?;
        let before = inner.reservations.len();
        inner.reservations.retain(|r| r.id != id);
        if inner.reservations.len() == before {
            return Err(failed(404, "Reservation not found"));
        }
        Ok(Acknowledgement {
            message: Some("Reservation deleted successfully".to_string()),
        })
    }

    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> park_api_client::Result<StatusChange> {
        let mut inner = self.enter("update_status")?;
        let stored = inner
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| rejected(404, "予約が見つかりません"))?;
        stored.status = status;
        Ok(StatusChange {
            message: Some("ステータスを更新しました".to_string()),
            reservation: Some(stored.clone()),
        })
    }

    async fn list_parks(&self) -> park_api_client::Result<Vec<Park>> {
        let inner = self.enter("list_parks")?;
        Ok(inner.parks.clone())
    }

    async fn create_park(&self, name: &str) -> park_api_client::Result<ParkMutation> {
        let mut inner = self.enter("create_park")?;
        let name = name.trim();
        if name.is_empty() {
            return Err(rejected(400, "公園名は必須です"));
        }
        if inner.parks.iter().any(|p| p.name == name) {
            return Err(rejected(409, "同じ名前の公園が既に存在します"));
        }
        let park = Park {
            id: inner.next_park_id,
            name: name.to_string(),
        };
        inner.next_park_id += 1;
        inner.parks.push(park.clone());
        Ok(ParkMutation {
            message: Some("公園を追加しました".to_string()),
            park: Some(park),
        })
    }

    async fn rename_park(&self, id: ParkId, name: &str) -> park_api_client::Result<ParkMutation> {
        let mut inner = self.enter("rename_park")?;
        let name = name.trim();
        if name.is_empty() {
            return Err(rejected(400, "公園名は必須です"));
        }
        if inner.parks.iter().any(|p| p.name == name && p.id != id) {
            return Err(rejected(409, "同じ名前の公園が既に存在します"));
        }
        let Some(park) = inner.parks.iter_mut().find(|p| p.id == id) else {
            return Err(rejected(404, "指定された公園が見つかりません"));
        };
        let old = std::mem::replace(&mut park.name, name.to_string());
        let park = park.clone();

        // Reservations reference the park row, so they follow the rename.
        for r in inner.reservations.iter_mut() {
            if r.park_name.as_deref() == Some(old.as_str()) {
                r.park_name = Some(park.name.clone());
            }
        }
        Ok(ParkMutation {
            message: Some("公園情報を更新しました".to_string()),
            park: Some(park),
        })
    }

    async fn delete_park(&self, id: ParkId) -> park_api_client::Result<Acknowledgement> {
        let mut inner = self.enter("delete_park")?;
        let Some(index) = inner.parks.iter().position(|p| p.id == id) else {
            return Err(rejected(404, "指定された公園が見つかりません"));
        };
        let name = inner.parks[index].name.clone();
        if inner
            .reservations
            .iter()
            .any(|r| r.park_name.as_deref() == Some(name.as_str()))
        {
            return Err(rejected(
                409,
                "この公園は予約で使用されているため削除できません。先に該当する予約を削除または変更してください。",
            ));
        }
        inner.parks.remove(index);
        Ok(Acknowledgement {
            message: Some("公園を削除しました".to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingHost
// ---------------------------------------------------------------------------

#[derive(Default)]
struct HostLog {
    alerts: Vec<String>,
    confirms: Vec<String>,
    navigations: Vec<String>,
    refetches: usize,
}

/// Page host that records every side effect. Confirms are answered with a
/// fixed reply, `true` unless built with `declining()`.
pub struct RecordingHost {
    log: Mutex<HostLog>,
    answer: bool,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            log: Mutex::new(HostLog::default()),
            answer: true,
        }
    }

    pub fn declining() -> Self {
        Self {
            answer: false,
            ..Self::new()
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.log.lock().unwrap().alerts.clone()
    }

    pub fn confirms(&self) -> Vec<String> {
        self.log.lock().unwrap().confirms.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log.lock().unwrap().navigations.clone()
    }

    pub fn last_navigation(&self) -> Option<String> {
        self.log.lock().unwrap().navigations.last().cloned()
    }

    pub fn refetches(&self) -> usize {
        self.log.lock().unwrap().refetches
    }
}

impl PageHost for RecordingHost {
    fn alert(&self, message: &str) {
        self.log.lock().unwrap().alerts.push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.log.lock().unwrap().confirms.push(message.to_string());
        self.answer
    }

    fn navigate(&self, url: &str) {
        self.log.lock().unwrap().navigations.push(url.to_string());
    }

    fn refetch_calendar(&self) {
        self.log.lock().unwrap().refetches += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_failure_is_logged_and_returned() {
        let api = MockApi::new().with_park("中央公園");
        api.fail_on("list_parks", Failure::Network);
        assert!(api.list_parks().await.unwrap_err().is_transport());
        api.clear_failures();
        assert_eq!(api.list_parks().await.unwrap().len(), 1);
        assert_eq!(api.calls(), vec!["list_parks", "list_parks"]);
    }

    #[tokio::test]
    async fn referenced_park_cannot_be_deleted() {
        let api = MockApi::new()
            .with_park("中央公園")
            .with_reservation(reservation(1, "中央公園", ReservationStatus::Pending));
        let err = api.delete_park(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 409, .. }));
        assert_eq!(api.parks().len(), 1);
    }
}
