use std::sync::Arc;

use tracing::warn;

use park_api_client::{ApiError, Reservation, ReservationApi, ReservationId, ReservationStatus};

use crate::host::PageHost;
use crate::presentation::{format_admin_datetime, load_failure_reason, TableBody};

const NO_RESERVATIONS: &str = "現在、予約はありません。";
const STATUS_FAILED: &str = "ステータスの更新に失敗しました。";
const STATUS_ERROR: &str = "ステータス更新処理中にエラーが発生しました。";
const DELETED: &str = "予約を削除しました。";
const DELETE_FAILED: &str = "予約の削除に失敗しました。";
const DELETE_ERROR: &str = "予約削除処理中にエラーが発生しました。";

/// A button in a reservation row's action cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Approve,
    Reject,
    /// Cancelled at the user's request.
    CancelByUser,
    /// Cancelled for the administration's reasons.
    CancelByAdmin,
    Edit,
    Delete,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Approve => "承認",
            RowAction::Reject => "却下",
            RowAction::CancelByUser => "利用者都合C",
            RowAction::CancelByAdmin => "管理者都合C",
            RowAction::Edit => "編集",
            RowAction::Delete => "削除",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            RowAction::Approve => "approve-button",
            RowAction::Reject => "reject-button",
            RowAction::CancelByUser => "cancel-button",
            RowAction::CancelByAdmin => "admin-cancel-button",
            RowAction::Edit => "edit-button",
            RowAction::Delete => "delete-button",
        }
    }

    /// Status the action moves the reservation to, for status actions.
    pub fn target_status(&self) -> Option<ReservationStatus> {
        match self {
            RowAction::Approve => Some(ReservationStatus::Approved),
            RowAction::Reject => Some(ReservationStatus::Rejected),
            RowAction::CancelByUser => Some(ReservationStatus::Cancelled),
            RowAction::CancelByAdmin => Some(ReservationStatus::CancelledByAdmin),
            RowAction::Edit | RowAction::Delete => None,
        }
    }
}

/// Buttons offered for a reservation in the given status. Edit and delete
/// are always present.
pub fn actions_for(status: ReservationStatus) -> Vec<RowAction> {
    let mut actions = match status {
        ReservationStatus::Pending => vec![RowAction::Approve, RowAction::Reject],
        ReservationStatus::Approved => vec![RowAction::CancelByUser, RowAction::CancelByAdmin],
        _ => Vec::new(),
    };
    actions.extend([RowAction::Edit, RowAction::Delete]);
    actions
}

pub fn edit_path(id: ReservationId) -> String {
    format!("/admin/reservations/{id}/edit")
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRow {
    pub id: ReservationId,
    /// id, organization, park, start, end, purpose, people, contact, status, created.
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
}

impl From<&Reservation> for ReservationRow {
    fn from(r: &Reservation) -> Self {
        let park = r
            .park_name
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "未設定".to_string());
        Self {
            id: r.id,
            cells: vec![
                r.id.to_string(),
                r.organization_name.clone(),
                park,
                format_admin_datetime(&r.start_datetime),
                format_admin_datetime(&r.end_datetime),
                r.purpose.clone(),
                r.number_of_people.to_string(),
                r.contact_info.clone(),
                r.status.to_string(),
                format_admin_datetime(r.created_at.as_deref().unwrap_or("")),
            ],
            actions: actions_for(r.status),
        }
    }
}

/// Reservations table on the admin dashboard.
pub struct ReservationsTable {
    api: Arc<dyn ReservationApi>,
    host: Arc<dyn PageHost>,
    body: TableBody<ReservationRow>,
}

impl ReservationsTable {
    pub fn new(api: Arc<dyn ReservationApi>, host: Arc<dyn PageHost>) -> Self {
        Self {
            api,
            host,
            body: TableBody::default(),
        }
    }

    pub fn body(&self) -> &TableBody<ReservationRow> {
        &self.body
    }

    /// Fetch every reservation and replace the table body. An expired
    /// session leaves the body as it was, following the login redirect when
    /// the server sends one.
    pub async fn load(&mut self) {
        match self.api.list_reservations().await {
            Ok(reservations) if reservations.is_empty() => {
                self.body = TableBody::Notice(NO_RESERVATIONS.to_string());
            }
            Ok(reservations) => {
                self.body = TableBody::Rows(reservations.iter().map(ReservationRow::from).collect());
            }
            Err(ApiError::Unauthorized { redirect_url, .. }) => {
                if let Some(url) = redirect_url {
                    self.host.navigate(&url);
                }
            }
            Err(e) => {
                warn!(error = %e, "Error loading reservations");
                self.body = TableBody::Notice(format!(
                    "予約の読み込み中にエラーが発生しました: {}",
                    load_failure_reason(&e, "reservations")
                ));
            }
        }
    }

    /// Run a row button.
    pub async fn activate(&mut self, id: ReservationId, action: RowAction) {
        match (action, action.target_status()) {
            (_, Some(status)) => self.update_status(id, status).await,
            (RowAction::Edit, None) => self.host.navigate(&edit_path(id)),
            (_, None) => self.delete(id).await,
        }
    }

    /// Confirm, then ask the API to move the reservation to `status`.
    pub async fn update_status(&mut self, id: ReservationId, status: ReservationStatus) {
        let question = format!("予約ID {id} のステータスを「{status}」に変更しますか？");
        if !self.host.confirm(&question) {
            return;
        }

        match self.api.update_status(id, status).await {
            Ok(_) => {
                self.host
                    .alert(&format!("予約ID {id} のステータスを更新しました。"));
                self.load().await;
            }
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Error updating status");
                self.host.alert(STATUS_ERROR);
            }
            Err(e) => self.host.alert(e.server_message().unwrap_or(STATUS_FAILED)),
        }
    }

    /// Confirm, then delete the reservation.
    pub async fn delete(&mut self, id: ReservationId) {
        let question = format!("予約ID {id} を本当に削除しますか？この操作は元に戻せません。");
        if !self.host.confirm(&question) {
            return;
        }

        match self.api.delete_reservation(id).await {
            Ok(ack) => {
                self.host.alert(ack.message.as_deref().unwrap_or(DELETED));
                self.load().await;
            }
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Error deleting reservation");
                self.host.alert(DELETE_ERROR);
            }
            Err(e) => self.host.alert(e.server_error().unwrap_or(DELETE_FAILED)),
        }
    }
}
