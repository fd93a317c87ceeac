use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use park_api_client::{Park, ParkId, ReservationApi};

use crate::host::PageHost;
use crate::presentation::{load_failure_reason, MessageArea, TableBody};

const NO_PARKS: &str = "登録されている公園はありません。";
const NAME_REQUIRED: &str = "公園名を入力してください。";
const ADD_ERROR: &str = "公園の追加中にエラーが発生しました。";
const NAME_EMPTY: &str = "公園名は空にできません。";
const RENAME_ERROR: &str = "公園情報の更新中にエラーが発生しました。";
const DELETE_ERROR: &str = "公園の削除中にエラーが発生しました。";

/// The inline park editor.
#[derive(Debug, Clone, Default)]
pub struct ParkEditModal {
    visible: bool,
    park_id: Option<ParkId>,
    pub name_input: String,
    message: MessageArea,
}

impl ParkEditModal {
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn park_id(&self) -> Option<ParkId> {
        self.park_id
    }

    pub fn message(&self) -> &MessageArea {
        &self.message
    }
}

/// Parks table, add form and edit modal on the admin dashboard.
pub struct ParksPanel {
    api: Arc<dyn ReservationApi>,
    host: Arc<dyn PageHost>,
    modal_close_delay: Duration,
    body: TableBody<Park>,
    pub new_park_name: String,
    message: MessageArea,
    modal: ParkEditModal,
}

impl ParksPanel {
    pub fn new(
        api: Arc<dyn ReservationApi>,
        host: Arc<dyn PageHost>,
        modal_close_delay: Duration,
    ) -> Self {
        Self {
            api,
            host,
            modal_close_delay,
            body: TableBody::default(),
            new_park_name: String::new(),
            message: MessageArea::default(),
            modal: ParkEditModal::default(),
        }
    }

    pub fn body(&self) -> &TableBody<Park> {
        &self.body
    }

    pub fn message(&self) -> &MessageArea {
        &self.message
    }

    pub fn modal(&self) -> &ParkEditModal {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ParkEditModal {
        &mut self.modal
    }

    pub async fn load(&mut self) {
        match self.api.list_parks().await {
            Ok(parks) if parks.is_empty() => {
                self.body = TableBody::Notice(NO_PARKS.to_string());
            }
            Ok(parks) => self.body = TableBody::Rows(parks),
            Err(e) => {
                warn!(error = %e, "Error loading parks");
                self.body = TableBody::Notice(format!(
                    "公園リストの読み込み中にエラーが発生しました: {}",
                    load_failure_reason(&e, "parks")
                ));
            }
        }
    }

    /// Add form submit.
    pub async fn add(&mut self) {
        self.message.clear();
        let name = self.new_park_name.trim().to_string();
        if name.is_empty() {
            self.message.error(NAME_REQUIRED);
            return;
        }

        match self.api.create_park(&name).await {
            Ok(created) => {
                info!(name = %name, "Park added");
                self.message.success(created.message.unwrap_or_default());
                self.new_park_name.clear();
                self.load().await;
            }
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Error adding park");
                self.message.error(ADD_ERROR);
            }
            Err(e) => self
                .message
                .error(e.server_message().unwrap_or_default().to_string()),
        }
    }

    pub fn open_edit(&mut self, park: &Park) {
        self.modal = ParkEditModal {
            visible: true,
            park_id: Some(park.id),
            name_input: park.name.clone(),
            message: MessageArea::default(),
        };
    }

    pub fn close_edit(&mut self) {
        self.modal.visible = false;
    }

    /// Modal save. On success the message stays up for the close delay, then
    /// the modal closes and the table reloads.
    pub async fn save_edit(&mut self) {
        let Some(id) = self.modal.park_id else {
            return;
        };
        self.modal.message.clear();
        let name = self.modal.name_input.trim().to_string();
        if name.is_empty() {
            self.modal.message.error(NAME_EMPTY);
            return;
        }

        match self.api.rename_park(id, &name).await {
            Ok(updated) => {
                info!(id, name = %name, "Park renamed");
                self.modal
                    .message
                    .success(updated.message.unwrap_or_default());
                tokio::time::sleep(self.modal_close_delay).await;
                self.close_edit();
                self.load().await;
            }
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Error updating park");
                self.modal.message.error(RENAME_ERROR);
            }
            Err(e) => self
                .modal
                .message
                .error(e.server_message().unwrap_or_default().to_string()),
        }
    }

    /// Confirm, then delete. A refused delete leaves the table as it was.
    pub async fn delete(&mut self, park: &Park) {
        let question = format!(
            "公園「{}」(ID: {}) を本当に削除しますか？この公園に関連する予約がある場合は削除できません。",
            park.name, park.id
        );
        if !self.host.confirm(&question) {
            return;
        }
        self.message.clear();

        match self.api.delete_park(park.id).await {
            Ok(ack) => {
                info!(id = park.id, "Park deleted");
                self.message.success(ack.message.unwrap_or_default());
                self.load().await;
            }
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Error deleting park");
                self.message.error(DELETE_ERROR);
            }
            Err(e) => self
                .message
                .error(e.server_message().unwrap_or_default().to_string()),
        }
    }
}
