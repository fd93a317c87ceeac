use std::sync::Arc;

use tracing::{info, warn};

use park_api_client::{ApiError, ReservationApi, ReservationId};

use crate::config::Config;
use crate::form::{needs_grade, FormMode, ReservationForm};
use crate::host::PageHost;
use crate::presentation::{MessageArea, PARK_LIST_LOAD_FAILED};

use super::follow_login_redirect;

const UPDATED: &str = "予約を更新しました。";
const CREATED: &str = "予約を作成しました。";
const CREATED_WITH_ID: &str = "予約が正常に作成されました。ダッシュボードに戻ります。";
const SAVE_FAILED: &str = "保存に失敗しました。";
const SAVE_ERROR: &str = "保存処理中にエラーが発生しました。";

/// Admin reservation edit page, or the create page when there is no id.
///
/// Unlike the public page there is no review step: submit sends at once.
pub struct ReservationEditor {
    api: Arc<dyn ReservationApi>,
    host: Arc<dyn PageHost>,
    config: Config,
    reservation_id: Option<ReservationId>,
    pub form: ReservationForm,
    message: MessageArea,
}

impl ReservationEditor {
    pub fn new(
        api: Arc<dyn ReservationApi>,
        host: Arc<dyn PageHost>,
        config: Config,
        reservation_id: Option<ReservationId>,
    ) -> Self {
        Self {
            api,
            host,
            config,
            reservation_id,
            form: ReservationForm::default(),
            message: MessageArea::default(),
        }
    }

    pub fn reservation_id(&self) -> Option<ReservationId> {
        self.reservation_id
    }

    pub fn message(&self) -> &MessageArea {
        &self.message
    }

    /// Populate the park dropdown, then back-fill from the stored
    /// reservation when editing. The dropdown must be filled first so the
    /// stored park name can be matched against it.
    pub async fn load(&mut self) {
        if let Err(e) = self.form.park.load(self.api.as_ref()).await {
            warn!(error = %e, "Failed to load parks for dropdown");
            self.message.error(PARK_LIST_LOAD_FAILED);
        }

        let Some(id) = self.reservation_id else {
            return;
        };

        match self.api.get_reservation(id).await {
            Ok(reservation) => self.form.fill_from(&reservation),
            Err(e) if follow_login_redirect(self.host.as_ref(), &e) => {}
            Err(e) => {
                warn!(error = %e, id, "Error loading reservation");
                self.message
                    .error(format!("予約情報の読み込みに失敗しました: {}", load_reason(&e)));
            }
        }
    }

    pub fn select_park(&mut self, value: &str) {
        self.form.park.select(value);
    }

    /// Purpose edits only toggle the grade field. A grade already on the
    /// reservation is kept and still sent.
    pub fn input_purpose(&mut self, text: &str) {
        self.form.purpose = text.to_string();
        self.form.grade_visible = needs_grade(text);
    }

    /// Save the form: update when editing, create otherwise.
    pub async fn submit(&mut self) {
        self.message.clear();
        let input = match self.form.to_input(FormMode::Admin) {
            Ok(input) => input,
            Err(e) => {
                self.message.error(e.to_string());
                return;
            }
        };

        let outcome = match self.reservation_id {
            Some(id) => self
                .api
                .update_reservation(id, &input)
                .await
                .map(|_| (None, UPDATED.to_string())),
            None => self.api.create_reservation(&input).await.map(|created| {
                (
                    created.id,
                    created.message.unwrap_or_else(|| CREATED.to_string()),
                )
            }),
        };

        match outcome {
            Ok((Some(id), message)) => {
                info!(id, "Reservation created from admin console");
                self.message.success(message);
                self.host.alert(CREATED_WITH_ID);
                self.host.navigate(&self.config.dashboard_path);
            }
            Ok((None, message)) => {
                info!(id = ?self.reservation_id, "Reservation saved");
                self.message.success(message);
                tokio::time::sleep(self.config.redirect_delay).await;
                self.host.navigate(&self.config.dashboard_path);
            }
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Error saving reservation");
                self.message.error(SAVE_ERROR);
            }
            Err(e) => self.message.error(e.server_error().unwrap_or(SAVE_FAILED)),
        }
    }
}

fn load_reason(err: &ApiError) -> String {
    match err.server_error() {
        Some(message) => message.to_string(),
        None => err.to_string(),
    }
}
