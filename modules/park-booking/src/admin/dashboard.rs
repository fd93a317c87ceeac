use std::sync::Arc;

use tracing::warn;

use park_api_client::ReservationApi;

use crate::config::Config;
use crate::host::PageHost;

use super::parks::ParksPanel;
use super::reservations::ReservationsTable;

const LOGOUT_FAILED: &str = "ログアウトに失敗しました。";
const LOGOUT_ERROR: &str = "ログアウト処理中にエラーが発生しました。";

/// Admin dashboard: the reservations table, the parks panel and the logout
/// button.
pub struct Dashboard {
    api: Arc<dyn ReservationApi>,
    host: Arc<dyn PageHost>,
    login_path: String,
    pub reservations: ReservationsTable,
    pub parks: ParksPanel,
}

impl Dashboard {
    pub fn new(api: Arc<dyn ReservationApi>, host: Arc<dyn PageHost>, config: &Config) -> Self {
        Self {
            reservations: ReservationsTable::new(api.clone(), host.clone()),
            parks: ParksPanel::new(api.clone(), host.clone(), config.modal_close_delay),
            login_path: config.login_path.clone(),
            api,
            host,
        }
    }

    /// Initial page load: both tables, one after the other.
    pub async fn load(&mut self) {
        self.reservations.load().await;
        self.parks.load().await;
    }

    pub async fn logout(&self) {
        match self.api.logout().await {
            Ok(_) => self.host.navigate(&self.login_path),
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Logout error");
                self.host.alert(LOGOUT_ERROR);
            }
            Err(e) => self.host.alert(e.server_message().unwrap_or(LOGOUT_FAILED)),
        }
    }
}
