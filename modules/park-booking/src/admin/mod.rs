//! Admin console pages: login, the dashboard with its reservations and
//! parks tables, and the reservation editor.

mod dashboard;
mod editor;
mod login;
mod parks;
mod reservations;

pub use dashboard::Dashboard;
pub use editor::ReservationEditor;
pub use login::{next_target, LoginPage};
pub use parks::{ParkEditModal, ParksPanel};
pub use reservations::{actions_for, edit_path, ReservationRow, ReservationsTable, RowAction};

use std::sync::Arc;

use park_api_client::{ApiError, ReservationApi, ReservationId};

use crate::config::Config;
use crate::host::PageHost;

/// Builds admin pages that share one API client, host and config.
#[derive(Clone)]
pub struct AdminConsole {
    api: Arc<dyn ReservationApi>,
    host: Arc<dyn PageHost>,
    config: Config,
}

impl AdminConsole {
    pub fn new(api: Arc<dyn ReservationApi>, host: Arc<dyn PageHost>, config: Config) -> Self {
        Self { api, host, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn login_page(&self) -> LoginPage {
        LoginPage::new(
            self.api.clone(),
            self.host.clone(),
            self.config.dashboard_path.clone(),
        )
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.api.clone(), self.host.clone(), &self.config)
    }

    /// Edit page for an existing reservation, or the create page for `None`.
    pub fn editor(&self, reservation_id: Option<ReservationId>) -> ReservationEditor {
        ReservationEditor::new(
            self.api.clone(),
            self.host.clone(),
            self.config.clone(),
            reservation_id,
        )
    }
}

/// Send the browser to the login page when the API says the session is
/// gone. Returns whether it did.
pub(crate) fn follow_login_redirect(host: &dyn PageHost, err: &ApiError) -> bool {
    match err {
        ApiError::Unauthorized {
            redirect_url: Some(url),
            ..
        } => {
            host.navigate(url);
            true
        }
        _ => false,
    }
}
