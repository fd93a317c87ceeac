use std::sync::Arc;

use tracing::warn;
use url::Url;

use park_api_client::{ApiError, Credentials, ReservationApi};

use crate::host::PageHost;
use crate::presentation::MessageArea;

const LOGIN_ERROR: &str = "ログイン処理中にエラーが発生しました。";

/// Admin login form.
pub struct LoginPage {
    api: Arc<dyn ReservationApi>,
    host: Arc<dyn PageHost>,
    dashboard_path: String,
    pub username: String,
    pub password: String,
    message: MessageArea,
}

impl LoginPage {
    pub fn new(
        api: Arc<dyn ReservationApi>,
        host: Arc<dyn PageHost>,
        dashboard_path: impl Into<String>,
    ) -> Self {
        Self {
            api,
            host,
            dashboard_path: dashboard_path.into(),
            username: String::new(),
            password: String::new(),
            message: MessageArea::default(),
        }
    }

    pub fn message(&self) -> &MessageArea {
        &self.message
    }

    /// Submit the credentials. `location` is the current page URL, whose
    /// `next` parameter names where to go after logging in.
    pub async fn submit(&mut self, location: &str) {
        self.message.clear();
        let credentials = Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        };

        match self.api.login(&credentials).await {
            Ok(ack) => {
                self.message.success(ack.message.unwrap_or_default());
                let target = next_target(location).unwrap_or_else(|| self.dashboard_path.clone());
                self.host.navigate(&target);
            }
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Login error");
                self.message.error(LOGIN_ERROR);
            }
            Err(e) => self.message.error(failure_text(&e)),
        }
    }
}

fn failure_text(err: &ApiError) -> String {
    err.server_message().unwrap_or_default().to_string()
}

/// The non-empty `next` query parameter of a page URL. Accepts absolute URLs
/// and site-relative paths.
pub fn next_target(location: &str) -> Option<String> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(location).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "next")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
