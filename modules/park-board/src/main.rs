use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use park_api_client::ParkApiClient;
use park_booking::admin::AdminConsole;
use park_booking::calendar::{EventSource, ReservationEventSource};
use park_booking::presentation::TableBody;
use park_booking::{Config, PageHost};

/// Host for a terminal: alerts go to stderr, navigation is only logged and
/// every confirm is declined so nothing is ever changed.
struct TerminalHost;

impl PageHost for TerminalHost {
    fn alert(&self, message: &str) {
        eprintln!("[alert] {message}");
    }

    fn confirm(&self, message: &str) -> bool {
        eprintln!("[confirm: declined] {message}");
        false
    }

    fn navigate(&self, url: &str) {
        info!(url, "Page asked to navigate");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("park=info".parse()?))
        .init();

    info!("Park board starting...");

    let config = Config::from_env()?;
    config.log_summary();

    let api = Arc::new(ParkApiClient::with_timeout(
        &config.api_base_url,
        config.request_timeout,
    )?);
    let host = Arc::new(TerminalHost);
    let console = AdminConsole::new(api.clone(), host.clone(), config);

    // Optional section filter: `park-board calendar` or `park-board admin`.
    let section = std::env::args().nth(1);
    let wants = |name: &str| section.as_deref().map_or(true, |s| s == name);

    if wants("calendar") {
        print_calendar(api.clone()).await?;
    }

    if wants("admin") {
        if let (Ok(username), Ok(password)) = (
            std::env::var("PARK_ADMIN_USERNAME"),
            std::env::var("PARK_ADMIN_PASSWORD"),
        ) {
            let mut login = console.login_page();
            login.username = username;
            login.password = password;
            login.submit(&console.config().login_path).await;
            info!(reply = %login.message().text(), "Login attempted");
        } else {
            warn!("PARK_ADMIN_USERNAME/PARK_ADMIN_PASSWORD not set, admin tables may be refused");
        }
        print_admin_tables(&console).await;
    }

    Ok(())
}

async fn print_calendar(api: Arc<ParkApiClient>) -> Result<()> {
    let source = ReservationEventSource::new(api);
    let events = source.events().await?;
    info!(count = events.len(), "Fetched calendar events");
    println!("=== Calendar ===");
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

async fn print_admin_tables(console: &AdminConsole) {
    let mut dashboard = console.dashboard();
    dashboard.load().await;

    println!("\n=== Reservations ===");
    match dashboard.reservations.body() {
        TableBody::Rows(rows) => {
            for row in rows {
                let actions: Vec<&str> = row.actions.iter().map(|a| a.label()).collect();
                println!("{}  [{}]", row.cells.join(" | "), actions.join(" "));
            }
        }
        TableBody::Notice(text) => println!("{text}"),
    }

    println!("\n=== Parks ===");
    match dashboard.parks.body() {
        TableBody::Rows(parks) => {
            for park in parks {
                println!("{:>4}  {}", park.id, park.name);
            }
        }
        TableBody::Notice(text) => println!("{text}"),
    }
}
