//! Presentation helpers shared by the public booking page and the admin
//! console: message areas, datetime formatting, the park dropdown, and
//! table bodies.

use chrono::{DateTime, NaiveDateTime};

use park_api_client::{ApiError, Park, ReservationApi};

// --- Messages ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

impl MessageKind {
    /// CSS class applied to the message element.
    pub fn css_class(&self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
            MessageKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
}

/// An inline message slot. Holds at most one message; showing a new one
/// replaces the old.
#[derive(Debug, Clone, Default)]
pub struct MessageArea {
    current: Option<Message>,
}

impl MessageArea {
    pub fn show(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.current = Some(Message {
            text: text.into(),
            kind,
        });
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.show(text, MessageKind::Success);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.show(text, MessageKind::Error);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.show(text, MessageKind::Info);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Message> {
        self.current.as_ref()
    }

    pub fn text(&self) -> &str {
        self.current.as_ref().map(|m| m.text.as_str()).unwrap_or("")
    }

    pub fn kind(&self) -> Option<MessageKind> {
        self.current.as_ref().map(|m| m.kind)
    }
}

// --- Datetimes ---

/// Value format of an `<input type="datetime-local">`.
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

const ACCEPTED_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a form value or API timestamp as a wall-clock time.
pub fn parse_local_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// `2024年06月01日 09時00分`, used in the review summary.
pub fn format_display_datetime(value: &str) -> String {
    if value.is_empty() {
        return "未設定".to_string();
    }
    match parse_local_datetime(value) {
        Some(dt) => dt.format("%Y年%m月%d日 %H時%M分").to_string(),
        None => value.to_string(),
    }
}

/// `2024/06/01 09:00`, used in the admin reservations table.
pub fn format_admin_datetime(value: &str) -> String {
    if value.is_empty() {
        return "-".to_string();
    }
    match parse_local_datetime(value) {
        Some(dt) => dt.format("%Y/%m/%d %H:%M").to_string(),
        None => value.to_string(),
    }
}

/// Convert an API timestamp into a `datetime-local` input value. Empty when
/// the timestamp is missing or unreadable.
pub fn to_datetime_local(value: &str) -> String {
    parse_local_datetime(value)
        .map(|dt| dt.format(DATETIME_LOCAL_FORMAT).to_string())
        .unwrap_or_default()
}

// --- Park dropdown ---

/// Value of the synthetic free-text option.
pub const OTHER_PARK: &str = "other";
pub const OTHER_PARK_LABEL: &str = "その他（自由入力）";
pub const PARK_LIST_LOAD_FAILED: &str = "公園リストの読み込みに失敗しました。";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: String,
    pub label: String,
}

/// Park `<select>` plus its companion free-text input.
///
/// An empty selection stands for the placeholder option.
#[derive(Debug, Clone, Default)]
pub struct ParkDropdown {
    options: Vec<DropdownOption>,
    selected: String,
    other_text: String,
    other_visible: bool,
}

impl ParkDropdown {
    /// Fetch the park list and populate the options. On failure the options
    /// are left untouched.
    pub async fn load(&mut self, api: &dyn ReservationApi) -> Result<usize, ApiError> {
        let parks = api.list_parks().await?;
        self.populate(&parks);
        Ok(parks.len())
    }

    /// One option per park, valued and labelled by name, then the free-text option.
    pub fn populate(&mut self, parks: &[Park]) {
        self.options = parks
            .iter()
            .map(|park| DropdownOption {
                value: park.name.clone(),
                label: park.name.clone(),
            })
            .chain(std::iter::once(DropdownOption {
                value: OTHER_PARK.to_string(),
                label: OTHER_PARK_LABEL.to_string(),
            }))
            .collect();
    }

    pub fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn other_text(&self) -> &str {
        &self.other_text
    }

    pub fn other_visible(&self) -> bool {
        self.other_visible
    }

    /// Change the selection. Choosing the free-text option reveals the text
    /// input; anything else hides and clears it. Values that are not among
    /// the options fall back to the placeholder, as a `<select>` does.
    pub fn select(&mut self, value: &str) {
        self.selected = if self.options.iter().any(|o| o.value == value) {
            value.to_string()
        } else {
            String::new()
        };

        if self.selected == OTHER_PARK {
            self.other_visible = true;
        } else {
            self.other_visible = false;
            self.other_text.clear();
        }
    }

    pub fn set_other_text(&mut self, text: impl Into<String>) {
        self.other_text = text.into();
    }

    /// The park name to submit: trimmed free text when the free-text option
    /// is selected, otherwise the selected value. May be empty.
    pub fn resolve_park_name(&self) -> String {
        if self.selected == OTHER_PARK {
            self.other_text.trim().to_string()
        } else {
            self.selected.clone()
        }
    }

    /// Back-fill from a stored park name: select the matching park, or put
    /// the name in the free-text slot when no park matches.
    pub fn select_park_name(&mut self, name: &str) {
        let known = self
            .options
            .iter()
            .any(|o| o.value != OTHER_PARK && o.value == name);

        if known {
            self.select(name);
        } else if !name.is_empty() {
            self.selected = OTHER_PARK.to_string();
            self.other_text = name.to_string();
            self.other_visible = true;
        } else {
            self.other_visible = false;
        }
    }

    /// Form reset: back to the placeholder, free text hidden and cleared.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.other_text.clear();
        self.other_visible = false;
    }
}

// --- Tables ---

/// Contents of a `<tbody>`: either data rows or a single full-width notice.
#[derive(Debug, Clone, PartialEq)]
pub enum TableBody<R> {
    Rows(Vec<R>),
    Notice(String),
}

impl<R> Default for TableBody<R> {
    fn default() -> Self {
        TableBody::Rows(Vec::new())
    }
}

impl<R> TableBody<R> {
    pub fn rows(&self) -> &[R] {
        match self {
            TableBody::Rows(rows) => rows,
            TableBody::Notice(_) => &[],
        }
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            TableBody::Notice(text) => Some(text.as_str()),
            TableBody::Rows(_) => None,
        }
    }
}

/// Human-readable reason for a failed list load.
pub(crate) fn load_failure_reason(err: &ApiError, what: &str) -> String {
    match err {
        ApiError::Rejected { status, .. } => format!("Failed to load {what}: {status}"),
        other => other.to_string(),
    }
}
