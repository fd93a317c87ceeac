//! The reservation form shared by the public booking page and the admin
//! edit page, and its conversion into an API payload.

use thiserror::Error;

use park_api_client::{Reservation, ReservationInput, ReservationStatus};

use crate::presentation::{parse_local_datetime, to_datetime_local, ParkDropdown};

/// Purpose keywords (field trip, off-campus study) that call for a grade.
pub const GRADE_TRIGGERS: [&str; 2] = ["遠足", "校外学習"];

/// Which page the form belongs to. The two pages differ in what they check
/// before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Public booking: checks the period and honours grade visibility.
    Public,
    /// Admin edit/create: sends the status field, no period check.
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("公園名を選択または入力してください。")]
    MissingParkName,

    #[error("開始日時と終了日時を正しく入力してください。終了日時は開始日時より後である必要があります。")]
    InvalidPeriod,

    #[error("ステータスを正しく選択してください。")]
    InvalidStatus,
}

/// Raw form field values, as the browser would hold them.
#[derive(Debug, Clone)]
pub struct ReservationForm {
    pub park: ParkDropdown,
    pub start_datetime: String,
    pub end_datetime: String,
    /// Checked radio value, `"0"` or `"1"`.
    pub is_exclusive: String,
    pub purpose: String,
    pub organization_name: String,
    pub grade: String,
    pub grade_visible: bool,
    pub number_of_people: String,
    pub contact_info: String,
    /// Admin page only.
    pub status: String,
}

impl Default for ReservationForm {
    fn default() -> Self {
        Self {
            park: ParkDropdown::default(),
            start_datetime: String::new(),
            end_datetime: String::new(),
            is_exclusive: "0".to_string(),
            purpose: String::new(),
            organization_name: String::new(),
            grade: String::new(),
            grade_visible: false,
            number_of_people: String::new(),
            contact_info: String::new(),
            status: String::new(),
        }
    }
}

impl ReservationForm {
    /// Typing into the purpose field reveals the grade field for field trips
    /// and hides and clears it otherwise.
    pub fn input_purpose(&mut self, text: impl Into<String>) {
        self.purpose = text.into();
        if needs_grade(&self.purpose) {
            self.grade_visible = true;
        } else {
            self.grade_visible = false;
            self.grade.clear();
        }
    }

    /// Snapshot the form as an API payload, or say why it cannot be sent.
    pub fn to_input(&self, mode: FormMode) -> Result<ReservationInput, ValidationError> {
        let park_name = self.park.resolve_park_name();
        if park_name.is_empty() {
            return Err(ValidationError::MissingParkName);
        }

        let grade = match mode {
            FormMode::Public if !self.grade_visible => None,
            _ if self.grade.is_empty() => None,
            _ => Some(self.grade.clone()),
        };

        if mode == FormMode::Public && !period_is_valid(&self.start_datetime, &self.end_datetime)
        {
            return Err(ValidationError::InvalidPeriod);
        }

        // An empty admin status leaves the stored one alone.
        let status = match mode {
            FormMode::Admin if self.status.is_empty() => None,
            FormMode::Admin => Some(
                self.status
                    .parse::<ReservationStatus>()
                    .map_err(|_| ValidationError::InvalidStatus)?,
            ),
            FormMode::Public => None,
        };

        Ok(ReservationInput {
            park_name,
            start_datetime: self.start_datetime.clone(),
            end_datetime: self.end_datetime.clone(),
            is_exclusive: parse_int(&self.is_exclusive),
            purpose: self.purpose.clone(),
            organization_name: self.organization_name.clone(),
            grade,
            number_of_people: parse_int(&self.number_of_people),
            contact_info: self.contact_info.clone(),
            status,
        })
    }

    /// Back-fill every field from a stored reservation.
    pub fn fill_from(&mut self, reservation: &Reservation) {
        self.start_datetime = to_datetime_local(&reservation.start_datetime);
        self.end_datetime = to_datetime_local(&reservation.end_datetime);
        self.is_exclusive = if reservation.is_exclusive { "1" } else { "0" }.to_string();
        self.purpose = reservation.purpose.clone();
        self.organization_name = reservation.organization_name.clone();
        self.grade = reservation.grade.clone().unwrap_or_default();
        self.number_of_people = reservation.number_of_people.to_string();
        self.contact_info = reservation.contact_info.clone();
        self.status = reservation.status.as_str().to_string();
        self.park
            .select_park_name(reservation.park_name.as_deref().unwrap_or(""));
    }

    /// Browser form reset. Park options survive; values go back to defaults.
    pub fn reset(&mut self) {
        let park = std::mem::take(&mut self.park);
        *self = Self {
            park,
            ..Self::default()
        };
        self.park.reset();
    }
}

pub fn needs_grade(purpose: &str) -> bool {
    let purpose = purpose.to_lowercase();
    GRADE_TRIGGERS.iter().any(|t| purpose.contains(t))
}

/// Both ends present and readable, end strictly after start.
fn period_is_valid(start: &str, end: &str) -> bool {
    match (parse_local_datetime(start), parse_local_datetime(end)) {
        (Some(start), Some(end)) => start < end,
        _ => false,
    }
}

/// Integer-prefix parse: leading whitespace and sign allowed, digits up to
/// the first non-digit. `None` when no digits lead.
pub fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (sign, rest) = match value.as_bytes().first() {
        Some(b'-') => (-1, &value[1..]),
        Some(b'+') => (1, &value[1..]),
        _ => (1, value),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}
