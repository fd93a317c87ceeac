//! Public booking page: park dropdown, calendar, and the review-then-confirm
//! reservation flow.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use park_api_client::{ReservationApi, ReservationInput};

use crate::calendar::{event_details, start_for_clicked_date, CalendarEvent, ReservationEventSource};
use crate::form::{FormMode, ReservationForm};
use crate::host::PageHost;
use crate::presentation::{format_display_datetime, MessageArea, PARK_LIST_LOAD_FAILED};

const CREATED: &str = "予約が正常に作成されました。ステータスは「申請中」です。";
const CREATE_FAILED: &str = "予約の作成に失敗しました。入力内容を確認してください。";
const CREATE_ERROR: &str = "予約処理中にエラーが発生しました。";
const PLEASE_REVISE: &str = "入力内容を修正してください。";

// --- Review summary ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub label: &'static str,
    pub value: String,
}

/// What the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub lines: Vec<SummaryLine>,
}

impl ReviewSummary {
    pub fn from_input(input: &ReservationInput) -> Self {
        let mut lines = vec![
            line("公園名", input.park_name.clone()),
            line("利用開始日時", format_display_datetime(&input.start_datetime)),
            line("利用終了日時", format_display_datetime(&input.end_datetime)),
            line(
                "占用利用",
                if input.is_exclusive == Some(1) { "あり" } else { "なし" }.to_string(),
            ),
            line("利用目的", input.purpose.clone()),
            line("お名前(団体名)", input.organization_name.clone()),
        ];
        if let Some(grade) = input.grade.as_ref().filter(|g| !g.is_empty()) {
            lines.push(line("学年", grade.clone()));
        }
        let people = input
            .number_of_people
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(line("人数", format!("{people} 人")));
        lines.push(line("連絡先", input.contact_info.clone()));
        Self { lines }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|l| l.label == label)
            .map(|l| l.value.as_str())
    }

    /// `label: value` per line.
    pub fn render_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}: {}", l.label, l.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn line(label: &'static str, value: String) -> SummaryLine {
    SummaryLine { label, value }
}

// --- Flow ---

/// Where the booking form is in its review-then-confirm cycle. The draft
/// lives only inside the variant that needs it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BookingFlow {
    #[default]
    Editing,
    Reviewing {
        draft: ReservationInput,
        summary: ReviewSummary,
    },
    Submitting {
        draft: ReservationInput,
    },
}

impl BookingFlow {
    /// Editing → Reviewing.
    pub fn review(draft: ReservationInput) -> Self {
        let summary = ReviewSummary::from_input(&draft);
        BookingFlow::Reviewing { draft, summary }
    }

    /// Reviewing → Submitting. Any other state is returned unchanged as `Err`.
    pub fn submit(self) -> Result<BookingFlow, BookingFlow> {
        match self {
            BookingFlow::Reviewing { draft, .. } => Ok(BookingFlow::Submitting { draft }),
            other => Err(other),
        }
    }

    /// Reviewing → Editing, dropping the draft. Any other state is returned
    /// unchanged as `Err`.
    pub fn cancel(self) -> Result<BookingFlow, BookingFlow> {
        match self {
            BookingFlow::Reviewing { .. } => Ok(BookingFlow::Editing),
            other => Err(other),
        }
    }

    pub fn draft(&self) -> Option<&ReservationInput> {
        match self {
            BookingFlow::Reviewing { draft, .. } | BookingFlow::Submitting { draft } => Some(draft),
            BookingFlow::Editing => None,
        }
    }

    pub fn summary(&self) -> Option<&ReviewSummary> {
        match self {
            BookingFlow::Reviewing { summary, .. } => Some(summary),
            _ => None,
        }
    }

    /// The form is shown only while editing; the confirmation area otherwise.
    pub fn form_visible(&self) -> bool {
        matches!(self, BookingFlow::Editing)
    }
}

// --- Controller ---

pub struct PublicBookingController {
    api: Arc<dyn ReservationApi>,
    host: Arc<dyn PageHost>,
    pub form: ReservationForm,
    message: MessageArea,
    flow: BookingFlow,
}

impl PublicBookingController {
    pub fn new(api: Arc<dyn ReservationApi>, host: Arc<dyn PageHost>) -> Self {
        Self {
            api,
            host,
            form: ReservationForm::default(),
            message: MessageArea::default(),
            flow: BookingFlow::Editing,
        }
    }

    pub fn message(&self) -> &MessageArea {
        &self.message
    }

    pub fn flow(&self) -> &BookingFlow {
        &self.flow
    }

    /// Event source to hand to the calendar widget.
    pub fn event_source(&self) -> ReservationEventSource {
        ReservationEventSource::new(self.api.clone())
    }

    /// Initial page load.
    pub async fn load_parks(&mut self) {
        if let Err(e) = self.form.park.load(self.api.as_ref()).await {
            warn!(error = %e, "Failed to load parks for dropdown");
            self.message.error(PARK_LIST_LOAD_FAILED);
        }
    }

    pub fn select_park(&mut self, value: &str) {
        self.form.park.select(value);
    }

    pub fn input_purpose(&mut self, text: &str) {
        self.form.input_purpose(text);
    }

    /// Calendar date click: prefill the start, clear the end.
    pub fn click_date(&mut self, date: NaiveDate, now: NaiveDateTime) {
        self.form.start_datetime = start_for_clicked_date(date, now);
        self.form.end_datetime.clear();
    }

    pub fn click_event(&self, event: &CalendarEvent) {
        self.host.alert(&event_details(event));
    }

    /// Form submit. Validates and moves to review; stays in editing with an
    /// inline error otherwise. Returns whether the review step was reached.
    pub fn submit_form(&mut self) -> bool {
        if !self.flow.form_visible() {
            return false;
        }
        self.message.clear();

        match self.form.to_input(FormMode::Public) {
            Ok(draft) => {
                self.flow = BookingFlow::review(draft);
                true
            }
            Err(e) => {
                self.message.error(e.to_string());
                false
            }
        }
    }

    /// Confirm button: send the draft. Whatever the outcome, the flow ends
    /// back in editing with the draft discarded.
    pub async fn confirm(&mut self) {
        self.flow = match std::mem::take(&mut self.flow).submit() {
            Ok(submitting) => submitting,
            Err(unchanged) => {
                self.flow = unchanged;
                return;
            }
        };
        let BookingFlow::Submitting { draft } = &self.flow else {
            return;
        };

        match self.api.create_reservation(draft).await {
            Ok(created) => {
                info!(id = ?created.id, "Reservation submitted for review");
                self.message
                    .success(created.message.unwrap_or_else(|| CREATED.to_string()));
                self.form.reset();
                self.host.refetch_calendar();
            }
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Error submitting reservation");
                self.message.error(CREATE_ERROR);
            }
            Err(e) => {
                warn!(error = %e, "Reservation rejected");
                self.message
                    .error(e.server_text().unwrap_or(CREATE_FAILED).to_string());
            }
        }

        self.flow = BookingFlow::Editing;
    }

    /// Fix button: back to the form without sending anything.
    pub fn cancel_review(&mut self) {
        let flow = std::mem::take(&mut self.flow);
        match flow.cancel() {
            Ok(editing) => {
                self.flow = editing;
                self.message.info(PLEASE_REVISE);
            }
            Err(unchanged) => self.flow = unchanged,
        }
    }
}
