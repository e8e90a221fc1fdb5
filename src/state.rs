use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;

use crate::config::Config;
use crate::error::PredictError;
use crate::predict_fetch::Endpoint;
use crate::prediction::PredictionResult;
use crate::squad::{
    CardRow, Position, STANDARD_SQUAD, SquadShape, TeamSummary, card_rows, team_summary,
};

pub const PREDICT_ERROR_MESSAGE: &str =
    "There was an error making the prediction. Please try again.";
pub const CUSTOM_ERROR_MESSAGE: &str =
    "There was an error making the custom prediction. Please try again.";

const MAX_LOGS: usize = 200;
const BUDGET_STEP: f64 = 0.5;
const BUDGET_MAX: f64 = 200.0;
pub const DEFAULT_BUDGET: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Predict,
    Custom,
}

impl PageKind {
    pub fn endpoint(self) -> Endpoint {
        match self {
            PageKind::Predict => Endpoint::Predict,
            PageKind::Custom => Endpoint::PredictCustom,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PageKind::Predict => "Predicted Best Players",
            PageKind::Custom => "Custom Predicted Best Players",
        }
    }

    pub fn error_message(self) -> &'static str {
        match self {
            PageKind::Predict => PREDICT_ERROR_MESSAGE,
            PageKind::Custom => CUSTOM_ERROR_MESSAGE,
        }
    }

    fn log_noun(self) -> &'static str {
        match self {
            PageKind::Predict => "prediction",
            PageKind::Custom => "custom prediction",
        }
    }

    pub fn other(self) -> Self {
        match self {
            PageKind::Predict => PageKind::Custom,
            PageKind::Custom => PageKind::Predict,
        }
    }
}

/// Shared flag a request thread checks before reporting back.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One mount of a page. A fresh session is issued on every mount.
#[derive(Debug, Clone)]
pub struct PageLifetime {
    pub session: u64,
    pub cancel: CancelToken,
}

impl PageLifetime {
    fn new(session: u64) -> Self {
        Self {
            session,
            cancel: CancelToken::new(),
        }
    }
}

/// Identifies the page mount that issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    pub page: PageKind,
    pub session: u64,
    pub request_id: u64,
    /// Squad counts the request asked the backend for.
    pub shape: SquadShape,
}

#[derive(Debug, Clone)]
pub struct PageState {
    pub kind: PageKind,
    pub input: String,
    pub prediction: Option<PredictionResult>,
    pub error: Option<String>,
    pub show_errors: bool,
    pub lifetime: PageLifetime,
    pub in_flight: usize,
    /// Counts sent with the next submit.
    pub request_shape: SquadShape,
    /// Counts the current `prediction` was built with.
    pub result_shape: SquadShape,
    next_request_id: u64,
}

impl PageState {
    pub fn new(kind: PageKind, show_errors: bool, session: u64) -> Self {
        Self {
            kind,
            input: String::new(),
            prediction: None,
            error: None,
            show_errors,
            lifetime: PageLifetime::new(session),
            in_flight: 0,
            request_shape: STANDARD_SQUAD,
            result_shape: STANDARD_SQUAD,
            next_request_id: 1,
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Starts a new request from this mount. The error is cleared here,
    /// before any outcome is known.
    pub fn begin_submit(&mut self) -> SubmitTicket {
        self.error = None;
        self.in_flight += 1;
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        SubmitTicket {
            page: self.kind,
            session: self.lifetime.session,
            request_id,
            shape: self.request_shape,
        }
    }

    /// Card grid for the current prediction, `shape` cards per position.
    pub fn card_rows(&self, shape: &SquadShape) -> Vec<CardRow> {
        let top_players = self
            .prediction
            .as_ref()
            .map(|p| p.top_players.as_slice())
            .unwrap_or(&[]);
        card_rows(shape, &self.result_shape, top_players)
    }

    pub fn optimized_team(&self) -> Option<TeamSummary> {
        self.prediction
            .as_ref()
            .filter(|p| !p.optimized_team.is_empty())
            .map(|p| team_summary(&p.optimized_team))
    }

    pub fn is_current(&self, ticket: &SubmitTicket) -> bool {
        ticket.page == self.kind && ticket.session == self.lifetime.session
    }

    fn dispose(&self) {
        self.lifetime.cancel.cancel();
    }

    fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Goalkeepers,
    Defenders,
    Midfielders,
    Forwards,
    Budget,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Goalkeepers,
        FormField::Defenders,
        FormField::Midfielders,
        FormField::Forwards,
        FormField::Budget,
    ];

    fn position(self) -> Option<Position> {
        match self {
            FormField::Goalkeepers => Some(Position::Goalkeeper),
            FormField::Defenders => Some(Position::Defender),
            FormField::Midfielders => Some(Position::Midfielder),
            FormField::Forwards => Some(Position::Forward),
            FormField::Budget => None,
        }
    }
}

/// Backing state of the team customization form on the custom page.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamCustomization {
    pub shape: SquadShape,
    pub budget: f64,
    pub selected: FormField,
}

impl Default for TeamCustomization {
    fn default() -> Self {
        Self {
            shape: STANDARD_SQUAD,
            budget: DEFAULT_BUDGET,
            selected: FormField::Goalkeepers,
        }
    }
}

impl TeamCustomization {
    pub fn select_next(&mut self) {
        let idx = self.selected_index();
        self.selected = FormField::ALL[(idx + 1) % FormField::ALL.len()];
    }

    pub fn select_prev(&mut self) {
        let idx = self.selected_index();
        let len = FormField::ALL.len();
        self.selected = FormField::ALL[(idx + len - 1) % len];
    }

    fn selected_index(&self) -> usize {
        FormField::ALL
            .iter()
            .position(|f| *f == self.selected)
            .unwrap_or(0)
    }

    pub fn increment(&mut self) {
        self.adjust(1);
    }

    pub fn decrement(&mut self) {
        self.adjust(-1);
    }

    fn adjust(&mut self, step: i32) {
        match self.selected.position() {
            Some(position) => {
                let max = STANDARD_SQUAD.count(position);
                let slot = self.shape.count_mut(position);
                *slot = if step >= 0 {
                    (*slot + 1).min(max)
                } else {
                    slot.saturating_sub(1)
                };
            }
            None => {
                let next = self.budget + f64::from(step) * BUDGET_STEP;
                self.budget = next.clamp(0.0, BUDGET_MAX);
            }
        }
    }

    /// JSON object the custom endpoint reads out of `input`.
    pub fn to_input_text(&self) -> String {
        json!({
            "numGoalkeepers": self.shape.goalkeepers,
            "numDefenders": self.shape.defenders,
            "numMidfielders": self.shape.midfielders,
            "numForwards": self.shape.forwards,
            "budget": self.budget,
        })
        .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: PageKind,
    pub predict: PageState,
    pub custom: PageState,
    /// Card counts of the prediction page grid; static for the run.
    pub squad: SquadShape,
    pub form: TeamCustomization,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    next_session: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            screen: PageKind::Predict,
            predict: PageState::new(PageKind::Predict, config.predict_show_errors, 1),
            custom: PageState::new(PageKind::Custom, config.custom_show_errors, 2),
            squad: STANDARD_SQUAD,
            form: TeamCustomization::default(),
            logs: VecDeque::new(),
            help_overlay: false,
            next_session: 3,
        }
    }

    pub fn page(&self, kind: PageKind) -> &PageState {
        match kind {
            PageKind::Predict => &self.predict,
            PageKind::Custom => &self.custom,
        }
    }

    pub fn page_mut(&mut self, kind: PageKind) -> &mut PageState {
        match kind {
            PageKind::Predict => &mut self.predict,
            PageKind::Custom => &mut self.custom,
        }
    }

    pub fn current_page(&self) -> &PageState {
        self.page(self.screen)
    }

    pub fn current_page_mut(&mut self) -> &mut PageState {
        self.page_mut(self.screen)
    }

    /// Disposes the visible page and mounts `kind` with empty state.
    /// Requests still in flight for the old mount are cancelled.
    pub fn switch_page(&mut self, kind: PageKind) {
        if kind == self.screen {
            return;
        }
        let old = self.screen;
        self.remount(old);
        self.remount(kind);
        if kind == PageKind::Custom {
            self.form = TeamCustomization::default();
        }
        self.screen = kind;
    }

    pub fn toggle_page(&mut self) {
        self.switch_page(self.screen.other());
    }

    fn remount(&mut self, kind: PageKind) {
        let session = self.next_session;
        self.next_session += 1;
        let page = self.page_mut(kind);
        page.dispose();
        let show_errors = page.show_errors;
        *page = PageState::new(kind, show_errors, session);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    PredictionReady {
        ticket: SubmitTicket,
        result: PredictionResult,
    },
    PredictionFailed {
        ticket: SubmitTicket,
        error: PredictError,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Predict {
        ticket: SubmitTicket,
        endpoint: Endpoint,
        input: String,
        cancel: CancelToken,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::PredictionReady { ticket, result } => {
            let page = state.page_mut(ticket.page);
            if !page.is_current(&ticket) {
                let noun = ticket.page.log_noun();
                state.push_log(format!("[INFO] Discarded stale {noun} response"));
                return;
            }
            page.finish_request();
            page.result_shape = ticket.shape;
            page.prediction = Some(result);
        }
        Delta::PredictionFailed { ticket, error } => {
            let noun = ticket.page.log_noun();
            let page = state.page_mut(ticket.page);
            if !page.is_current(&ticket) {
                state.push_log(format!("[INFO] Discarded stale {noun} failure: {error}"));
                return;
            }
            page.finish_request();
            if page.show_errors {
                page.error = Some(ticket.page.error_message().to_string());
            }
            state.push_log(format!("[WARN] There was an error making the {noun}! {error}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
