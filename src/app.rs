// src/app.rs

use ratatui::widgets::ScrollbarState;
use vanguard_recon::core::error::ScanError;
use vanguard_recon::core::models::{Profile, ScanRecord, ScanRequest};
use vanguard_recon::core::target::host_from_input;

pub const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub enum AppState {
    Disclaimer,
    Idle,
    Scanning,
    Finished,
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    pub profile: Profile,
    pub token: Option<String>,
    pub outcome: Option<Result<ScanRecord, ScanError>>,
    pub scroll_offset: usize,
    pub report_scroll_state: ScrollbarState,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(token: Option<String>) -> Self {
        Self {
            should_quit: false,
            state: AppState::Disclaimer,
            input: String::new(),
            profile: Profile::Basic,
            token,
            outcome: None,
            scroll_offset: 0,
            report_scroll_state: ScrollbarState::default(),
            spinner_frame: 0,
        }
    }

    pub fn acknowledge_disclaimer(&mut self) {
        self.state = AppState::Idle;
    }

    pub fn toggle_profile(&mut self) {
        self.profile = match self.profile {
            Profile::Basic => Profile::Deep,
            Profile::Deep => Profile::Basic,
        };
    }

    /// Builds the request for the current input, or `None` if there is nothing to scan.
    pub fn start_scan(&mut self) -> Option<ScanRequest> {
        if self.input.trim().is_empty() {
            return None;
        }
        self.state = AppState::Scanning;
        self.spinner_frame = 0;
        Some(ScanRequest {
            target: host_from_input(&self.input),
            kind: None,
            profile: self.profile,
            authorization_token: self.token.clone(),
        })
    }

    pub fn finish(&mut self, outcome: Result<ScanRecord, ScanError>) {
        self.outcome = Some(outcome);
        self.state = AppState::Finished;
        self.scroll_offset = 0;
        self.report_scroll_state = ScrollbarState::default();
    }

    pub fn record(&self) -> Option<&ScanRecord> {
        self.outcome.as_ref().and_then(|o| o.as_ref().ok())
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn on_tick(&mut self) {
        if let AppState::Scanning = self.state {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
    }

    pub fn quit(&mut self) { self.should_quit = true; }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.outcome = None;
        self.scroll_offset = 0;
        self.report_scroll_state = ScrollbarState::default();
        self.spinner_frame = 0;
    }
}
