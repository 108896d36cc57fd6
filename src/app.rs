use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::backend::{BackendClient, TransportError};
use crate::chat::ChatController;
use crate::config::Config;
use crate::plan::{PlanForm, TripPlan};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Chat,
    Planner,
    Itinerary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItineraryTab {
    Summary,
    Flights,
    Hotels,
    Shopping,
}

impl ItineraryTab {
    pub const ALL: [ItineraryTab; 4] = [
        ItineraryTab::Summary,
        ItineraryTab::Flights,
        ItineraryTab::Hotels,
        ItineraryTab::Shopping,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ItineraryTab::Summary => "Summary",
            ItineraryTab::Flights => "Flights",
            ItineraryTab::Hotels => "Hotels",
            ItineraryTab::Shopping => "Shopping",
        }
    }

    pub fn index(self) -> usize {
        match self {
            ItineraryTab::Summary => 0,
            ItineraryTab::Flights => 1,
            ItineraryTab::Hotels => 2,
            ItineraryTab::Shopping => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Landing menu entries; the last one is a teaser and stays disabled, as
/// it does upstream.
pub const LANDING_MENU: [(&str, &str, bool); 3] = [
    (
        "💬 Messy Mind Chat Planner",
        "An interactive AI planner, perfect if you're figuring things out on the fly.",
        true,
    ),
    (
        "📅 Personalized Trip Planner",
        "Let AI build your dream trip based on your vibe and schedule.",
        true,
    ),
    (
        "🔍 Hidden Gems & Pro Tips",
        "Smart tips from real travelers. Coming soon.",
        false,
    ),
];

pub const PAW_STEPS: usize = 10;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Landing state
    pub landing_selected: usize,
    pub paw_step: usize,
    tick_count: u8,

    // Chat state (controller owns the conversation; created on entry,
    // discarded when the user navigates away)
    pub chat: Option<ChatController>,
    pub chat_input: String,
    pub chat_cursor: usize,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub animation_frame: u8,

    // Planner form state
    pub form: PlanForm,
    pub suggestions: Vec<String>,
    pub suggestion_state: ListState,
    pub suggestion_task: Option<JoinHandle<Result<Vec<String>, TransportError>>>,
    pub plan_task: Option<JoinHandle<Result<TripPlan, TransportError>>>,
    pub submit_error: Option<String>,

    // Itinerary state
    pub plan: Option<TripPlan>,
    pub itinerary_tab: ItineraryTab,
    pub itinerary_scroll: u16,

    // Shared services
    pub client: BackendClient,
    pub session: SessionStore,
    pub config: Config,
}

impl App {
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::load().unwrap_or_else(|_| Config::new());
        let session = SessionStore::open_default()?;
        let client = BackendClient::new(&config.backend_url(), session.clone());

        Ok(Self {
            should_quit: false,
            screen: Screen::Landing,
            input_mode: InputMode::Normal,

            landing_selected: 0,
            paw_step: 0,
            tick_count: 0,

            chat: None,
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,

            form: PlanForm::new(),
            suggestions: Vec::new(),
            suggestion_state: ListState::default(),
            suggestion_task: None,
            plan_task: None,
            submit_error: None,

            plan: None,
            itinerary_tab: ItineraryTab::Summary,
            itinerary_scroll: 0,

            client,
            session,
            config,
        })
    }

    /// Enter the chat screen with a fresh conversation. The session id is
    /// resolved here, at surface entry; whatever conversation existed
    /// before is dropped along with any in-flight result.
    pub fn open_chat(&mut self) {
        let session_id = self.session.resolve();
        self.chat = Some(ChatController::new(self.client.clone(), session_id));
        self.chat_input.clear();
        self.chat_cursor = 0;
        self.chat_scroll = 0;
        self.screen = Screen::Chat;
        self.input_mode = InputMode::Editing;
    }

    pub fn close_chat(&mut self) {
        self.chat = None;
        self.screen = Screen::Landing;
        self.input_mode = InputMode::Normal;
    }

    pub fn open_planner(&mut self) {
        self.screen = Screen::Planner;
        self.input_mode = InputMode::Editing;
        self.submit_error = None;
    }

    pub fn open_itinerary(&mut self, plan: TripPlan) {
        self.plan = Some(plan);
        self.itinerary_tab = ItineraryTab::Summary;
        self.itinerary_scroll = 0;
        self.screen = Screen::Itinerary;
        self.input_mode = InputMode::Normal;
    }

    // Landing menu navigation; skips nothing, disabled rows just don't
    // activate.
    pub fn landing_nav_down(&mut self) {
        self.landing_selected = (self.landing_selected + 1).min(LANDING_MENU.len() - 1);
    }

    pub fn landing_nav_up(&mut self) {
        self.landing_selected = self.landing_selected.saturating_sub(1);
    }

    pub fn suggestion_nav_down(&mut self) {
        let len = self.suggestions.len();
        if len > 0 {
            let i = self.suggestion_state.selected().map_or(0, |i| i + 1);
            self.suggestion_state.select(Some(i.min(len - 1)));
        }
    }

    pub fn suggestion_nav_up(&mut self) {
        match self.suggestion_state.selected() {
            Some(0) | None => self.suggestion_state.select(None),
            Some(i) => self.suggestion_state.select(Some(i - 1)),
        }
    }

    pub fn selected_suggestion(&self) -> Option<&String> {
        self.suggestion_state
            .selected()
            .and_then(|i| self.suggestions.get(i))
    }

    /// Refresh autocomplete for the destination input. Queries shorter
    /// than 3 characters clear the dropdown, like the original form. A
    /// newer query simply replaces the in-flight handle; the stale result
    /// is discarded unseen.
    pub fn refresh_suggestions(&mut self) {
        self.suggestion_state.select(None);
        let query = self.form.destination_input.trim().to_string();
        if query.len() < 3 {
            self.suggestions.clear();
            self.suggestion_task = None;
            return;
        }
        let client = self.client.clone();
        self.suggestion_task =
            Some(tokio::spawn(async move { client.locations(&query).await }));
    }

    /// Submit the planner form if it validates; one plan request at a
    /// time. Returns false when the form is invalid or a request is
    /// already in flight.
    pub fn submit_plan(&mut self) -> bool {
        if self.plan_task.is_some() || !self.form.can_submit() {
            return false;
        }
        self.submit_error = None;
        let request = self.form.to_request(&self.config.origin());
        let client = self.client.clone();
        self.plan_task = Some(tokio::spawn(async move { client.plan(&request).await }));
        true
    }

    pub fn is_submitting(&self) -> bool {
        self.plan_task.is_some()
    }

    /// Reap finished background work. Called once per event-loop pass.
    pub async fn poll_tasks(&mut self) {
        let mut turn_settled = false;
        if let Some(chat) = &mut self.chat {
            let was_busy = chat.is_busy();
            chat.poll().await;
            turn_settled = was_busy && !chat.is_busy();
        }
        if turn_settled {
            self.scroll_chat_to_bottom();
        }

        if self
            .suggestion_task
            .as_ref()
            .is_some_and(|task| task.is_finished())
        {
            if let Some(task) = self.suggestion_task.take() {
                self.suggestions = match task.await {
                    Ok(Ok(locations)) => locations,
                    // Autocomplete degrades to an empty dropdown.
                    Ok(Err(_)) | Err(_) => Vec::new(),
                };
                self.suggestion_state.select(None);
            }
        }

        if self
            .plan_task
            .as_ref()
            .is_some_and(|task| task.is_finished())
        {
            if let Some(task) = self.plan_task.take() {
                match task.await {
                    Ok(Ok(plan)) => self.open_itinerary(plan),
                    Ok(Err(err)) => {
                        warn!(error = %err, "plan request failed");
                        self.submit_error =
                            Some("Could not generate a plan. Is the backend running?".to_string());
                    }
                    Err(err) => {
                        warn!(error = %err, "plan task aborted");
                        self.submit_error =
                            Some("Could not generate a plan. Is the backend running?".to_string());
                    }
                }
            }
        }
    }

    /// Tick event: advance the thinking-dots animation and the landing
    /// stepper (one paw every ~2 seconds at the 300ms tick rate).
    pub fn tick_animation(&mut self) {
        if self.chat.as_ref().is_some_and(ChatController::is_busy) || self.is_submitting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self.screen == Screen::Landing {
            self.tick_count = self.tick_count.wrapping_add(1);
            if self.tick_count % 6 == 0 {
                self.paw_step = (self.paw_step + 1) % PAW_STEPS;
            }
        }
    }

    // Chat scrolling
    pub fn chat_scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn chat_scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Pin the view to the newest message, accounting for wrapping. Uses
    /// character counts so multi-byte text doesn't overshoot.
    pub fn scroll_chat_to_bottom(&mut self) {
        let Some(chat) = &self.chat else {
            return;
        };
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for message in chat.messages() {
            total_lines += 1; // role line
            for line in message.content.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // blank line after message
        }
        if chat.is_busy() {
            total_lines += 2; // typing indicator
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }

    // Itinerary scrolling
    pub fn itinerary_scroll_up(&mut self) {
        self.itinerary_scroll = self.itinerary_scroll.saturating_sub(1);
    }

    pub fn itinerary_scroll_down(&mut self) {
        self.itinerary_scroll = self.itinerary_scroll.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::at(dir.path().join("cookies"));
        let client = BackendClient::new("http://127.0.0.1:9", session.clone());
        App {
            should_quit: false,
            screen: Screen::Landing,
            input_mode: InputMode::Normal,
            landing_selected: 0,
            paw_step: 0,
            tick_count: 0,
            chat: None,
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            form: PlanForm::new(),
            suggestions: Vec::new(),
            suggestion_state: ListState::default(),
            suggestion_task: None,
            plan_task: None,
            submit_error: None,
            plan: None,
            itinerary_tab: ItineraryTab::Summary,
            itinerary_scroll: 0,
            client,
            session,
            config: Config::new(),
        }
    }

    #[tokio::test]
    async fn opening_chat_seeds_a_fresh_conversation() {
        let mut app = test_app();
        app.open_chat();
        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.input_mode, InputMode::Editing);
        let chat = app.chat.as_ref().unwrap();
        assert_eq!(chat.messages().len(), 2);
        assert!(!chat.is_busy());
    }

    #[tokio::test]
    async fn closing_chat_discards_the_conversation() {
        let mut app = test_app();
        app.open_chat();
        assert!(app.chat.as_mut().unwrap().send("remember this"));
        app.close_chat();
        assert!(app.chat.is_none());

        // Re-entering starts over from the seeded greeting.
        app.open_chat();
        assert_eq!(app.chat.as_ref().unwrap().messages().len(), 2);
    }

    #[tokio::test]
    async fn short_destination_queries_clear_suggestions() {
        let mut app = test_app();
        app.suggestions = vec!["Kyoto, Japan".to_string()];
        app.form.destination_input = "Ky".to_string();
        app.refresh_suggestions();
        assert!(app.suggestions.is_empty());
        assert!(app.suggestion_task.is_none());
    }

    #[tokio::test]
    async fn submit_requires_a_valid_form() {
        let mut app = test_app();
        assert!(!app.submit_plan());
        assert!(app.plan_task.is_none());

        app.form.destination_input = "Kyoto".to_string();
        app.form.commit_destination();
        app.form.start_date = "2026-04-01".to_string();
        app.form.end_date = "2026-04-05".to_string();
        assert!(app.submit_plan());
        assert!(app.is_submitting());

        // Second submit while one is in flight is ignored.
        assert!(!app.submit_plan());
        assert!(app.is_submitting());
    }

    #[test]
    fn itinerary_tabs_cycle() {
        let mut tab = ItineraryTab::Summary;
        for _ in 0..4 {
            tab = tab.next();
        }
        assert_eq!(tab, ItineraryTab::Summary);
        assert_eq!(ItineraryTab::Summary.prev(), ItineraryTab::Shopping);
    }

    #[test]
    fn landing_selection_is_clamped() {
        let mut app = test_app();
        app.landing_nav_up();
        assert_eq!(app.landing_selected, 0);
        for _ in 0..10 {
            app.landing_nav_down();
        }
        assert_eq!(app.landing_selected, LANDING_MENU.len() - 1);
    }
}
