use crate::content::{guidelines_in, GuidelineFilter};
use crate::layers::engine::chat::{new_message_id, CONNECT_APOLOGY};
use crate::layers::engine::{Forecast, Transcript};
use crate::layers::service::events::{ServiceCommand, ServiceEvent, Ticket};
use protocol::{ChatMessage, GuidelinePoint, PredictionRequest};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    PredictionEngine,
    ProblemStatement,
    Guidelines,
    Assistant,
}

impl Screen {
    pub(crate) const ALL: [Screen; 5] = [
        Screen::Dashboard,
        Screen::PredictionEngine,
        Screen::ProblemStatement,
        Screen::Guidelines,
        Screen::Assistant,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Screen::Dashboard => "Risk Dashboard",
            Screen::PredictionEngine => "Prediction Engine",
            Screen::ProblemStatement => "Problem Statement",
            Screen::Guidelines => "SIH Guidelines",
            Screen::Assistant => "AI Consultant",
        }
    }

    pub(crate) fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|screen| *screen == self)
            .unwrap_or(0)
    }

    pub(crate) fn from_index(index: usize) -> Option<Screen> {
        Self::ALL.get(index).copied()
    }

    pub(crate) fn next(self) -> Screen {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub(crate) fn prev(self) -> Screen {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Lifecycle of one outstanding request. A failed forecast still lands in
/// `Ready` because the engine substitutes its fallback record.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum RequestState<T> {
    Idle,
    Pending {
        ticket: Ticket,
    },
    Ready(T),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

impl<T> RequestState<T> {
    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending { .. })
    }

    fn awaits(&self, ticket: Ticket) -> bool {
        matches!(self, RequestState::Pending { ticket: pending } if *pending == ticket)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum FormField {
    #[default]
    Location,
    TimeOfDay,
    Density,
}

impl FormField {
    pub(crate) const ALL: [FormField; 3] =
        [FormField::Location, FormField::TimeOfDay, FormField::Density];

    pub(crate) fn label(self) -> &'static str {
        match self {
            FormField::Location => "Target Location",
            FormField::TimeOfDay => "Time of Analysis",
            FormField::Density => "Area Density & Characteristics",
        }
    }

    pub(crate) fn placeholder(self) -> &'static str {
        match self {
            FormField::Location => "e.g., Connaught Place, New Delhi",
            FormField::TimeOfDay => "e.g., 23:30",
            FormField::Density => "e.g., High footfall, multiple unmonitored ATMs, near highway",
        }
    }

    fn next(self) -> FormField {
        match self {
            FormField::Location => FormField::TimeOfDay,
            FormField::TimeOfDay => FormField::Density,
            FormField::Density => FormField::Location,
        }
    }

    fn prev(self) -> FormField {
        match self {
            FormField::Location => FormField::Density,
            FormField::TimeOfDay => FormField::Location,
            FormField::Density => FormField::TimeOfDay,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct PredictionScreen {
    pub(crate) location: String,
    pub(crate) time_of_day: String,
    pub(crate) density: String,
    pub(crate) focus: FormField,
    pub(crate) state: RequestState<Forecast>,
    pub(crate) notice: Option<String>,
}

impl PredictionScreen {
    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Location => &self.location,
            FormField::TimeOfDay => &self.time_of_day,
            FormField::Density => &self.density,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Location => &mut self.location,
            FormField::TimeOfDay => &mut self.time_of_day,
            FormField::Density => &mut self.density,
        }
    }

    pub(crate) fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub(crate) fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub(crate) fn insert_char(&mut self, ch: char) {
        let field = self.focus;
        self.value_mut(field).push(ch);
        self.notice = None;
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.focus;
        self.value_mut(field).pop();
    }

    fn request(&self) -> PredictionRequest {
        PredictionRequest::new(
            self.location.trim(),
            self.time_of_day.trim(),
            self.density.trim(),
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct AssistantScreen {
    pub(crate) transcript: Transcript,
    pub(crate) input: String,
    pub(crate) state: RequestState<()>,
    pub(crate) scroll_back: usize,
}

#[derive(Debug, Default)]
pub(crate) struct GuidelinesScreen {
    pub(crate) filter_index: usize,
    pub(crate) selected: usize,
    expanded: BTreeSet<u32>,
    pub(crate) scroll: usize,
}

impl GuidelinesScreen {
    pub(crate) fn filter(&self) -> GuidelineFilter {
        GuidelineFilter::TABS[self.filter_index % GuidelineFilter::TABS.len()]
    }

    pub(crate) fn points(&self) -> Vec<&'static GuidelinePoint> {
        guidelines_in(self.filter())
    }

    pub(crate) fn next_filter(&mut self) {
        self.filter_index = (self.filter_index + 1) % GuidelineFilter::TABS.len();
        self.reset_cursor();
    }

    pub(crate) fn prev_filter(&mut self) {
        let len = GuidelineFilter::TABS.len();
        self.filter_index = (self.filter_index + len - 1) % len;
        self.reset_cursor();
    }

    fn reset_cursor(&mut self) {
        self.selected = 0;
        self.scroll = 0;
    }

    pub(crate) fn select_next(&mut self, step: usize) {
        let last = self.points().len().saturating_sub(1);
        self.selected = self.selected.saturating_add(step).min(last);
    }

    pub(crate) fn select_prev(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.points().len().saturating_sub(1);
    }

    pub(crate) fn toggle_selected(&mut self) {
        let Some(point) = self.points().get(self.selected).copied() else {
            return;
        };
        if !self.expanded.remove(&point.id) {
            self.expanded.insert(point.id);
        }
    }

    pub(crate) fn is_expanded(&self, id: u32) -> bool {
        self.expanded.contains(&id)
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatementScreen {
    pub(crate) scroll: usize,
}

#[derive(Debug)]
pub(crate) enum ScreenState {
    Dashboard,
    Prediction(PredictionScreen),
    Statement(StatementScreen),
    Guidelines(GuidelinesScreen),
    Assistant(AssistantScreen),
}

impl ScreenState {
    fn mount(screen: Screen) -> Self {
        match screen {
            Screen::Dashboard => ScreenState::Dashboard,
            Screen::PredictionEngine => ScreenState::Prediction(PredictionScreen::default()),
            Screen::ProblemStatement => ScreenState::Statement(StatementScreen::default()),
            Screen::Guidelines => ScreenState::Guidelines(GuidelinesScreen::default()),
            Screen::Assistant => ScreenState::Assistant(AssistantScreen::default()),
        }
    }

    fn screen(&self) -> Screen {
        match self {
            ScreenState::Dashboard => Screen::Dashboard,
            ScreenState::Prediction(_) => Screen::PredictionEngine,
            ScreenState::Statement(_) => Screen::ProblemStatement,
            ScreenState::Guidelines(_) => Screen::Guidelines,
            ScreenState::Assistant(_) => Screen::Assistant,
        }
    }
}

pub(crate) struct AppState {
    pub(crate) view: ScreenState,
    pub(crate) confirm_quit: bool,
    pub(crate) model_name: String,
    pub(crate) credentials_ok: bool,
    next_ticket: Ticket,
}

impl AppState {
    pub(crate) fn new(model_name: impl Into<String>, credentials_ok: bool) -> Self {
        Self {
            view: ScreenState::Dashboard,
            confirm_quit: false,
            model_name: model_name.into(),
            credentials_ok,
            next_ticket: 1,
        }
    }

    pub(crate) fn screen(&self) -> Screen {
        self.view.screen()
    }

    pub(crate) fn navigate(&mut self, screen: Screen) {
        self.confirm_quit = false;
        if self.screen() == screen {
            return;
        }
        tracing::debug!(event = "navigate", from = self.screen().label(), to = screen.label());
        self.view = ScreenState::mount(screen);
    }

    pub(crate) fn is_editing(&self) -> bool {
        matches!(
            self.view,
            ScreenState::Prediction(_) | ScreenState::Assistant(_)
        )
    }

    fn allocate_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    pub(crate) fn submit_prediction(&mut self) -> Option<ServiceCommand> {
        let ticket = self.next_ticket;
        let ScreenState::Prediction(screen) = &mut self.view else {
            return None;
        };
        if screen.state.is_pending() {
            return None;
        }
        let request = screen.request();
        if let Some(field) = request.missing_field() {
            screen.notice = Some(format!("Please fill in the {field}."));
            return None;
        }
        screen.notice = None;
        screen.state = RequestState::Pending { ticket };
        self.allocate_ticket();
        Some(ServiceCommand::Predict { ticket, request })
    }

    pub(crate) fn submit_chat(&mut self) -> Option<ServiceCommand> {
        let ticket = self.next_ticket;
        let ScreenState::Assistant(screen) = &mut self.view else {
            return None;
        };
        if screen.state.is_pending() {
            return None;
        }
        let text = screen.input.trim().to_string();
        if text.is_empty() {
            return None;
        }
        screen.input.clear();
        screen.transcript.push_user(&text);
        screen.state = RequestState::Pending { ticket };
        screen.scroll_back = 0;
        self.allocate_ticket();
        Some(ServiceCommand::Chat { ticket, text })
    }

    pub(crate) fn handle_event(&mut self, event: ServiceEvent) {
        match (event, &mut self.view) {
            (ServiceEvent::PredictionReady { ticket, forecast }, ScreenState::Prediction(screen))
                if screen.state.awaits(ticket) =>
            {
                screen.state = RequestState::Ready(forecast);
            }
            (ServiceEvent::ChatReplied { ticket, message }, ScreenState::Assistant(screen))
                if screen.state.awaits(ticket) =>
            {
                screen.transcript.push(message);
                screen.state = RequestState::Idle;
                screen.scroll_back = 0;
            }
            (event, _) => {
                tracing::debug!(event = "stale_result_dropped", ?event);
            }
        }
    }

    pub(crate) fn dispatch_failed(&mut self, command: ServiceCommand) {
        tracing::error!(event = "dispatch_failed");
        let event = match command {
            ServiceCommand::Predict { ticket, request } => ServiceEvent::PredictionReady {
                ticket,
                forecast: Forecast::fallback(request.location),
            },
            ServiceCommand::Chat { ticket, .. } => ServiceEvent::ChatReplied {
                ticket,
                message: ChatMessage::assistant_error(new_message_id(), CONNECT_APOLOGY),
            },
        };
        self.handle_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::ChatRole;

    fn app_on(screen: Screen) -> AppState {
        let mut app = AppState::new("gemini-2.5-flash", true);
        app.navigate(screen);
        app
    }

    fn fill_form(app: &mut AppState) {
        let ScreenState::Prediction(screen) = &mut app.view else {
            panic!("prediction screen not mounted");
        };
        screen.location = "Connaught Place".to_string();
        screen.time_of_day = "23:30".to_string();
        screen.density = "High footfall".to_string();
    }

    fn prediction(app: &AppState) -> &PredictionScreen {
        match &app.view {
            ScreenState::Prediction(screen) => screen,
            _ => panic!("prediction screen not mounted"),
        }
    }

    fn assistant(app: &mut AppState) -> &mut AssistantScreen {
        match &mut app.view {
            ScreenState::Assistant(screen) => screen,
            _ => panic!("assistant screen not mounted"),
        }
    }

    #[test]
    fn screens_cycle_in_navigation_order() {
        assert_eq!(Screen::Dashboard.next(), Screen::PredictionEngine);
        assert_eq!(Screen::Dashboard.prev(), Screen::Assistant);
        assert_eq!(Screen::Assistant.next(), Screen::Dashboard);
        assert_eq!(Screen::from_index(3), Some(Screen::Guidelines));
        assert_eq!(Screen::from_index(5), None);
    }

    #[test]
    fn incomplete_form_is_not_submitted() {
        let mut app = app_on(Screen::PredictionEngine);
        if let ScreenState::Prediction(screen) = &mut app.view {
            screen.location = "Andheri".to_string();
            screen.time_of_day = "   ".to_string();
        }
        assert!(app.submit_prediction().is_none());
        let screen = prediction(&app);
        assert_eq!(screen.state, RequestState::Idle);
        assert_eq!(screen.notice.as_deref(), Some("Please fill in the time of day."));
    }

    #[test]
    fn pending_prediction_blocks_resubmit() {
        let mut app = app_on(Screen::PredictionEngine);
        fill_form(&mut app);
        let command = app.submit_prediction().expect("command");
        let ServiceCommand::Predict { ticket, request } = command else {
            panic!("expected predict command");
        };
        assert_eq!(request.location, "Connaught Place");
        assert_eq!(prediction(&app).state, RequestState::Pending { ticket });
        assert!(app.submit_prediction().is_none());
    }

    #[test]
    fn navigating_away_discards_result() {
        let mut app = app_on(Screen::PredictionEngine);
        fill_form(&mut app);
        let Some(ServiceCommand::Predict { ticket, .. }) = app.submit_prediction() else {
            panic!("expected predict command");
        };
        app.handle_event(ServiceEvent::PredictionReady {
            ticket,
            forecast: Forecast::fallback("Connaught Place"),
        });
        assert!(matches!(prediction(&app).state, RequestState::Ready(_)));

        app.navigate(Screen::Guidelines);
        app.navigate(Screen::PredictionEngine);
        let screen = prediction(&app);
        assert_eq!(screen.state, RequestState::Idle);
        assert!(screen.location.is_empty());
    }

    #[test]
    fn same_screen_navigation_keeps_state() {
        let mut app = app_on(Screen::PredictionEngine);
        fill_form(&mut app);
        app.navigate(Screen::PredictionEngine);
        assert_eq!(prediction(&app).location, "Connaught Place");
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut app = app_on(Screen::PredictionEngine);
        fill_form(&mut app);
        let Some(ServiceCommand::Predict { ticket, .. }) = app.submit_prediction() else {
            panic!("expected predict command");
        };
        app.navigate(Screen::Dashboard);
        app.navigate(Screen::PredictionEngine);
        app.handle_event(ServiceEvent::PredictionReady {
            ticket,
            forecast: Forecast::fallback("Connaught Place"),
        });
        assert_eq!(prediction(&app).state, RequestState::Idle);
    }

    #[test]
    fn blank_chat_input_is_rejected() {
        let mut app = app_on(Screen::Assistant);
        assistant(&mut app).input = "  \t ".to_string();
        assert!(app.submit_chat().is_none());
        assert_eq!(assistant(&mut app).transcript.len(), 1);
    }

    #[test]
    fn transcript_grows_by_two_per_turn() {
        let mut app = app_on(Screen::Assistant);
        for turn in 0..3 {
            assistant(&mut app).input = format!("question {turn}");
            let Some(ServiceCommand::Chat { ticket, text }) = app.submit_chat() else {
                panic!("expected chat command");
            };
            assert_eq!(text, format!("question {turn}"));
            assert!(app.submit_chat().is_none());
            app.handle_event(ServiceEvent::ChatReplied {
                ticket,
                message: ChatMessage::assistant(new_message_id(), format!("answer {turn}")),
            });
        }
        let screen = assistant(&mut app);
        let messages = screen.transcript.messages();
        assert_eq!(messages.len(), 7);
        assert_eq!(messages[0].id, "init");
        for (idx, message) in messages.iter().enumerate().skip(1) {
            let expected = if idx % 2 == 1 {
                ChatRole::User
            } else {
                ChatRole::Assistant
            };
            assert_eq!(message.role, expected);
        }
        assert_eq!(screen.state, RequestState::Idle);
    }

    #[test]
    fn failed_dispatch_resolves_pending_requests() {
        let mut app = app_on(Screen::Assistant);
        assistant(&mut app).input = "hello".to_string();
        let command = app.submit_chat().expect("command");
        app.dispatch_failed(command);
        let screen = assistant(&mut app);
        assert_eq!(screen.state, RequestState::Idle);
        let last = screen.transcript.messages().last().expect("message");
        assert!(last.is_error);
        assert_eq!(last.text, CONNECT_APOLOGY);

        let mut app = app_on(Screen::PredictionEngine);
        fill_form(&mut app);
        let command = app.submit_prediction().expect("command");
        app.dispatch_failed(command);
        assert_eq!(
            prediction(&app).state,
            RequestState::Ready(Forecast::fallback("Connaught Place"))
        );
    }

    #[test]
    fn guideline_cards_toggle_and_stay_in_range() {
        let mut screen = GuidelinesScreen::default();
        assert!(screen.points().iter().all(|point| !screen.is_expanded(point.id)));

        screen.select_next(1);
        screen.toggle_selected();
        assert!(screen.is_expanded(2));
        assert!(!screen.is_expanded(1));
        screen.toggle_selected();
        assert!(!screen.is_expanded(2));

        screen.select_next(100);
        assert_eq!(screen.selected, 14);
        screen.select_prev(100);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn changing_category_resets_selection_but_keeps_expansion() {
        let mut screen = GuidelinesScreen::default();
        screen.select_last();
        screen.toggle_selected();
        assert!(screen.is_expanded(15));

        screen.next_filter();
        assert_eq!(screen.selected, 0);
        let count = screen.points().len();
        screen.select_next(100);
        assert_eq!(screen.selected, count - 1);

        screen.prev_filter();
        assert!(screen.is_expanded(15));
    }
}
