//! The chat widget state machine.
//!
//! [`ChatWidget`] owns a [`WidgetView`], the open/closed state, the ordered
//! message list and the typing-placeholder lifecycle.
//!
//! # Submitting
//!
//! A submit runs in two phases so an event loop can stay responsive while the
//! answer is outstanding:
//!
//! 1. [`ChatWidget::begin_submit`] appends the user message, clears the input
//!    and shows the typing placeholder.
//! 2. [`ChatWidget::settle`] removes that placeholder and appends the bot
//!    reply (or the fallback text).
//!
//! [`ChatWidget::submit`] runs both phases around a single await.
//!
//! Only one question may be outstanding. A submit while waiting is ignored
//! and leaves the input untouched.
//!
//! # Example
//!
//! ```rust
//! use faq_chat_widget::config::WidgetSettings;
//! use faq_chat_widget::widget::{ChatWidget, HeadlessView};
//!
//! let mut widget = ChatWidget::mount(HeadlessView::new(), WidgetSettings::default()).unwrap();
//! widget.open();
//! assert!(widget.is_open());
//!
//! let pending = widget.begin_submit("  Hello ").unwrap();
//! assert_eq!(pending.question, "Hello");
//! assert!(widget.is_waiting());
//! ```

mod element;
mod view;

pub use element::{Element, Elements};
pub use view::{HeadlessView, InputHeight, Row, WidgetView};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::client::{Answer, AnswerService};
use crate::config::WidgetSettings;
use crate::error::{Error, Result};
use crate::message::{Message, Sender};

/// Bot text shown when the answer service could not be reached.
pub const ERROR_FALLBACK_TEXT: &str = "Sorry, I encountered an error. Please try again later.";

/// Identifies one typing placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderId(Uuid);

impl PlaceholderId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A question waiting for its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    /// Placeholder shown while waiting.
    pub id: PlaceholderId,
    /// Trimmed question text.
    pub question: String,
}

/// Open/closed and waiting state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetState {
    /// Whether the panel is shown.
    pub is_open: bool,
    /// Placeholder of the outstanding question, if any.
    pub pending: Option<PlaceholderId>,
}

/// A mounted chat widget.
#[derive(Debug)]
pub struct ChatWidget<V> {
    view: V,
    elements: Elements,
    settings: WidgetSettings,
    state: WidgetState,
    messages: Vec<Message>,
}

impl<V: WidgetView> ChatWidget<V> {
    /// Mount the widget on a view.
    ///
    /// Fails when the panel, input or message list is missing. Other missing
    /// elements are logged and their behavior is skipped.
    pub fn mount(view: V, settings: WidgetSettings) -> Result<Self> {
        let elements = Elements::probe(&view);

        let missing = elements.missing_required();
        if !missing.is_empty() {
            return Err(Error::MissingElements(missing));
        }

        for element in elements.missing_optional() {
            warn!(
                name: "widget.element.missing",
                element = %element,
                "Optional widget element not found, behavior disabled"
            );
        }

        let mut widget = Self {
            view,
            elements,
            settings,
            state: WidgetState::default(),
            messages: Vec::new(),
        };

        info!(name: "widget.mounted", "Chat widget mounted");

        if widget.settings.start_open {
            widget.open();
        }
        Ok(widget)
    }

    /// Current state.
    pub fn state(&self) -> WidgetState {
        self.state
    }

    /// Whether the panel is open.
    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    /// Whether a question is outstanding.
    pub fn is_waiting(&self) -> bool {
        self.state.pending.is_some()
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Elements found at mount.
    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    /// The underlying view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The underlying view, mutably.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Unmount, returning the view.
    pub fn into_view(self) -> V {
        self.view
    }

    /// Show the panel and backdrop and focus the input.
    pub fn open(&mut self) {
        debug!(name: "widget.opened", "Opening chat");
        self.state.is_open = true;
        self.view.set_panel_visible(true);
        if self.elements.contains(Element::Backdrop) {
            self.view.set_backdrop_visible(true);
        }
        self.view.focus_input();
    }

    /// Hide the panel and backdrop.
    pub fn close(&mut self) {
        debug!(name: "widget.closed", "Closing chat");
        self.state.is_open = false;
        self.view.set_panel_visible(false);
        if self.elements.contains(Element::Backdrop) {
            self.view.set_backdrop_visible(false);
        }
    }

    /// Grow the input to fit its content, up to the configured cap.
    pub fn input_changed(&mut self) {
        let height = self
            .view
            .input_scroll_height()
            .min(self.settings.max_input_height);
        self.view.set_input_height(InputHeight::Pixels(height));
    }

    /// Forward a host input echo to the view.
    pub fn input_echoed(&mut self) {
        self.view.input_echoed();
    }

    /// Append a message and scroll it into view.
    pub fn render_message(&mut self, sender: Sender, content: impl Into<String>) {
        let message = Message::new(sender, content);
        self.view.append_message(&message);
        self.view.scroll_to_bottom();
        self.messages.push(message);
    }

    /// First phase of a submit.
    ///
    /// Returns `None` when the trimmed text is empty or another question is
    /// still outstanding.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingQuestion> {
        let question = text.trim();
        if question.is_empty() {
            return None;
        }
        if let Some(pending) = self.state.pending {
            debug!(
                name: "widget.submit.ignored",
                pending = %pending,
                "Question already outstanding, ignoring submit"
            );
            self.view.show_busy();
            return None;
        }

        info!(name: "widget.submit", question_len = question.len(), "Submitting question");

        self.render_message(Sender::User, question);
        self.view.clear_input();
        self.view.set_input_height(InputHeight::Auto);

        let id = PlaceholderId::new();
        self.view.show_typing(id);
        self.view.scroll_to_bottom();
        self.state.pending = Some(id);

        Some(PendingQuestion {
            id,
            question: question.to_owned(),
        })
    }

    /// Second phase of a submit.
    ///
    /// Returns `false` when `id` is not the outstanding placeholder; the
    /// outcome is then dropped.
    pub fn settle(&mut self, id: PlaceholderId, outcome: Result<Answer>) -> bool {
        if self.state.pending != Some(id) {
            warn!(
                name: "widget.settle.stale",
                placeholder = %id,
                "Dropping answer for a placeholder that is not pending"
            );
            return false;
        }

        self.state.pending = None;
        self.view.hide_typing(id);

        let text = match outcome {
            Ok(answer) => {
                if answer.needs_confirmation {
                    debug!(name: "widget.answer.confirmation", "Answer asks for confirmation");
                }
                answer.display_text().to_owned()
            }
            Err(err) => {
                error!(name: "widget.answer.failed", error = %err, "Error calling answer service");
                ERROR_FALLBACK_TEXT.to_owned()
            }
        };

        self.render_message(Sender::Bot, text);
        true
    }

    /// Submit a question and wait for its answer.
    ///
    /// Returns `true` when a bot message was appended.
    pub async fn submit(&mut self, service: &dyn AnswerService, text: &str) -> bool {
        let Some(pending) = self.begin_submit(text) else {
            return false;
        };
        let outcome = service.ask(&pending.question).await;
        self.settle(pending.id, outcome)
    }
}

/// A widget that may have failed to mount.
///
/// [`Widget::Inert`] accepts every operation and does nothing, so a page with
/// broken markup keeps working without the chat.
#[derive(Debug)]
pub enum Widget<V> {
    /// Mounted and working.
    Live(ChatWidget<V>),
    /// Mount failed; every operation is a no-op.
    Inert,
}

impl<V: WidgetView> Widget<V> {
    /// Mount, falling back to an inert widget.
    pub fn mount(view: V, settings: WidgetSettings) -> Self {
        match ChatWidget::mount(view, settings) {
            Ok(widget) => Self::Live(widget),
            Err(err) => {
                error!(name: "widget.mount.failed", error = %err, "Chat widget disabled");
                Self::Inert
            }
        }
    }

    /// The live widget, if mounted.
    pub fn live(&self) -> Option<&ChatWidget<V>> {
        match self {
            Self::Live(w) => Some(w),
            Self::Inert => None,
        }
    }

    /// The live widget, mutably.
    pub fn live_mut(&mut self) -> Option<&mut ChatWidget<V>> {
        match self {
            Self::Live(w) => Some(w),
            Self::Inert => None,
        }
    }

    /// Whether the widget mounted.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// Whether a question is outstanding.
    pub fn is_waiting(&self) -> bool {
        self.live().is_some_and(ChatWidget::is_waiting)
    }

    /// See [`ChatWidget::open`].
    pub fn open(&mut self) {
        if let Some(w) = self.live_mut() {
            w.open();
        }
    }

    /// See [`ChatWidget::close`].
    pub fn close(&mut self) {
        if let Some(w) = self.live_mut() {
            w.close();
        }
    }

    /// See [`ChatWidget::input_changed`].
    pub fn input_changed(&mut self) {
        if let Some(w) = self.live_mut() {
            w.input_changed();
        }
    }

    /// See [`ChatWidget::begin_submit`].
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingQuestion> {
        self.live_mut().and_then(|w| w.begin_submit(text))
    }

    /// See [`ChatWidget::input_echoed`].
    pub fn input_echoed(&mut self) {
        if let Some(w) = self.live_mut() {
            w.input_echoed();
        }
    }

    /// See [`ChatWidget::settle`].
    pub fn settle(&mut self, id: PlaceholderId, outcome: Result<Answer>) -> bool {
        self.live_mut().is_some_and(|w| w.settle(id, outcome))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::client::NO_RESPONSE_TEXT;

    /// Answers every question from a fixed script and records what was asked.
    struct ScriptedService {
        reply: fn() -> Result<Answer>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn new(reply: fn() -> Result<Answer>) -> Self {
            Self {
                reply,
                asked: Mutex::new(Vec::new()),
            }
        }

        fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl AnswerService for ScriptedService {
        async fn ask(&self, question: &str) -> Result<Answer> {
            self.asked.lock().unwrap().push(question.to_owned());
            (self.reply)()
        }
    }

    fn mounted() -> ChatWidget<HeadlessView> {
        ChatWidget::mount(HeadlessView::new(), WidgetSettings::default()).unwrap()
    }

    #[test]
    fn test_mount_requires_core_elements() {
        let view = HeadlessView::new().without(&[Element::Panel, Element::Input]);
        let err = ChatWidget::mount(view, WidgetSettings::default()).unwrap_err();
        match err {
            Error::MissingElements(missing) => {
                assert_eq!(missing, vec![Element::Panel, Element::Input]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mount_tolerates_optional_elements() {
        let view = HeadlessView::new().without(&[Element::Backdrop, Element::SendButton]);
        let mut widget = ChatWidget::mount(view, WidgetSettings::default()).unwrap();

        widget.open();
        assert!(widget.view().panel_visible());
        assert!(!widget.view().backdrop_visible());
    }

    #[test]
    fn test_start_open() {
        let settings = WidgetSettings {
            start_open: true,
            ..WidgetSettings::default()
        };
        let widget = ChatWidget::mount(HeadlessView::new(), settings).unwrap();
        assert!(widget.is_open());
        assert_eq!(widget.view().focus_requests(), 1);
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut widget = mounted();

        widget.open();
        assert_eq!(widget.view().focus_requests(), 1);
        assert!(widget.view().panel_visible());
        assert!(widget.view().backdrop_visible());

        widget.open();
        assert!(widget.is_open());
        assert!(widget.view().panel_visible());
    }

    #[test]
    fn test_close_when_closed() {
        let mut widget = mounted();

        widget.close();
        assert!(!widget.is_open());
        assert!(!widget.view().panel_visible());

        widget.open();
        widget.close();
        widget.close();
        assert!(!widget.is_open());
        assert!(!widget.view().backdrop_visible());
    }

    #[test]
    fn test_whitespace_submit_is_ignored() {
        let mut widget = mounted();

        assert!(widget.begin_submit("").is_none());
        assert!(widget.begin_submit("   \n\t").is_none());
        assert!(widget.messages().is_empty());
        assert!(widget.view().rows().is_empty());
        assert!(!widget.is_waiting());
    }

    #[test]
    fn test_begin_submit_shows_placeholder() {
        let mut widget = mounted();
        widget.view_mut().type_text("  Hello  ");
        widget.input_changed();

        let pending = widget.begin_submit("  Hello  ").unwrap();

        assert_eq!(pending.question, "Hello");
        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.messages()[0].sender, Sender::User);
        assert_eq!(widget.messages()[0].content, "Hello");
        assert_eq!(widget.view().input(), "");
        assert_eq!(widget.view().input_height(), InputHeight::Auto);
        assert_eq!(widget.view().typing_rows(), 1);
        assert_eq!(widget.state().pending, Some(pending.id));
    }

    #[test]
    fn test_second_submit_while_waiting_is_ignored() {
        let mut widget = mounted();
        let first = widget.begin_submit("first").unwrap();

        widget.view_mut().type_text("second");
        assert!(widget.begin_submit("second").is_none());
        assert_eq!(widget.view().input(), "second");
        assert_eq!(widget.view().typing_rows(), 1);
        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.view().busy_notices(), 1);

        assert!(widget.settle(first.id, Ok(Answer::new("ok"))));
        assert!(widget.begin_submit("second").is_some());
    }

    #[test]
    fn test_settle_replaces_placeholder() {
        let mut widget = mounted();
        let pending = widget.begin_submit("Hello").unwrap();

        assert!(widget.settle(pending.id, Ok(Answer::new("Hi there"))));

        assert_eq!(widget.view().typing_rows(), 0);
        assert!(!widget.is_waiting());
        match widget.view().rows().last() {
            Some(Row::Message(m)) => {
                assert_eq!(m.sender, Sender::Bot);
                assert_eq!(m.content, "Hi there");
            }
            other => panic!("unexpected last row: {other:?}"),
        }
    }

    #[test]
    fn test_settle_failure_uses_fallback() {
        let mut widget = mounted();
        let pending = widget.begin_submit("Hello").unwrap();

        let err = Error::Api {
            status: 503,
            message: "unavailable".into(),
        };
        widget.settle(pending.id, Err(err));

        assert_eq!(widget.messages()[1].content, ERROR_FALLBACK_TEXT);
    }

    #[test]
    fn test_settle_stale_id_is_dropped() {
        let mut widget = mounted();
        let pending = widget.begin_submit("Hello").unwrap();
        widget.settle(pending.id, Ok(Answer::new("one")));

        assert!(!widget.settle(pending.id, Ok(Answer::new("two"))));
        assert_eq!(widget.messages().len(), 2);
    }

    #[test]
    fn test_input_grows_up_to_cap() {
        let settings = WidgetSettings {
            max_input_height: 60,
            ..WidgetSettings::default()
        };
        let mut widget = ChatWidget::mount(HeadlessView::new(), settings).unwrap();

        widget.view_mut().type_text("one line");
        widget.input_changed();
        assert_eq!(widget.view().input_height(), InputHeight::Pixels(24));

        widget.view_mut().type_text("1\n2\n3\n4\n5");
        widget.input_changed();
        assert_eq!(widget.view().input_height(), InputHeight::Pixels(60));
    }

    #[test]
    fn test_render_message_scrolls() {
        let mut widget = mounted();
        widget.render_message(Sender::Bot, "Welcome");
        assert_eq!(widget.view().scroll_requests(), 1);
        assert_eq!(widget.messages()[0].content, "Welcome");
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let service = ScriptedService::new(|| Ok(Answer::new("Hi there")));
        let mut widget = mounted();

        assert!(widget.submit(&service, "Hello").await);

        assert_eq!(service.asked(), vec!["Hello".to_string()]);
        let contents: Vec<_> = widget.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Hello", "Hi there"]);
        assert_eq!(widget.view().typing_rows(), 0);
    }

    #[tokio::test]
    async fn test_submit_empty_makes_no_call() {
        let service = ScriptedService::new(|| Ok(Answer::new("unused")));
        let mut widget = mounted();

        assert!(!widget.submit(&service, "  ").await);
        assert!(service.asked().is_empty());
        assert!(widget.messages().is_empty());
    }

    #[tokio::test]
    async fn test_submit_missing_answer() {
        let service = ScriptedService::new(|| Ok(Answer::default()));
        let mut widget = mounted();

        widget.submit(&service, "Hello").await;
        assert_eq!(widget.messages()[1].content, NO_RESPONSE_TEXT);
    }

    #[tokio::test]
    async fn test_inert_widget_is_noop() {
        let service = ScriptedService::new(|| Ok(Answer::new("unused")));
        let view = HeadlessView::new().without(&[Element::MessageList]);
        let mut widget = Widget::mount(view, WidgetSettings::default());

        assert!(!widget.is_live());
        widget.open();
        widget.close();
        widget.input_changed();
        assert!(widget.begin_submit("Hello").is_none());
        assert!(!widget.is_waiting());
        assert!(service.asked().is_empty());
    }
}
