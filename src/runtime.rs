//! Event loop that owns a widget.
//!
//! [`WidgetRuntime`] is the single owner of a [`Widget`] and its view. UI
//! events come in through a [`WidgetHandle`]; each outbound question runs in
//! its own task and reports back through the same channel, so the loop keeps
//! handling opens, closes and input while an answer is outstanding.
//!
//! Events are only honored for elements that exist on the mounted view (see
//! [`EventBindings`]). There is no page-wide listener.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use faq_chat_widget::client::HttpAnswerClient;
//! use faq_chat_widget::config::WidgetSettings;
//! use faq_chat_widget::runtime::{UiEvent, WidgetRuntime};
//! use faq_chat_widget::widget::{HeadlessView, Widget};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Arc::new(HttpAnswerClient::new("http://127.0.0.1:8000")?);
//! let widget = Widget::mount(HeadlessView::new(), WidgetSettings::default());
//! let (runtime, handle) = WidgetRuntime::new(widget, service);
//!
//! handle.send(UiEvent::LauncherClicked);
//! handle.send(UiEvent::EnterPressed("How do I apply?".into()));
//! handle.shutdown();
//!
//! let widget = runtime.run().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::client::{Answer, AnswerService};
use crate::error::Result;
use crate::widget::{Element, Elements, PlaceholderId, Widget, WidgetView};

/// Something the user did on the widget's surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Launcher button clicked.
    LauncherClicked,
    /// Close control clicked.
    CloseClicked,
    /// Backdrop clicked.
    BackdropClicked,
    /// Input content changed.
    InputChanged,
    /// Send button clicked with the input's current text.
    SendClicked(String),
    /// Enter pressed in the input with its current text.
    EnterPressed(String),
}

impl UiEvent {
    /// Element the event originates from.
    #[must_use]
    pub fn source(&self) -> Element {
        match self {
            Self::LauncherClicked => Element::Launcher,
            Self::CloseClicked => Element::CloseControl,
            Self::BackdropClicked => Element::Backdrop,
            Self::InputChanged | Self::EnterPressed(_) => Element::Input,
            Self::SendClicked(_) => Element::SendButton,
        }
    }
}

/// Elements whose events the runtime listens to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBindings {
    bound: Elements,
}

impl EventBindings {
    /// Bind every element the widget found at mount. An inert widget binds nothing.
    pub fn for_widget<V: WidgetView>(widget: &Widget<V>) -> Self {
        Self {
            bound: widget
                .live()
                .map(|w| w.elements().clone())
                .unwrap_or_default(),
        }
    }

    /// Whether an event should reach the widget.
    #[must_use]
    pub fn accepts(&self, event: &UiEvent) -> bool {
        self.bound.contains(event.source())
    }
}

enum RuntimeMessage {
    Ui(UiEvent),
    Settled {
        id: PlaceholderId,
        outcome: Result<Answer>,
    },
    Shutdown,
}

impl std::fmt::Debug for RuntimeMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ui(event) => f.debug_tuple("Ui").field(event).finish(),
            Self::Settled { id, outcome } => f
                .debug_struct("Settled")
                .field("id", id)
                .field("ok", &outcome.is_ok())
                .finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Sends events into a running [`WidgetRuntime`].
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    tx: mpsc::UnboundedSender<RuntimeMessage>,
}

impl WidgetHandle {
    /// Deliver a UI event. Returns `false` once the runtime has stopped.
    pub fn send(&self, event: UiEvent) -> bool {
        self.tx.send(RuntimeMessage::Ui(event)).is_ok()
    }

    /// Ask the runtime to stop once no question is outstanding.
    pub fn shutdown(&self) {
        let _ = self.tx.send(RuntimeMessage::Shutdown);
    }
}

/// Single-owner event loop for a widget.
pub struct WidgetRuntime<V> {
    widget: Widget<V>,
    service: Arc<dyn AnswerService>,
    bindings: EventBindings,
    tx: mpsc::UnboundedSender<RuntimeMessage>,
    rx: mpsc::UnboundedReceiver<RuntimeMessage>,
}

impl<V: std::fmt::Debug> std::fmt::Debug for WidgetRuntime<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetRuntime")
            .field("widget", &self.widget)
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl<V: WidgetView> WidgetRuntime<V> {
    /// Create a runtime and the handle that feeds it.
    pub fn new(widget: Widget<V>, service: Arc<dyn AnswerService>) -> (Self, WidgetHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let bindings = EventBindings::for_widget(&widget);
        let handle = WidgetHandle { tx: tx.clone() };
        (
            Self {
                widget,
                service,
                bindings,
                tx,
                rx,
            },
            handle,
        )
    }

    /// Process events until shut down, then return the widget.
    ///
    /// Shutdown waits for an outstanding answer to settle.
    pub async fn run(mut self) -> Widget<V> {
        let mut draining = false;
        while let Some(message) = self.rx.recv().await {
            trace!(name: "runtime.message", message = ?message, "Runtime message");
            match message {
                RuntimeMessage::Ui(event) => self.dispatch(event),
                RuntimeMessage::Settled { id, outcome } => {
                    self.widget.settle(id, outcome);
                }
                RuntimeMessage::Shutdown => draining = true,
            }
            if draining && !self.widget.is_waiting() {
                break;
            }
        }
        debug!(name: "runtime.stopped", "Widget runtime stopped");
        self.widget
    }

    fn dispatch(&mut self, event: UiEvent) {
        if !self.bindings.accepts(&event) {
            trace!(
                name: "runtime.event.unbound",
                source = %event.source(),
                "Ignoring event from unbound element"
            );
            return;
        }

        self.widget.input_echoed();
        match event {
            UiEvent::LauncherClicked => self.widget.open(),
            UiEvent::CloseClicked | UiEvent::BackdropClicked => self.widget.close(),
            UiEvent::InputChanged => self.widget.input_changed(),
            UiEvent::SendClicked(text) | UiEvent::EnterPressed(text) => self.submit(&text),
        }
    }

    fn submit(&mut self, text: &str) {
        let Some(pending) = self.widget.begin_submit(text) else {
            return;
        };

        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = service.ask(&pending.question).await;
            let _ = tx.send(RuntimeMessage::Settled {
                id: pending.id,
                outcome,
            });
        });
    }
}
