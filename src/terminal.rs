//! Line-oriented terminal surface.
//!
//! The terminal has no backdrop or send button: `/open` and `/close` stand in
//! for the launcher and close control, and Enter submits. Messages that
//! arrive while the panel is closed are held back and printed on the next
//! open.

use std::io::Write;

use tracing::{trace, warn};

use crate::message::{Message, Sender};
use crate::widget::{Element, InputHeight, PlaceholderId, WidgetView};

const TYPING_LINE: &str = "bot is typing...";
const BUSY_LINE: &str = "-- still waiting for the last answer, not sent --";

/// [`WidgetView`] that prints to any writer.
#[derive(Debug)]
pub struct TerminalView<W> {
    out: W,
    ansi: bool,
    visible: bool,
    backlog: Vec<String>,
    typing: Option<PlaceholderId>,
    typing_is_last: bool,
}

impl<W: Write> TerminalView<W> {
    /// Create a view. With `ansi` set, the typing line is erased when the
    /// answer arrives.
    pub fn new(out: W, ansi: bool) -> Self {
        Self {
            out,
            ansi,
            visible: false,
            backlog: Vec::new(),
            typing: None,
            typing_is_last: false,
        }
    }

    /// Consume the view, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!(name: "terminal.write.failed", error = %e, "Failed to write to terminal");
        }
        self.typing_is_last = false;
    }

    fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!(name: "terminal.flush.failed", error = %e, "Failed to flush terminal");
        }
    }
}

/// Render a message as terminal lines.
pub fn format_message(message: &Message) -> String {
    let label = match message.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    let stamp = message.sent_at.format("%H:%M");
    let prefix = format!("[{stamp}] {label}: ");
    let indent = " ".repeat(prefix.len());

    let mut out = String::new();
    for (i, line) in message.content.lines().enumerate() {
        if i == 0 {
            out.push_str(&prefix);
        } else {
            out.push('\n');
            out.push_str(&indent);
        }
        out.push_str(line);
    }
    if out.is_empty() {
        out = prefix;
    }
    out
}

impl<W: Write> WidgetView for TerminalView<W> {
    fn has_element(&self, element: Element) -> bool {
        !matches!(element, Element::Backdrop | Element::SendButton)
    }

    fn set_panel_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.write_line("-- chat open (/close to hide, /quit to exit) --");
            for line in std::mem::take(&mut self.backlog) {
                self.write_line(&line);
            }
            if self.typing.is_some() {
                self.write_line(TYPING_LINE);
                self.typing_is_last = true;
            }
        } else {
            self.write_line("-- chat closed (/open to show) --");
        }
        self.flush();
    }

    fn set_backdrop_visible(&mut self, _visible: bool) {}

    fn focus_input(&mut self) {
        trace!(name: "terminal.focus", "Input focused");
    }

    fn clear_input(&mut self) {}

    fn input_scroll_height(&self) -> u32 {
        0
    }

    fn set_input_height(&mut self, _height: InputHeight) {}

    fn append_message(&mut self, message: &Message) {
        let text = format_message(message);
        if self.visible {
            self.write_line(&text);
        } else {
            self.backlog.push(text);
        }
    }

    fn show_typing(&mut self, id: PlaceholderId) {
        self.typing = Some(id);
        if self.visible {
            self.write_line(TYPING_LINE);
            self.typing_is_last = true;
        }
    }

    fn hide_typing(&mut self, id: PlaceholderId) {
        if self.typing != Some(id) {
            return;
        }
        self.typing = None;
        if self.visible && self.ansi && self.typing_is_last {
            // Cursor up one line, then clear it.
            if let Err(e) = write!(self.out, "\x1b[1A\x1b[2K") {
                warn!(name: "terminal.write.failed", error = %e, "Failed to write to terminal");
            }
            self.typing_is_last = false;
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.flush();
    }

    fn input_echoed(&mut self) {
        // The echoed line now sits below the typing line.
        self.typing_is_last = false;
    }

    fn show_busy(&mut self) {
        self.write_line(BUSY_LINE);
        self.flush();
    }
}
