//! The UI surface the widget drives.
//!
//! A [`WidgetView`] is whatever renders the widget: a browser DOM binding, a
//! terminal, or the in-memory [`HeadlessView`]. The widget only calls
//! methods for elements the view reported at mount, so implementations do
//! not need their own presence checks.

use std::collections::BTreeSet;

use super::PlaceholderId;
use super::element::Element;
use crate::message::Message;

/// Height of the text input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputHeight {
    /// Natural height (a single row).
    #[default]
    Auto,
    /// Explicit height in pixels.
    Pixels(u32),
}

/// Rendering surface for a chat widget.
pub trait WidgetView {
    /// Whether the surface provides the given element.
    fn has_element(&self, element: Element) -> bool;

    /// Show or hide the chat panel.
    fn set_panel_visible(&mut self, visible: bool);

    /// Show or hide the backdrop.
    fn set_backdrop_visible(&mut self, visible: bool);

    /// Move keyboard focus into the text input.
    fn focus_input(&mut self);

    /// Empty the text input.
    fn clear_input(&mut self);

    /// Height the input's content needs, in pixels.
    fn input_scroll_height(&self) -> u32;

    /// Resize the text input.
    fn set_input_height(&mut self, height: InputHeight);

    /// Append a message row to the list.
    fn append_message(&mut self, message: &Message);

    /// Append the typing placeholder row.
    fn show_typing(&mut self, id: PlaceholderId);

    /// Remove the typing placeholder row with this id.
    fn hide_typing(&mut self, id: PlaceholderId);

    /// Scroll the message list so the newest row is visible.
    fn scroll_to_bottom(&mut self);

    /// The host echoed the user's input below the last row.
    ///
    /// Surfaces that do not echo input (a DOM) have nothing to do.
    fn input_echoed(&mut self) {}

    /// Tell the user a submit was dropped because an answer is outstanding.
    fn show_busy(&mut self) {}
}

/// A row in a [`HeadlessView`] message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// A rendered message.
    Message(Message),
    /// A typing placeholder.
    Typing(PlaceholderId),
}

/// In-memory surface that records everything the widget does to it.
#[derive(Debug, Clone)]
pub struct HeadlessView {
    elements: BTreeSet<Element>,
    panel_visible: bool,
    backdrop_visible: bool,
    focus_requests: usize,
    input: String,
    input_height: InputHeight,
    line_height: u32,
    rows: Vec<Row>,
    scroll_requests: usize,
    busy_notices: usize,
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessView {
    /// A surface with every element present.
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: Element::ALL.into_iter().collect(),
            panel_visible: false,
            backdrop_visible: false,
            focus_requests: 0,
            input: String::new(),
            input_height: InputHeight::Auto,
            line_height: 24,
            rows: Vec::new(),
            scroll_requests: 0,
            busy_notices: 0,
        }
    }

    /// Remove elements from the surface.
    #[must_use]
    pub fn without(mut self, elements: &[Element]) -> Self {
        for element in elements {
            self.elements.remove(element);
        }
        self
    }

    /// Replace the input's content, as a user typing would.
    pub fn type_text(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Current input content.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current input height.
    pub fn input_height(&self) -> InputHeight {
        self.input_height
    }

    /// Whether the panel is shown.
    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    /// Whether the backdrop is shown.
    pub fn backdrop_visible(&self) -> bool {
        self.backdrop_visible
    }

    /// How many times focus was requested.
    pub fn focus_requests(&self) -> usize {
        self.focus_requests
    }

    /// How many times the list was scrolled to the bottom.
    pub fn scroll_requests(&self) -> usize {
        self.scroll_requests
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of typing placeholders currently shown.
    pub fn typing_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, Row::Typing(_)))
            .count()
    }

    /// How many busy notices were shown.
    pub fn busy_notices(&self) -> usize {
        self.busy_notices
    }
}

impl WidgetView for HeadlessView {
    fn has_element(&self, element: Element) -> bool {
        self.elements.contains(&element)
    }

    fn set_panel_visible(&mut self, visible: bool) {
        self.panel_visible = visible;
    }

    fn set_backdrop_visible(&mut self, visible: bool) {
        self.backdrop_visible = visible;
    }

    fn focus_input(&mut self) {
        self.focus_requests += 1;
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn input_scroll_height(&self) -> u32 {
        let lines = u32::try_from(self.input.lines().count().max(1)).unwrap_or(u32::MAX);
        lines.saturating_mul(self.line_height)
    }

    fn set_input_height(&mut self, height: InputHeight) {
        self.input_height = height;
    }

    fn append_message(&mut self, message: &Message) {
        self.rows.push(Row::Message(message.clone()));
    }

    fn show_typing(&mut self, id: PlaceholderId) {
        self.rows.push(Row::Typing(id));
    }

    fn hide_typing(&mut self, id: PlaceholderId) {
        self.rows.retain(|r| *r != Row::Typing(id));
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_requests += 1;
    }

    fn show_busy(&mut self) {
        self.busy_notices += 1;
    }
}
