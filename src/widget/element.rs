//! UI element roles and presence probing.

use std::collections::BTreeSet;

use super::view::WidgetView;

/// A UI element the widget expects on its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    /// Floating button that opens the panel.
    Launcher,
    /// The chat panel itself.
    Panel,
    /// Dimmed backdrop behind the open panel.
    Backdrop,
    /// Close control inside the panel header.
    CloseControl,
    /// Auto-growing text input.
    Input,
    /// Send button next to the input.
    SendButton,
    /// Scrollable list of messages.
    MessageList,
}

impl Element {
    /// Every element role, in DOM order.
    pub const ALL: [Self; 7] = [
        Self::Launcher,
        Self::Panel,
        Self::Backdrop,
        Self::CloseControl,
        Self::Input,
        Self::SendButton,
        Self::MessageList,
    ];

    /// Element id used by the page markup.
    #[must_use]
    pub fn dom_id(self) -> &'static str {
        match self {
            Self::Launcher => "chatButton",
            Self::Panel => "chatModal",
            Self::Backdrop => "chatOverlay",
            Self::CloseControl => "chatClose",
            Self::Input => "chatInput",
            Self::SendButton => "sendButton",
            Self::MessageList => "chatMessages",
        }
    }

    /// Whether the widget cannot work without this element.
    #[must_use]
    pub fn is_required(self) -> bool {
        matches!(self, Self::Panel | Self::Input | Self::MessageList)
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.dom_id())
    }
}

/// The set of elements found on a surface at mount time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Elements {
    present: BTreeSet<Element>,
}

impl Elements {
    /// Ask the view which elements exist.
    pub fn probe<V: WidgetView + ?Sized>(view: &V) -> Self {
        Self {
            present: Element::ALL
                .into_iter()
                .filter(|e| view.has_element(*e))
                .collect(),
        }
    }

    /// Whether the element was present.
    #[must_use]
    pub fn contains(&self, element: Element) -> bool {
        self.present.contains(&element)
    }

    /// Required elements that are absent.
    #[must_use]
    pub fn missing_required(&self) -> Vec<Element> {
        self.missing().filter(|e| e.is_required()).collect()
    }

    /// Optional elements that are absent.
    #[must_use]
    pub fn missing_optional(&self) -> Vec<Element> {
        self.missing().filter(|e| !e.is_required()).collect()
    }

    fn missing(&self) -> impl Iterator<Item = Element> + '_ {
        Element::ALL
            .into_iter()
            .filter(|e| !self.present.contains(e))
    }
}

impl FromIterator<Element> for Elements {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self {
            present: iter.into_iter().collect(),
        }
    }
}
