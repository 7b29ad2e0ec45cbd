//! Event types
//!
//! Events are dispatched by [`Page`](crate::page::Page). Clicks bubble from
//! their target up to `body`; key and scroll events are delivered to
//! document-level listeners only.

use slotmap::new_key_type;

use crate::document::ElementId;

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

/// Event categories listeners subscribe to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    KeyDown,
    Scroll,
}

/// Where a listener is attached
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Document,
    Element(ElementId),
}

/// Keyboard keys the page reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Char(char),
}

/// Event payload
#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    Click { target: ElementId },
    KeyDown { key: KeyCode },
    Scroll { top: f32 },
}

impl EventData {
    pub fn event_type(&self) -> EventType {
        match self {
            EventData::Click { .. } => EventType::Click,
            EventData::KeyDown { .. } => EventType::KeyDown,
            EventData::Scroll { .. } => EventType::Scroll,
        }
    }
}

/// An event as seen by one listener
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub data: EventData,
    /// The target the listener is attached to
    pub current_target: EventTarget,
}

impl Event {
    pub fn event_type(&self) -> EventType {
        self.data.event_type()
    }

    /// Element the event originated from (clicks only)
    pub fn target(&self) -> Option<ElementId> {
        match self.data {
            EventData::Click { target } => Some(target),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&KeyCode> {
        match &self.data {
            EventData::KeyDown { key } => Some(key),
            _ => None,
        }
    }

    /// Whether the event originated on the element the listener is attached to
    pub fn is_at_target(&self) -> bool {
        match (self.target(), self.current_target) {
            (Some(target), EventTarget::Element(current)) => target == current,
            _ => false,
        }
    }
}
