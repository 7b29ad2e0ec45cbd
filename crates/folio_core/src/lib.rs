//! Folio Core Runtime
//!
//! This crate provides the foundational primitives for Folio page enhancements:
//!
//! - **Document Model**: elements with classes, attributes, styles, rich
//!   inline markup and layout bounds
//! - **Selectors**: the CSS subset page markup contracts are written in
//! - **Event Loop**: a single-threaded [`Page`] with a virtual clock, timers,
//!   scrolling and bubbling event dispatch
//!
//! # Example
//!
//! ```rust
//! use folio_core::{element, EventTarget, EventType, Page};
//! use folio_core::document::Document;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let button = doc.append(body, element("button").id("navToggle")).unwrap();
//!
//! let mut page = Page::new(doc);
//! page.add_listener(EventTarget::Element(button), EventType::Click, |page, _| {
//!     let body = page.document().body();
//!     page.document_mut().toggle_class(body, "no-scroll").ok();
//! });
//!
//! page.click(button);
//! assert!(page.is_scroll_locked());
//! ```

pub mod document;
pub mod error;
pub mod events;
pub mod geometry;
pub mod markup;
pub mod page;
pub mod selector;
pub mod timer;

pub use document::{div, element, ContentLock, Document, Element, ElementBuilder, ElementId};
pub use error::{DomError, Result, SelectorError};
pub use events::{Event, EventData, EventTarget, EventType, KeyCode, ListenerId};
pub use geometry::Bounds;
pub use markup::{Inline, Markup};
pub use page::{Page, DEFAULT_VIEWPORT_HEIGHT, SCROLL_LOCK_CLASS};
pub use selector::{AttrOp, AttrSelector, Compound, Selector};
pub use timer::{TimerCallback, TimerId};
