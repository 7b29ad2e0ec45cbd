//! Page event loop
//!
//! [`Page`] owns the document and everything the host environment would
//! otherwise provide: a virtual millisecond clock, timers, the viewport and
//! its scroll position, and event listeners. All work runs on one thread;
//! timers and listeners are callbacks invoked with `&mut Page`.
//!
//! Time only moves when the owner advances it:
//!
//! ```rust
//! use folio_core::page::Page;
//! use folio_core::document::Document;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let mut page = Page::new(Document::new());
//! let fired = Rc::new(Cell::new(0));
//! let counter = fired.clone();
//! page.set_interval(100, move |page, id| {
//!     counter.set(counter.get() + 1);
//!     if counter.get() == 3 {
//!         page.clear_timer(id);
//!     }
//! });
//! page.advance(1_000);
//! assert_eq!(fired.get(), 3);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::SlotMap;

use crate::document::{Document, ElementId};
use crate::events::{Event, EventData, EventTarget, EventType, KeyCode, ListenerId};
use crate::geometry::Bounds;
use crate::timer::{TimerId, Timers};

/// Body class that locks user scrolling while an overlay or menu is open
pub const SCROLL_LOCK_CLASS: &str = "no-scroll";

/// Default viewport height in CSS pixels
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 800.0;

type Handler = Rc<RefCell<dyn FnMut(&mut Page, &Event)>>;

struct ListenerEntry {
    target: EventTarget,
    event_type: EventType,
    seq: u64,
    handler: Handler,
}

/// Single-threaded page runtime
pub struct Page {
    document: Document,
    timers: Timers,
    listeners: SlotMap<ListenerId, ListenerEntry>,
    next_listener_seq: u64,
    now: u64,
    viewport_height: f32,
    scroll_top: f32,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            timers: Timers::default(),
            listeners: SlotMap::with_key(),
            next_listener_seq: 0,
            now: 0,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_top: 0.0,
        }
    }

    pub fn with_viewport_height(mut self, height: f32) -> Self {
        self.viewport_height = height.max(0.0);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Milliseconds since the page loaded
    pub fn now(&self) -> u64 {
        self.now
    }

    // ========================================================================
    // Timers
    // ========================================================================

    /// Run `callback` once, `delay_ms` from now
    pub fn set_timeout<F>(&mut self, delay_ms: u64, callback: F) -> TimerId
    where
        F: FnOnce(&mut Page) + 'static,
    {
        let mut callback = Some(callback);
        self.timers.insert(
            self.now.saturating_add(delay_ms),
            None,
            Box::new(move |page, _| {
                if let Some(callback) = callback.take() {
                    callback(page);
                }
            }),
        )
    }

    /// Run `callback` every `period_ms` (at least 1 ms) until cleared
    pub fn set_interval<F>(&mut self, period_ms: u64, callback: F) -> TimerId
    where
        F: FnMut(&mut Page, TimerId) + 'static,
    {
        let period = period_ms.max(1);
        self.timers
            .insert(self.now.saturating_add(period), Some(period), Box::new(callback))
    }

    /// Cancel a timer; returns whether it was still scheduled
    pub fn clear_timer(&mut self, id: TimerId) -> bool {
        self.timers.clear(id)
    }

    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.timers.contains(id)
    }

    /// Number of scheduled timeouts and intervals
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock forward by `ms`, firing every timer that comes due
    pub fn advance(&mut self, ms: u64) {
        let deadline = self.now.saturating_add(ms);
        self.run_until(deadline);
    }

    /// Move the clock to `deadline`, firing every timer that comes due
    pub fn run_until(&mut self, deadline: u64) {
        while let Some(id) = self.timers.next_due(deadline) {
            self.fire_timer(id);
        }
        self.now = self.now.max(deadline);
    }

    /// Fire timers that are already due without moving the clock
    pub fn run_pending(&mut self) {
        self.run_until(self.now);
    }

    fn fire_timer(&mut self, id: TimerId) {
        let Some((due, mut callback)) = self.timers.take(id) else {
            return;
        };
        self.now = self.now.max(due);
        callback(self, id);
        self.timers.finish(id, callback);
    }

    // ========================================================================
    // Listeners and dispatch
    // ========================================================================

    pub fn add_listener<F>(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        handler: F,
    ) -> ListenerId
    where
        F: FnMut(&mut Page, &Event) + 'static,
    {
        let seq = self.next_listener_seq;
        self.next_listener_seq += 1;
        self.listeners.insert(ListenerEntry {
            target,
            event_type,
            seq,
            handler: Rc::new(RefCell::new(handler)),
        })
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn handlers_for(&self, target: EventTarget, event_type: EventType) -> Vec<Handler> {
        let mut matching: Vec<(u64, Handler)> = self
            .listeners
            .values()
            .filter(|l| l.target == target && l.event_type == event_type)
            .map(|l| (l.seq, Rc::clone(&l.handler)))
            .collect();
        matching.sort_by_key(|(seq, _)| *seq);
        matching.into_iter().map(|(_, handler)| handler).collect()
    }

    /// Deliver an event
    ///
    /// Clicks on elements outside the document are dropped.
    pub fn dispatch(&mut self, data: EventData) {
        let path: Vec<EventTarget> = match &data {
            EventData::Click { target } => {
                if !self.document.contains(*target) {
                    tracing::debug!("dropping click on detached element {:?}", target);
                    return;
                }
                std::iter::once(*target)
                    .chain(self.document.ancestors(*target))
                    .map(EventTarget::Element)
                    .chain(std::iter::once(EventTarget::Document))
                    .collect()
            }
            EventData::KeyDown { .. } | EventData::Scroll { .. } => vec![EventTarget::Document],
        };

        let event_type = data.event_type();
        for current_target in path {
            let event = Event {
                data: data.clone(),
                current_target,
            };
            for handler in self.handlers_for(current_target, event_type) {
                match handler.try_borrow_mut() {
                    Ok(mut handler) => (&mut *handler)(self, &event),
                    Err(_) => tracing::warn!("skipping re-entrant {:?} listener", event_type),
                }
            }
        }
    }

    pub fn click(&mut self, target: ElementId) {
        self.dispatch(EventData::Click { target });
    }

    pub fn key_down(&mut self, key: KeyCode) {
        self.dispatch(EventData::KeyDown { key });
    }

    // ========================================================================
    // Viewport and scrolling
    // ========================================================================

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Visible region in document coordinates
    pub fn viewport(&self) -> Bounds {
        Bounds::new(self.scroll_top, self.viewport_height)
    }

    /// Total scrollable height (never less than the viewport)
    pub fn scroll_height(&self) -> f32 {
        self.document.content_height().max(self.viewport_height)
    }

    pub fn max_scroll(&self) -> f32 {
        (self.scroll_height() - self.viewport_height).max(0.0)
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.document
            .has_class(self.document.body(), SCROLL_LOCK_CLASS)
    }

    /// Programmatic scroll; clamps to the scrollable range and dispatches a
    /// scroll event
    pub fn scroll_to(&mut self, top: f32) {
        let clamped = top.clamp(0.0, self.max_scroll());
        self.scroll_top = clamped;
        self.dispatch(EventData::Scroll { top: clamped });
    }

    /// Scroll initiated by the user; ignored while the page is scroll-locked
    pub fn user_scroll(&mut self, top: f32) -> bool {
        if self.is_scroll_locked() {
            tracing::trace!("user scroll ignored while locked");
            return false;
        }
        self.scroll_to(top);
        true
    }

    /// Change the viewport height (e.g. window resize) and re-dispatch scroll
    pub fn resize(&mut self, viewport_height: f32) {
        self.viewport_height = viewport_height.max(0.0);
        let top = self.scroll_top;
        self.scroll_to(top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{div, element};
    use std::cell::Cell;

    fn tall_page() -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(body, div().id("content").at(0.0, 3000.0)).unwrap();
        Page::new(doc)
    }

    #[test]
    fn test_timeout_fires_once_at_due_time() {
        let mut page = tall_page();
        let fired_at = Rc::new(Cell::new(None));
        let slot = fired_at.clone();
        page.set_timeout(250, move |page| slot.set(Some(page.now())));

        page.advance(249);
        assert_eq!(fired_at.get(), None);
        page.advance(1);
        assert_eq!(fired_at.get(), Some(250));
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn test_zero_delay_runs_pending_without_moving_clock() {
        let mut page = tall_page();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        page.set_timeout(0, move |_| flag.set(true));
        page.run_pending();
        assert!(fired.get());
        assert_eq!(page.now(), 0);
    }

    #[test]
    fn test_interval_ticks_are_spaced_by_period() {
        let mut page = tall_page();
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let log = ticks.clone();
        page.set_interval(70, move |page, id| {
            log.borrow_mut().push(page.now());
            if log.borrow().len() == 4 {
                page.clear_timer(id);
            }
        });
        page.advance(10_000);
        assert_eq!(*ticks.borrow(), vec![70, 140, 210, 280]);
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn test_timers_scheduled_from_callbacks_run_in_same_advance() {
        let mut page = tall_page();
        let fired_at = Rc::new(Cell::new(0));
        let slot = fired_at.clone();
        page.set_timeout(100, move |page| {
            page.set_timeout(50, move |page| slot.set(page.now()));
        });
        page.advance(200);
        assert_eq!(fired_at.get(), 150);
        assert_eq!(page.now(), 200);
    }

    #[test]
    fn test_click_bubbles_to_ancestors() {
        let mut doc = Document::new();
        let body = doc.body();
        let card = doc
            .append(body, div().class("card").child(element("img").attr("src", "a.png")))
            .unwrap();
        let img = doc.children(card)[0];
        let mut page = Page::new(doc);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        page.add_listener(EventTarget::Element(card), EventType::Click, move |_, event| {
            log.borrow_mut().push(("card", event.is_at_target()));
        });
        let log = seen.clone();
        page.add_listener(EventTarget::Document, EventType::Click, move |_, _| {
            log.borrow_mut().push(("document", false));
        });

        page.click(img);
        page.click(card);
        assert_eq!(
            *seen.borrow(),
            vec![("card", false), ("document", false), ("card", true), ("document", false)]
        );
    }

    #[test]
    fn test_scroll_clamps_and_notifies() {
        let mut page = tall_page();
        let tops = Rc::new(RefCell::new(Vec::new()));
        let log = tops.clone();
        page.add_listener(EventTarget::Document, EventType::Scroll, move |page, _| {
            log.borrow_mut().push(page.scroll_top());
        });

        page.scroll_to(500.0);
        page.scroll_to(10_000.0);
        page.scroll_to(-5.0);
        assert_eq!(*tops.borrow(), vec![500.0, 2200.0, 0.0]);
    }

    #[test]
    fn test_user_scroll_respects_lock() {
        let mut page = tall_page();
        let body = page.document().body();
        page.document_mut().add_class(body, SCROLL_LOCK_CLASS).unwrap();
        assert!(!page.user_scroll(400.0));
        assert_eq!(page.scroll_top(), 0.0);

        page.document_mut().remove_class(body, SCROLL_LOCK_CLASS).unwrap();
        assert!(page.user_scroll(400.0));
        assert_eq!(page.scroll_top(), 400.0);
    }

    #[test]
    fn test_removed_listener_is_silent() {
        let mut page = tall_page();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let id = page.add_listener(EventTarget::Document, EventType::KeyDown, move |_, _| {
            counter.set(counter.get() + 1)
        });
        page.key_down(KeyCode::Escape);
        assert!(page.remove_listener(id));
        page.key_down(KeyCode::Escape);
        assert_eq!(count.get(), 1);
    }
}
