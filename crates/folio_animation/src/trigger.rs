//! Visibility trigger
//!
//! Watches a set of elements and fires an entrance callback when each one
//! scrolls into the viewport. An entry is detected when the visible fraction
//! of an element reaches the configured threshold while it was previously out
//! of view. After the element's delay elapses the `in-view` class is applied
//! and the callback runs.
//!
//! One-shot elements are released from observation as soon as their entry is
//! scheduled. Repeatable elements stay observed and fire again on every fresh
//! entry, but never while an earlier delayed callback is still pending.
//!
//! ```rust
//! use folio_animation::trigger::{TrackOptions, VisibilityTrigger, IN_VIEW_CLASS};
//! use folio_core::{div, Page};
//! use folio_core::document::Document;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let card = doc.append(body, div().at(100.0, 200.0)).unwrap();
//! let mut page = Page::new(doc);
//!
//! let trigger = VisibilityTrigger::install(&mut page, 0.1);
//! trigger.register(&mut page, card, TrackOptions::new().delay(150), |_, _| {});
//!
//! page.advance(150);
//! assert!(page.document().has_class(card, IN_VIEW_CLASS));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{Document, ElementId, EventTarget, EventType, ListenerId, Page};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

/// Class applied when an element has entered the viewport
pub const IN_VIEW_CLASS: &str = "in-view";

/// Default fraction of an element that must be visible
pub const DEFAULT_THRESHOLD: f32 = 0.1;

new_key_type! {
    /// Handle to an element registered with a [`VisibilityTrigger`]
    pub struct TrackableId;
}

/// Entrance callback
pub type EnterCallback = Rc<dyn Fn(&mut Page, ElementId)>;

/// What part an element plays on the page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Role {
    #[default]
    Plain,
    HeroHeading,
    HeroLead,
}

/// Registration options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackOptions {
    pub delay_ms: u64,
    pub repeatable: bool,
    pub role: Role,
}

impl TrackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn repeatable(mut self, repeatable: bool) -> Self {
        self.repeatable = repeatable;
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Per-element observation state
struct Trackable {
    element: ElementId,
    delay_ms: u64,
    role: Role,
    repeatable: bool,
    has_fired: bool,
    /// Result of the last intersection check
    in_view: bool,
    /// A delayed entrance callback is outstanding
    pending: bool,
    on_enter: EnterCallback,
}

impl Trackable {
    /// Whether an entry at this moment should schedule the callback
    fn should_fire(&self, visible: bool) -> bool {
        let entering = visible && !self.in_view;
        entering && !self.pending && (self.repeatable || !self.has_fired)
    }
}

struct TriggerInner {
    threshold: f32,
    tracked: SlotMap<TrackableId, Trackable>,
    by_element: FxHashMap<ElementId, TrackableId>,
    /// Entrances scheduled so far, per element
    fired: FxHashMap<ElementId, u64>,
    listener: Option<ListenerId>,
}

struct ScheduledEntry {
    id: TrackableId,
    element: ElementId,
    role: Role,
    delay_ms: u64,
    repeatable: bool,
    on_enter: EnterCallback,
}

/// Observes elements and fires entrance callbacks
#[derive(Clone)]
pub struct VisibilityTrigger {
    inner: Rc<RefCell<TriggerInner>>,
}

impl VisibilityTrigger {
    /// Create a trigger and attach it to the page's scroll notifications
    ///
    /// `threshold` is clamped into `(0, 1]`.
    pub fn install(page: &mut Page, threshold: f32) -> Self {
        let threshold = if threshold.is_finite() && threshold > 0.0 {
            threshold.min(1.0)
        } else {
            DEFAULT_THRESHOLD
        };
        let trigger = Self {
            inner: Rc::new(RefCell::new(TriggerInner {
                threshold,
                tracked: SlotMap::with_key(),
                by_element: FxHashMap::default(),
                fired: FxHashMap::default(),
                listener: None,
            })),
        };
        let observer = trigger.clone();
        let listener = page.add_listener(EventTarget::Document, EventType::Scroll, move |page, _| {
            observer.evaluate(page);
        });
        trigger.inner.borrow_mut().listener = Some(listener);
        trigger
    }

    /// Detach from the page and drop every observation
    pub fn disconnect(&self, page: &mut Page) {
        let mut inner = self.inner.borrow_mut();
        if let Some(listener) = inner.listener.take() {
            page.remove_listener(listener);
        }
        inner.tracked.clear();
        inner.by_element.clear();
    }

    pub fn threshold(&self) -> f32 {
        self.inner.borrow().threshold
    }

    /// Start observing `element`
    ///
    /// Returns `None` without doing anything if the element is not in the
    /// document or has already fired as a one-shot element. Registering an
    /// element that is already observed keeps the existing registration. The
    /// element is checked immediately, so one already in view fires without
    /// waiting for a scroll.
    pub fn register<F>(
        &self,
        page: &mut Page,
        element: ElementId,
        options: TrackOptions,
        on_enter: F,
    ) -> Option<TrackableId>
    where
        F: Fn(&mut Page, ElementId) + 'static,
    {
        if !page.document().contains(element) {
            tracing::debug!("visibility trigger: skipping missing element {:?}", element);
            return None;
        }
        let id = {
            let mut inner = self.inner.borrow_mut();
            if let Some(existing) = inner.by_element.get(&element) {
                tracing::debug!("visibility trigger: {:?} already observed", element);
                return Some(*existing);
            }
            if inner.fired.contains_key(&element) && !options.repeatable {
                tracing::debug!("visibility trigger: {:?} already fired", element);
                return None;
            }
            let id = inner.tracked.insert(Trackable {
                element,
                delay_ms: options.delay_ms,
                role: options.role,
                repeatable: options.repeatable,
                has_fired: false,
                in_view: false,
                pending: false,
                on_enter: Rc::new(on_enter),
            });
            inner.by_element.insert(element, id);
            id
        };
        self.evaluate(page);
        Some(id)
    }

    /// Register an element using its `data-delay` attribute as the delay
    pub fn register_marked<F>(
        &self,
        page: &mut Page,
        element: ElementId,
        options: TrackOptions,
        on_enter: F,
    ) -> Option<TrackableId>
    where
        F: Fn(&mut Page, ElementId) + 'static,
    {
        let delay_ms = delay_from_dataset(page.document(), element);
        self.register(page, element, options.delay(delay_ms), on_enter)
    }

    /// Stop observing an element; returns whether it was observed
    pub fn unobserve(&self, element: ElementId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.by_element.remove(&element) {
            Some(id) => inner.tracked.remove(id).is_some(),
            None => false,
        }
    }

    pub fn is_observing(&self, element: ElementId) -> bool {
        self.inner.borrow().by_element.contains_key(&element)
    }

    pub fn observed_count(&self) -> usize {
        self.inner.borrow().tracked.len()
    }

    /// Whether an entrance has ever been scheduled for `element`
    pub fn has_fired(&self, element: ElementId) -> bool {
        self.inner.borrow().fired.contains_key(&element)
    }

    /// How many entrances have been scheduled for `element`
    pub fn fire_count(&self, element: ElementId) -> u64 {
        self.inner.borrow().fired.get(&element).copied().unwrap_or(0)
    }

    /// Check every observed element against the current viewport
    pub fn evaluate(&self, page: &mut Page) {
        let viewport = page.viewport();
        let scheduled = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let mut scheduled = Vec::new();
            let mut released = Vec::new();

            for (id, trackable) in inner.tracked.iter_mut() {
                let Some(bounds) = page.document().bounds(trackable.element) else {
                    released.push(id);
                    continue;
                };
                let visible = bounds.visible_fraction(&viewport) >= inner.threshold;
                let fire = trackable.should_fire(visible);
                trackable.in_view = visible;
                if !fire {
                    continue;
                }

                // Gate on schedule time so rapid re-entry cannot double fire
                trackable.has_fired = true;
                trackable.pending = true;
                *inner.fired.entry(trackable.element).or_insert(0) += 1;
                scheduled.push(ScheduledEntry {
                    id,
                    element: trackable.element,
                    role: trackable.role,
                    delay_ms: trackable.delay_ms,
                    repeatable: trackable.repeatable,
                    on_enter: Rc::clone(&trackable.on_enter),
                });
                if !trackable.repeatable {
                    released.push(id);
                }
            }

            for id in released {
                if let Some(trackable) = inner.tracked.remove(id) {
                    inner.by_element.remove(&trackable.element);
                }
            }
            scheduled
        };

        for entry in scheduled {
            tracing::debug!(
                "visibility trigger: {:?} ({:?}) entered view, firing in {}ms",
                entry.element,
                entry.role,
                entry.delay_ms
            );
            let inner = Rc::clone(&self.inner);
            page.set_timeout(entry.delay_ms, move |page| {
                if entry.repeatable {
                    if let Some(trackable) = inner.borrow_mut().tracked.get_mut(entry.id) {
                        trackable.pending = false;
                    }
                }
                if page
                    .document_mut()
                    .add_class(entry.element, IN_VIEW_CLASS)
                    .is_err()
                {
                    tracing::debug!("visibility trigger: {:?} removed before entry", entry.element);
                    return;
                }
                (entry.on_enter)(page, entry.element);
            });
        }
    }
}

/// Per-element delay from `data-delay`
///
/// Leading digits are used (`"250ms"` → 250) and saturate at `u64::MAX`;
/// no leading digits means no delay.
pub fn delay_from_dataset(doc: &Document, element: ElementId) -> u64 {
    let Some(raw) = doc.get(element).and_then(|e| e.dataset("delay")) else {
        return 0;
    };
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::div;
    use std::cell::Cell;

    /// Page with an element in view at the top and one far below the fold
    fn page() -> (Page, ElementId, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        let top = doc.append(body, div().at(0.0, 300.0)).unwrap();
        let below = doc
            .append(body, div().attr("data-delay", "200").at(2000.0, 400.0))
            .unwrap();
        (Page::new(doc), top, below)
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&mut Page, ElementId) + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move |_: &mut Page, _: ElementId| c.set(c.get() + 1))
    }

    #[test]
    fn test_zero_delay_applies_class_on_next_tick() {
        let (mut page, top, _) = page();
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        let (count, on_enter) = counter();
        trigger.register(&mut page, top, TrackOptions::new(), on_enter);

        assert!(!page.document().has_class(top, IN_VIEW_CLASS));
        page.run_pending();
        assert!(page.document().has_class(top, IN_VIEW_CLASS));
        assert_eq!(count.get(), 1);
        assert_eq!(page.now(), 0);
    }

    #[test]
    fn test_delay_is_honored_per_element() {
        let (mut page, top, below) = page();
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        trigger.register(&mut page, top, TrackOptions::new().delay(500), |_, _| {});
        trigger.register_marked(&mut page, below, TrackOptions::new(), |_, _| {});

        page.advance(100);
        page.scroll_to(1700.0);

        page.advance(199);
        assert!(!page.document().has_class(below, IN_VIEW_CLASS));
        page.advance(1);
        assert!(page.document().has_class(below, IN_VIEW_CLASS));
        // The earlier, longer delay is not blocked or shortened by the later one
        assert!(!page.document().has_class(top, IN_VIEW_CLASS));
        page.advance(200);
        assert!(page.document().has_class(top, IN_VIEW_CLASS));
    }

    #[test]
    fn test_below_threshold_does_not_fire() {
        let (mut page, _, below) = page();
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        let (count, on_enter) = counter();
        trigger.register(&mut page, below, TrackOptions::new(), on_enter);

        // 30px of a 400px element is under 10%
        page.scroll_to(1230.0);
        page.advance(1000);
        assert_eq!(count.get(), 0);

        // 40px is exactly 10%
        page.scroll_to(1240.0);
        page.advance(1000);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_one_shot_fires_once_under_rapid_toggling() {
        let (mut page, _, below) = page();
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        let (count, on_enter) = counter();
        trigger.register(&mut page, below, TrackOptions::new().delay(300), on_enter);

        for _ in 0..10 {
            page.scroll_to(1800.0);
            page.advance(10);
            page.scroll_to(0.0);
            page.advance(10);
        }
        page.advance(1000);
        assert_eq!(count.get(), 1);
        assert!(!trigger.is_observing(below));
        assert!(trigger.has_fired(below));
    }

    #[test]
    fn test_repeatable_refires_on_fresh_entry_only() {
        let (mut page, _, below) = page();
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        let (count, on_enter) = counter();
        trigger.register(
            &mut page,
            below,
            TrackOptions::new().delay(100).repeatable(true),
            on_enter,
        );

        page.scroll_to(1800.0);
        // Still in view: no new entry
        page.scroll_to(1850.0);
        page.advance(100);
        assert_eq!(count.get(), 1);

        page.scroll_to(0.0);
        page.scroll_to(1800.0);
        page.advance(100);
        assert_eq!(count.get(), 2);
        assert!(trigger.is_observing(below));
        assert_eq!(trigger.fire_count(below), 2);
    }

    #[test]
    fn test_repeatable_does_not_double_fire_while_pending() {
        let (mut page, _, below) = page();
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        let (count, on_enter) = counter();
        trigger.register(
            &mut page,
            below,
            TrackOptions::new().delay(500).repeatable(true),
            on_enter,
        );

        page.scroll_to(1800.0);
        page.scroll_to(0.0);
        page.scroll_to(1800.0);
        page.advance(1000);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_missing_element_is_noop() {
        let (mut page, top, _) = page();
        page.document_mut().remove(top);
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        assert!(trigger
            .register(&mut page, top, TrackOptions::new(), |_, _| {})
            .is_none());
        assert_eq!(trigger.observed_count(), 0);
    }

    #[test]
    fn test_element_removed_before_delay_skips_callback() {
        let (mut page, top, _) = page();
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        let (count, on_enter) = counter();
        trigger.register(&mut page, top, TrackOptions::new().delay(100), on_enter);
        page.document_mut().remove(top);
        page.advance(100);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let (mut page, _, below) = page();
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        let first = trigger.register(&mut page, below, TrackOptions::new(), |_, _| {});
        let second = trigger.register(&mut page, below, TrackOptions::new().delay(9), |_, _| {});
        assert_eq!(first, second);
        assert_eq!(trigger.observed_count(), 1);
    }

    #[test]
    fn test_disconnect_stops_observation() {
        let (mut page, _, below) = page();
        let trigger = VisibilityTrigger::install(&mut page, DEFAULT_THRESHOLD);
        let (count, on_enter) = counter();
        trigger.register(&mut page, below, TrackOptions::new(), on_enter);
        trigger.disconnect(&mut page);
        page.scroll_to(1800.0);
        page.advance(100);
        assert_eq!(count.get(), 0);
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn test_delay_from_dataset() {
        let mut doc = Document::new();
        let body = doc.body();
        let plain = doc.append(body, div()).unwrap();
        let suffixed = doc.append(body, div().attr("data-delay", "250ms")).unwrap();
        let garbage = doc.append(body, div().attr("data-delay", "soon")).unwrap();
        assert_eq!(delay_from_dataset(&doc, plain), 0);
        assert_eq!(delay_from_dataset(&doc, suffixed), 250);
        assert_eq!(delay_from_dataset(&doc, garbage), 0);

        let huge = doc
            .append(body, div().attr("data-delay", "99999999999999999999999"))
            .unwrap();
        assert_eq!(delay_from_dataset(&doc, huge), u64::MAX);
    }
}
