//! Smooth scrolling
//!
//! Animates the page scroll position toward a target over a fixed duration,
//! one frame per interval tick. Starting a new scroll cancels the one in
//! flight.

use std::cell::Cell;
use std::rc::Rc;

use folio_core::{Page, TimerId};

use crate::easing::Easing;

/// Frame period for scroll animation (~60fps)
pub const FRAME_MS: u64 = 16;

#[derive(Clone)]
pub struct SmoothScroll {
    duration_ms: u64,
    easing: Easing,
    active: Rc<Cell<Option<TimerId>>>,
}

impl SmoothScroll {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            easing: Easing::default(),
            active: Rc::new(Cell::new(None)),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn is_animating(&self, page: &Page) -> bool {
        self.active.get().is_some_and(|id| page.is_timer_active(id))
    }

    /// Cancel any scroll animation in flight
    pub fn cancel(&self, page: &mut Page) {
        if let Some(id) = self.active.take() {
            page.clear_timer(id);
        }
    }

    /// Scroll to `target` (clamped to the scrollable range)
    ///
    /// A zero duration jumps immediately.
    pub fn scroll_to(&self, page: &mut Page, target: f32) {
        self.cancel(page);
        let target = target.clamp(0.0, page.max_scroll());
        if self.duration_ms == 0 {
            page.scroll_to(target);
            return;
        }

        let from = page.scroll_top();
        let started = page.now();
        let duration = self.duration_ms;
        let easing = self.easing;
        let active = Rc::clone(&self.active);
        tracing::debug!("smooth scroll {} -> {} over {}ms", from, target, duration);

        let id = page.set_interval(FRAME_MS, move |page, id| {
            let elapsed = page.now().saturating_sub(started);
            let t = (elapsed as f32 / duration as f32).min(1.0);
            page.scroll_to(from + (target - from) * easing.apply(t));
            if t >= 1.0 {
                page.clear_timer(id);
                if active.get() == Some(id) {
                    active.set(None);
                }
            }
        });
        self.active.set(Some(id));
    }
}
