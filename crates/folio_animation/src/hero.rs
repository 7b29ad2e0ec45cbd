//! Hero heading → lead paragraph reveal chain
//!
//! The heading is typed first. The lead paragraph starts a fixed buffer after
//! the heading's reveal signals completion, so the chain follows the actual
//! finish of the heading rather than an estimate of its duration.
//!
//! Either element may enter the viewport first. A lead that enters early waits
//! for the heading; a page without a (revealable) heading types the lead as
//! soon as it enters.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{ElementId, Page};

use crate::reveal::{RevealError, RevealHandle, TextReveal};

/// Timing for the hero chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeroTiming {
    pub heading_speed_ms: u64,
    pub lead_speed_ms: u64,
    /// Pause between the heading finishing and the lead starting
    pub chain_buffer_ms: u64,
}

impl Default for HeroTiming {
    fn default() -> Self {
        Self {
            heading_speed_ms: 70,
            lead_speed_ms: 30,
            chain_buffer_ms: 500,
        }
    }
}

#[derive(Default)]
struct HeroState {
    heading_handle: Option<RevealHandle>,
    /// The heading can never be revealed (no text, nested elements, gone)
    heading_failed: bool,
    lead_requested: bool,
    lead_chained: bool,
    lead_handle: Option<RevealHandle>,
}

/// Coordinates the two hero reveals
#[derive(Clone)]
pub struct HeroSequence {
    reveal: TextReveal,
    heading: Option<ElementId>,
    lead: Option<ElementId>,
    timing: HeroTiming,
    state: Rc<RefCell<HeroState>>,
}

impl HeroSequence {
    pub fn new(
        reveal: TextReveal,
        heading: Option<ElementId>,
        lead: Option<ElementId>,
        timing: HeroTiming,
    ) -> Self {
        Self {
            reveal,
            heading,
            lead,
            timing,
            state: Rc::new(RefCell::new(HeroState::default())),
        }
    }

    pub fn heading(&self) -> Option<ElementId> {
        self.heading
    }

    pub fn lead(&self) -> Option<ElementId> {
        self.lead
    }

    pub fn is_hero(&self, element: ElementId) -> bool {
        self.heading == Some(element) || self.lead == Some(element)
    }

    pub fn heading_handle(&self) -> Option<RevealHandle> {
        self.state.borrow().heading_handle.clone()
    }

    pub fn lead_handle(&self) -> Option<RevealHandle> {
        self.state.borrow().lead_handle.clone()
    }

    /// Entrance callback for the hero elements; other elements are ignored
    pub fn on_enter(&self, page: &mut Page, element: ElementId) {
        if self.heading == Some(element) {
            self.start_heading(page);
        } else if self.lead == Some(element) {
            self.request_lead(page);
        }
    }

    fn start_heading(&self, page: &mut Page) {
        let Some(heading) = self.heading else {
            return;
        };
        {
            let state = self.state.borrow();
            if state.heading_handle.is_some() || state.heading_failed {
                return;
            }
        }
        match self.reveal.reveal(page, heading, self.timing.heading_speed_ms) {
            Ok(handle) => self.state.borrow_mut().heading_handle = Some(handle),
            Err(RevealError::Busy(_)) => {
                // Retried on the next entry
                tracing::debug!("hero heading busy, waiting for the next entry");
            }
            Err(err) => {
                tracing::debug!("hero heading reveal skipped: {}", err);
                self.state.borrow_mut().heading_failed = true;
            }
        }
        self.chain_lead(page);
    }

    fn request_lead(&self, page: &mut Page) {
        {
            let mut state = self.state.borrow_mut();
            if state.lead_requested {
                return;
            }
            state.lead_requested = true;
        }
        self.chain_lead(page);
    }

    /// Schedule the lead once it has entered and the heading's outcome is known
    fn chain_lead(&self, page: &mut Page) {
        let heading_handle = {
            let mut state = self.state.borrow_mut();
            if !state.lead_requested || state.lead_chained {
                return;
            }
            let heading_unavailable = self.heading.is_none() || state.heading_failed;
            if state.heading_handle.is_none() && !heading_unavailable {
                // Wait for the heading to enter view
                return;
            }
            state.lead_chained = true;
            state.heading_handle.clone()
        };

        match heading_handle {
            Some(handle) => {
                let this = self.clone();
                let buffer = self.timing.chain_buffer_ms;
                handle.on_complete(page, move |page| {
                    page.set_timeout(buffer, move |page| this.start_lead(page));
                });
            }
            None => self.start_lead(page),
        }
    }

    fn start_lead(&self, page: &mut Page) {
        let Some(lead) = self.lead else {
            return;
        };
        match self.reveal.reveal(page, lead, self.timing.lead_speed_ms) {
            Ok(handle) => self.state.borrow_mut().lead_handle = Some(handle),
            Err(RevealError::Busy(_)) => {
                tracing::debug!("hero lead busy, waiting for the next entry");
                let mut state = self.state.borrow_mut();
                state.lead_requested = false;
                state.lead_chained = false;
            }
            Err(err) => tracing::debug!("hero lead reveal skipped: {}", err),
        }
    }
}
