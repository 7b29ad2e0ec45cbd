//! Text reveal sequencer
//!
//! Types an element's text out one character at a time. The element's rich
//! markup is captured up front, the element is cleared, and a repeating timer
//! appends one Unicode code point of the trimmed plain text per tick. The tick
//! that appends the last character stops the timer and restores the captured
//! markup verbatim, so styled fragments inside the element come back exactly
//! as they were.
//!
//! While a reveal runs it holds the element's [`ContentLock`]; no other writer
//! can change the element's content until the original markup is restored.
//! Elements with child elements are refused: styled fragments must be inline
//! markup so the whole text can be hidden and typed.
//!
//! [`TextReveal::reveal`] returns a [`RevealHandle`], a one-shot completion
//! signal that later work (such as a chained reveal) can wait on.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use folio_core::{ContentLock, DomError, ElementId, Markup, Page, TimerId};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Class present while characters are being typed (styles the cursor)
pub const REVEALING_CLASS: &str = "typing-container";

/// Class applied once the markup has been restored
pub const REVEALED_CLASS: &str = "typed";

/// Reasons a reveal could not start
///
/// All of these leave the element untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevealError {
    #[error("reveal speed must be at least 1ms per character")]
    ZeroSpeed,

    #[error("element {0:?} is not part of the document")]
    MissingElement(ElementId),

    #[error("element {0:?} has no text to reveal")]
    NoText(ElementId),

    /// Only inline markup can be typed; child elements would stay visible
    #[error("element {0:?} contains child elements")]
    NestedElements(ElementId),

    #[error("content of element {0:?} is held by another writer")]
    Busy(ElementId),
}

impl From<DomError> for RevealError {
    fn from(err: DomError) -> Self {
        match err {
            DomError::MissingElement(id) => RevealError::MissingElement(id),
            DomError::ContentLocked(id) | DomError::StaleLock(id) => RevealError::Busy(id),
        }
    }
}

// ============================================================================
// Completion handle
// ============================================================================

type Waiter = Box<dyn FnOnce(&mut Page)>;

struct HandleState {
    element: ElementId,
    started_at: u64,
    total_chars: usize,
    revealed_chars: usize,
    finished_at: Option<u64>,
    waiters: Vec<Waiter>,
}

/// Completion signal for one reveal
#[derive(Clone)]
pub struct RevealHandle {
    state: Rc<RefCell<HandleState>>,
}

impl RevealHandle {
    fn new(element: ElementId, started_at: u64, total_chars: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(HandleState {
                element,
                started_at,
                total_chars,
                revealed_chars: 0,
                finished_at: None,
                waiters: Vec::new(),
            })),
        }
    }

    pub fn element(&self) -> ElementId {
        self.state.borrow().element
    }

    /// Page time the reveal started
    pub fn started_at(&self) -> u64 {
        self.state.borrow().started_at
    }

    /// Page time the markup was restored
    pub fn finished_at(&self) -> Option<u64> {
        self.state.borrow().finished_at
    }

    pub fn is_complete(&self) -> bool {
        self.state.borrow().finished_at.is_some()
    }

    /// Number of code points the reveal types
    pub fn total_chars(&self) -> usize {
        self.state.borrow().total_chars
    }

    /// Number of code points typed so far
    pub fn revealed_chars(&self) -> usize {
        self.state.borrow().revealed_chars
    }

    /// Run `f` once the reveal completes (immediately if it already has)
    pub fn on_complete<F>(&self, page: &mut Page, f: F)
    where
        F: FnOnce(&mut Page) + 'static,
    {
        if self.is_complete() {
            f(page);
        } else {
            self.state.borrow_mut().waiters.push(Box::new(f));
        }
    }

    fn record_char(&self) {
        self.state.borrow_mut().revealed_chars += 1;
    }

    fn complete(&self, page: &mut Page) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            state.finished_at = Some(page.now());
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            waiter(page);
        }
    }
}

impl fmt::Debug for RevealHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RevealHandle")
            .field("element", &state.element)
            .field("started_at", &state.started_at)
            .field("progress", &(state.revealed_chars, state.total_chars))
            .field("finished_at", &state.finished_at)
            .finish()
    }
}

// ============================================================================
// Session
// ============================================================================

struct RevealSession {
    element: ElementId,
    source: Markup,
    chars: Vec<char>,
    cursor: usize,
    lock: Option<ContentLock>,
    handle: RevealHandle,
}

impl RevealSession {
    /// Append the next character; returns true once the session is over
    fn tick(&mut self, page: &mut Page, timer: TimerId) -> bool {
        let (Some(lock), Some(&ch)) = (self.lock.as_ref(), self.chars.get(self.cursor)) else {
            page.clear_timer(timer);
            return true;
        };

        if let Err(err) = page.document_mut().write_locked(lock, |m| m.push_char(ch)) {
            tracing::debug!("reveal of {:?} aborted: {}", self.element, err);
            page.clear_timer(timer);
            self.lock = None;
            return true;
        }
        self.cursor += 1;
        self.handle.record_char();
        tracing::trace!("reveal {:?}: {}/{}", self.element, self.cursor, self.chars.len());

        if self.cursor < self.chars.len() {
            return false;
        }

        page.clear_timer(timer);
        self.finish(page);
        true
    }

    fn finish(&mut self, page: &mut Page) {
        let Some(lock) = self.lock.take() else {
            return;
        };
        let doc = page.document_mut();
        let source = std::mem::take(&mut self.source);
        if let Err(err) = doc.unlock(lock, Some(source)) {
            tracing::debug!("reveal of {:?} could not restore markup: {}", self.element, err);
            return;
        }
        doc.remove_class(self.element, REVEALING_CLASS).ok();
        doc.add_class(self.element, REVEALED_CLASS).ok();
    }
}

// ============================================================================
// Sequencer
// ============================================================================

#[derive(Default)]
struct Registry {
    active: FxHashMap<ElementId, RevealHandle>,
    completed: FxHashMap<ElementId, RevealHandle>,
}

/// Starts and tracks typing reveals
///
/// Each element is revealed at most once until [`TextReveal::reset`] is
/// called for it.
#[derive(Clone, Default)]
pub struct TextReveal {
    registry: Rc<RefCell<Registry>>,
}

impl TextReveal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveal `element`'s text at `speed_ms` per character
    ///
    /// Calling this for an element that is being or has been revealed changes
    /// nothing and returns the existing handle.
    pub fn reveal(
        &self,
        page: &mut Page,
        element: ElementId,
        speed_ms: u64,
    ) -> Result<RevealHandle, RevealError> {
        if speed_ms == 0 {
            return Err(RevealError::ZeroSpeed);
        }
        if let Some(existing) = self.handle(element) {
            tracing::debug!("reveal of {:?} already started, ignoring", element);
            return Ok(existing);
        }

        let now = page.now();
        let doc = page.document_mut();
        let source = doc
            .markup(element)
            .cloned()
            .ok_or(RevealError::MissingElement(element))?;
        if !doc.children(element).is_empty() {
            return Err(RevealError::NestedElements(element));
        }
        let chars: Vec<char> = source.text_content().trim().chars().collect();
        if chars.is_empty() {
            return Err(RevealError::NoText(element));
        }

        let lock = doc.lock_content(element)?;
        doc.write_locked(&lock, Markup::clear)?;
        doc.remove_class(element, REVEALED_CLASS)?;
        doc.add_class(element, REVEALING_CLASS)?;

        tracing::debug!(
            "revealing {} chars of {:?} at {}ms/char",
            chars.len(),
            element,
            speed_ms
        );
        let handle = RevealHandle::new(element, now, chars.len());
        self.registry
            .borrow_mut()
            .active
            .insert(element, handle.clone());

        let mut session = RevealSession {
            element,
            source,
            chars,
            cursor: 0,
            lock: Some(lock),
            handle: handle.clone(),
        };
        let registry = Rc::clone(&self.registry);
        page.set_interval(speed_ms, move |page, timer| {
            if !session.tick(page, timer) {
                return;
            }
            let handle = session.handle.clone();
            {
                let mut registry = registry.borrow_mut();
                registry.active.remove(&element);
                registry.completed.insert(element, handle.clone());
            }
            handle.complete(page);
        });

        Ok(handle)
    }

    pub fn is_active(&self, element: ElementId) -> bool {
        self.registry.borrow().active.contains_key(&element)
    }

    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.registry.borrow().completed.contains_key(&element)
    }

    /// Handle of the running or finished reveal for `element`
    pub fn handle(&self, element: ElementId) -> Option<RevealHandle> {
        let registry = self.registry.borrow();
        registry
            .active
            .get(&element)
            .or_else(|| registry.completed.get(&element))
            .cloned()
    }

    /// Forget a finished reveal so the element can be revealed again
    ///
    /// Running reveals cannot be reset; returns whether anything was forgotten.
    pub fn reset(&self, element: ElementId) -> bool {
        self.registry
            .borrow_mut()
            .completed
            .remove(&element)
            .is_some()
    }
}
