//! Testimonial rotator

use std::cell::Cell;
use std::rc::Rc;

use folio_core::{ElementId, Page, Selector, TimerId};

/// Class on the quote currently shown
pub const ACTIVE_QUOTE_CLASS: &str = "active";

/// Cycles through a set of quotes, one visible at a time
#[derive(Clone, Debug)]
pub struct QuoteRotator {
    quotes: Rc<[ElementId]>,
    current: Rc<Cell<usize>>,
    timer: TimerId,
}

impl QuoteRotator {
    /// Show the first quote matching `selector` and advance every
    /// `interval_ms`; `None` if nothing matches
    pub fn install(page: &mut Page, selector: &Selector, interval_ms: u64) -> Option<Self> {
        let quotes: Rc<[ElementId]> = page.document().query_all(selector).into();
        if quotes.is_empty() {
            return None;
        }
        let current = Rc::new(Cell::new(0));
        show(page, &quotes, 0);

        let timer = {
            let quotes = Rc::clone(&quotes);
            let current = Rc::clone(&current);
            page.set_interval(interval_ms, move |page, _| {
                let next = (current.get() + 1) % quotes.len();
                current.set(next);
                show(page, &quotes, next);
            })
        };
        tracing::debug!("rotating {} quotes every {}ms", quotes.len(), interval_ms);
        Some(Self {
            quotes,
            current,
            timer,
        })
    }

    pub fn current(&self) -> usize {
        self.current.get()
    }

    pub fn current_element(&self) -> ElementId {
        self.quotes[self.current.get()]
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Jump to quote `index` (wrapping)
    pub fn show(&self, page: &mut Page, index: usize) {
        let index = index % self.quotes.len();
        self.current.set(index);
        show(page, &self.quotes, index);
    }

    pub fn stop(&self, page: &mut Page) -> bool {
        page.clear_timer(self.timer)
    }
}

fn show(page: &mut Page, quotes: &[ElementId], index: usize) {
    let doc = page.document_mut();
    for (i, &quote) in quotes.iter().enumerate() {
        let active = i == index;
        let toggled = if active {
            doc.add_class(quote, ACTIVE_QUOTE_CLASS)
        } else {
            doc.remove_class(quote, ACTIVE_QUOTE_CLASS)
        };
        let hidden = if active { "false" } else { "true" };
        let result = toggled.and_then(|_| doc.set_attribute(quote, "aria-hidden", hidden));
        if let Err(err) = result {
            tracing::debug!("quote update skipped: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{element, Document};

    fn quotes_page(count: usize) -> (Page, Vec<ElementId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let quotes = (0..count)
            .map(|i| {
                doc.append(body, element("blockquote").class("quote").text(format!("q{i}")))
                    .unwrap()
            })
            .collect();
        (Page::new(doc), quotes)
    }

    fn active(page: &Page, quotes: &[ElementId]) -> Vec<bool> {
        quotes
            .iter()
            .map(|&q| page.document().has_class(q, ACTIVE_QUOTE_CLASS))
            .collect()
    }

    #[test]
    fn test_rotates_and_wraps() {
        let (mut page, quotes) = quotes_page(3);
        let selector = Selector::parse(".quote").unwrap();
        let rotator = QuoteRotator::install(&mut page, &selector, 4000).unwrap();
        assert_eq!(active(&page, &quotes), [true, false, false]);
        assert_eq!(page.document().attribute(quotes[1], "aria-hidden"), Some("true"));

        page.advance(4000);
        assert_eq!(active(&page, &quotes), [false, true, false]);
        assert_eq!(page.document().attribute(quotes[1], "aria-hidden"), Some("false"));

        page.advance(8000);
        assert_eq!(rotator.current(), 0);
        assert_eq!(active(&page, &quotes), [true, false, false]);

        assert!(rotator.stop(&mut page));
        page.advance(10_000);
        assert_eq!(rotator.current(), 0);
    }

    #[test]
    fn test_no_quotes() {
        let (mut page, _) = quotes_page(0);
        let selector = Selector::parse(".quote").unwrap();
        assert!(QuoteRotator::install(&mut page, &selector, 4000).is_none());
        assert_eq!(page.pending_timers(), 0);
    }
}
