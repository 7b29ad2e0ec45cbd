//! In-page anchor links with smooth scrolling

use folio_animation::SmoothScroll;
use folio_core::{ElementId, EventTarget, EventType, Page, Selector};

/// Smooth scrolling for `href="#..."` links
///
/// The target lands just below the nav bar: its top minus the nav height
/// minus `offset`. Links whose fragment matches nothing are ignored.
#[derive(Clone)]
pub struct SmoothAnchors {
    nav: Option<Selector>,
    offset: f32,
    scroll: SmoothScroll,
}

impl SmoothAnchors {
    pub fn new(nav: Option<Selector>, offset: f32, scroll: SmoothScroll) -> Self {
        Self { nav, offset, scroll }
    }

    /// Wire every link matching `links`; returns how many were wired
    pub fn install(self, page: &mut Page, links: &Selector) -> usize {
        let anchors = page.document().query_all(links);
        for &link in &anchors {
            let this = self.clone();
            page.add_listener(EventTarget::Element(link), EventType::Click, move |page, _| {
                this.follow(page, link);
            });
        }
        anchors.len()
    }

    /// Scroll position a link to `target` should land on
    pub fn destination(&self, page: &Page, target: ElementId) -> Option<f32> {
        let doc = page.document();
        let top = doc.bounds(target)?.top;
        let nav_height = self
            .nav
            .as_ref()
            .and_then(|nav| doc.query(nav))
            .and_then(|nav| doc.bounds(nav))
            .map_or(0.0, |bounds| bounds.height);
        Some(top - (nav_height + self.offset))
    }

    /// Follow `link`; returns false when its fragment resolves to nothing
    pub fn follow(&self, page: &mut Page, link: ElementId) -> bool {
        let Some(href) = page.document().attribute(link, "href").map(str::to_string) else {
            return false;
        };
        let target = match Selector::parse(&href) {
            Ok(selector) => page.document().query(&selector),
            Err(err) => {
                tracing::debug!("anchor {:?} is not a selector: {}", href, err);
                None
            }
        };
        let Some(y) = target.and_then(|target| self.destination(page, target)) else {
            return false;
        };
        self.scroll.scroll_to(page, y);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{div, element, Document};

    fn anchors_page() -> (Page, ElementId, ElementId, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(body, element("nav").class("nav").at(0.0, 64.0)).unwrap();
        let good = doc.append(body, element("a").attr("href", "#work")).unwrap();
        let bare = doc.append(body, element("a").attr("href", "#")).unwrap();
        let dangling = doc.append(body, element("a").attr("href", "#nowhere")).unwrap();
        doc.append(body, div().id("work").at(1500.0, 600.0)).unwrap();
        doc.append(body, div().at(0.0, 4000.0)).unwrap();
        (Page::new(doc), good, bare, dangling)
    }

    fn anchors() -> SmoothAnchors {
        SmoothAnchors::new(Selector::parse(".nav").ok(), 20.0, SmoothScroll::new(0))
    }

    #[test]
    fn test_scrolls_below_nav() {
        let (mut page, good, _, _) = anchors_page();
        let links = Selector::parse("a[href^=\"#\"]").unwrap();
        assert_eq!(anchors().install(&mut page, &links), 3);

        page.click(good);
        assert_eq!(page.scroll_top(), 1500.0 - 64.0 - 20.0);
    }

    #[test]
    fn test_unresolvable_fragments_do_nothing() {
        let (mut page, _, bare, dangling) = anchors_page();
        let anchors = anchors();
        assert!(!anchors.follow(&mut page, bare));
        assert!(!anchors.follow(&mut page, dangling));
        assert_eq!(page.scroll_top(), 0.0);
    }

    #[test]
    fn test_without_nav_uses_offset_only() {
        let (page, _, _, _) = anchors_page();
        let anchors = SmoothAnchors::new(None, 20.0, SmoothScroll::new(0));
        let work = page.document().get_by_id("work").unwrap();
        assert_eq!(anchors.destination(&page, work), Some(1480.0));
    }
}
