//! Mobile navigation menu

use folio_core::{ElementId, EventTarget, EventType, Page, Selector, SCROLL_LOCK_CLASS};

pub const NAV_TOGGLE_ID: &str = "navToggle";
pub const NAV_MENU_ID: &str = "navMenu";
/// Class on the menu while it is open
pub const NAV_OPEN_CLASS: &str = "show";
/// Class on the toggle button while the menu is open
pub const NAV_TOGGLE_ACTIVE_CLASS: &str = "active";

/// Toggle button plus the menu it opens
///
/// Opening the menu locks page scrolling; following any link inside the menu
/// closes it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavMenu {
    toggle: ElementId,
    menu: ElementId,
}

impl NavMenu {
    /// Wire `#navToggle` and `#navMenu`; `None` if either is missing
    pub fn install(page: &mut Page) -> Option<Self> {
        let doc = page.document();
        let nav = Self {
            toggle: doc.get_by_id(NAV_TOGGLE_ID)?,
            menu: doc.get_by_id(NAV_MENU_ID)?,
        };

        page.add_listener(EventTarget::Element(nav.toggle), EventType::Click, move |page, _| {
            nav.toggle(page);
        });

        let links = match Selector::parse("a") {
            Ok(selector) => page.document().query_all_within(nav.menu, &selector),
            Err(_) => Vec::new(),
        };
        for link in links {
            page.add_listener(EventTarget::Element(link), EventType::Click, move |page, _| {
                nav.close(page);
            });
        }

        tracing::debug!("nav menu installed");
        Some(nav)
    }

    pub fn toggle_button(&self) -> ElementId {
        self.toggle
    }

    pub fn menu(&self) -> ElementId {
        self.menu
    }

    pub fn is_open(&self, page: &Page) -> bool {
        page.document().has_class(self.menu, NAV_OPEN_CLASS)
    }

    pub fn toggle(&self, page: &mut Page) {
        if self.is_open(page) {
            self.close(page);
        } else {
            self.open(page);
        }
    }

    pub fn open(&self, page: &mut Page) {
        self.apply(page, true);
    }

    pub fn close(&self, page: &mut Page) {
        self.apply(page, false);
    }

    fn apply(&self, page: &mut Page, open: bool) {
        let body = page.document().body();
        let doc = page.document_mut();
        let result = if open {
            doc.add_class(self.menu, NAV_OPEN_CLASS)
                .and_then(|_| doc.add_class(self.toggle, NAV_TOGGLE_ACTIVE_CLASS))
                .and_then(|_| doc.add_class(body, SCROLL_LOCK_CLASS))
        } else {
            doc.remove_class(self.menu, NAV_OPEN_CLASS)
                .and_then(|_| doc.remove_class(self.toggle, NAV_TOGGLE_ACTIVE_CLASS))
                .and_then(|_| doc.remove_class(body, SCROLL_LOCK_CLASS))
        };
        let result = result.and_then(|_| {
            doc.set_attribute(self.toggle, "aria-expanded", if open { "true" } else { "false" })
        });
        if let Err(err) = result {
            tracing::warn!("nav menu update failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{element, Document};

    fn nav_page() -> (Page, ElementId, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        let toggle = doc
            .append(
                body,
                element("button").id(NAV_TOGGLE_ID).attr("aria-expanded", "false"),
            )
            .unwrap();
        let menu = doc
            .append(
                body,
                element("ul")
                    .id(NAV_MENU_ID)
                    .child(element("li").child(element("a").attr("href", "#work").text("Work"))),
            )
            .unwrap();
        (Page::new(doc), toggle, menu)
    }

    #[test]
    fn test_toggle_opens_and_closes() {
        let (mut page, toggle, menu) = nav_page();
        let nav = NavMenu::install(&mut page).unwrap();

        page.click(toggle);
        assert!(nav.is_open(&page));
        assert!(page.document().has_class(toggle, NAV_TOGGLE_ACTIVE_CLASS));
        assert_eq!(page.document().attribute(toggle, "aria-expanded"), Some("true"));
        assert!(page.is_scroll_locked());

        page.click(toggle);
        assert!(!page.document().has_class(menu, NAV_OPEN_CLASS));
        assert_eq!(page.document().attribute(toggle, "aria-expanded"), Some("false"));
        assert!(!page.is_scroll_locked());
    }

    #[test]
    fn test_menu_link_closes() {
        let (mut page, toggle, _) = nav_page();
        let nav = NavMenu::install(&mut page).unwrap();
        let link = page.document().select_one("#navMenu a").unwrap().unwrap();

        page.click(toggle);
        page.click(link);
        assert!(!nav.is_open(&page));
        assert!(!page.is_scroll_locked());
    }

    #[test]
    fn test_missing_markup() {
        let mut page = Page::new(Document::new());
        assert!(NavMenu::install(&mut page).is_none());
        assert_eq!(page.listener_count(), 0);
    }
}
