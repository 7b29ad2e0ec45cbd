//! Full-screen image viewer for the gallery

use folio_core::{
    div, element, DomError, ElementId, EventTarget, EventType, KeyCode, Page, Selector,
    SCROLL_LOCK_CLASS,
};

/// Class on the overlay while an image is shown
pub const VIEWER_ACTIVE_CLASS: &str = "active";

/// Overlay showing one gallery image at a time
///
/// The overlay is appended to the body once. It closes via its close button,
/// a click on the backdrop itself, or Escape while open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageViewer {
    overlay: ElementId,
    image: ElementId,
    close_button: ElementId,
}

impl ImageViewer {
    /// Build the overlay markup and wire its close behaviors
    pub fn new(page: &mut Page) -> Result<Self, DomError> {
        let body = page.document().body();
        let doc = page.document_mut();
        let overlay = doc.append(body, div().class("fullscreen-overlay"))?;
        let container = doc.append(overlay, div().class("fullscreen-image-container"))?;
        let image = doc.append(
            container,
            element("img")
                .class("fullscreen-image")
                .attr("src", "")
                .attr("alt", "Full Screen Image"),
        )?;
        let close_button = doc.append(
            container,
            element("button")
                .class("close-btn")
                .attr("aria-label", "Close image viewer")
                .text("\u{2715}"),
        )?;

        let viewer = Self {
            overlay,
            image,
            close_button,
        };
        viewer.wire(page);
        Ok(viewer)
    }

    /// Build the viewer and open it from every image matching `gallery`
    pub fn install(page: &mut Page, gallery: &Selector) -> Result<Self, DomError> {
        let viewer = Self::new(page)?;
        let count = viewer.attach(page, gallery);
        tracing::debug!("image viewer attached to {} gallery images", count);
        Ok(viewer)
    }

    fn wire(self, page: &mut Page) {
        page.add_listener(
            EventTarget::Element(self.close_button),
            EventType::Click,
            move |page, _| self.close(page),
        );
        page.add_listener(
            EventTarget::Element(self.overlay),
            EventType::Click,
            move |page, event| {
                if event.is_at_target() {
                    self.close(page);
                }
            },
        );
        page.add_listener(EventTarget::Document, EventType::KeyDown, move |page, event| {
            if event.key() == Some(&KeyCode::Escape) && self.is_open(page) {
                self.close(page);
            }
        });
    }

    /// Open the viewer when any matching image is clicked; returns how many
    /// images were wired
    pub fn attach(&self, page: &mut Page, gallery: &Selector) -> usize {
        let viewer = *self;
        let images = page.document().query_all(gallery);
        for &img in &images {
            page.add_listener(EventTarget::Element(img), EventType::Click, move |page, _| {
                let doc = page.document();
                let src = doc.attribute(img, "src").unwrap_or_default().to_string();
                let alt = doc.attribute(img, "alt").unwrap_or_default().to_string();
                viewer.open(page, &src, &alt);
            });
        }
        images.len()
    }

    pub fn overlay(&self) -> ElementId {
        self.overlay
    }

    pub fn image(&self) -> ElementId {
        self.image
    }

    pub fn close_button(&self) -> ElementId {
        self.close_button
    }

    pub fn is_open(&self, page: &Page) -> bool {
        page.document().has_class(self.overlay, VIEWER_ACTIVE_CLASS)
    }

    pub fn open(&self, page: &mut Page, src: &str, alt: &str) {
        let body = page.document().body();
        let doc = page.document_mut();
        let result = doc
            .set_attribute(self.image, "src", src)
            .and_then(|_| doc.set_attribute(self.image, "alt", alt))
            .and_then(|_| doc.add_class(self.overlay, VIEWER_ACTIVE_CLASS))
            .and_then(|_| doc.add_class(body, SCROLL_LOCK_CLASS));
        if let Err(err) = result {
            tracing::warn!("image viewer failed to open: {}", err);
        }
    }

    pub fn close(&self, page: &mut Page) {
        let body = page.document().body();
        let doc = page.document_mut();
        let result = doc
            .remove_class(self.overlay, VIEWER_ACTIVE_CLASS)
            .and_then(|_| doc.remove_class(body, SCROLL_LOCK_CLASS));
        if let Err(err) = result {
            tracing::warn!("image viewer failed to close: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Document;

    fn gallery_page() -> (Page, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        let item = doc.append(body, div().class("gallery__item")).unwrap();
        let img = doc
            .append(item, element("img").attr("src", "a.jpg").attr("alt", "Studio"))
            .unwrap();
        (Page::new(doc), img)
    }

    fn install(page: &mut Page) -> ImageViewer {
        let selector = Selector::parse(".gallery__item img").unwrap();
        ImageViewer::install(page, &selector).unwrap()
    }

    #[test]
    fn test_open_copies_image() {
        let (mut page, img) = gallery_page();
        let viewer = install(&mut page);

        page.click(img);
        assert!(viewer.is_open(&page));
        assert!(page.is_scroll_locked());
        assert_eq!(page.document().attribute(viewer.image(), "src"), Some("a.jpg"));
        assert_eq!(page.document().attribute(viewer.image(), "alt"), Some("Studio"));
    }

    #[test]
    fn test_close_paths() {
        let (mut page, img) = gallery_page();
        let viewer = install(&mut page);

        page.click(img);
        page.click(viewer.close_button());
        assert!(!viewer.is_open(&page));
        assert!(!page.is_scroll_locked());

        page.click(img);
        page.click(viewer.image());
        assert!(viewer.is_open(&page), "clicks inside the image keep it open");
        page.click(viewer.overlay());
        assert!(!viewer.is_open(&page));

        page.click(img);
        page.key_down(KeyCode::Char('x'));
        assert!(viewer.is_open(&page));
        page.key_down(KeyCode::Escape);
        assert!(!viewer.is_open(&page));
    }

    #[test]
    fn test_escape_while_closed_keeps_lock() {
        let (mut page, _) = gallery_page();
        let viewer = install(&mut page);
        let body = page.document().body();
        page.document_mut().add_class(body, SCROLL_LOCK_CLASS).unwrap();

        page.key_down(KeyCode::Escape);
        assert!(!viewer.is_open(&page));
        assert!(page.is_scroll_locked());
    }
}
