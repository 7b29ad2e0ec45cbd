//! Scroll progress bar and glass nav

use folio_core::{ElementId, EventTarget, EventType, Page};

pub const PROGRESS_BAR_ID: &str = "scrollProgress";
/// Attribute set on the nav bar once the page has scrolled past the threshold
pub const GLASS_ATTRIBUTE: &str = "data-glass";

/// Reflects the scroll position on the progress bar and nav bar
#[derive(Clone, Copy, Debug)]
pub struct ScrollFeedback {
    bar: Option<ElementId>,
    nav: Option<ElementId>,
    glass_threshold: f32,
}

impl ScrollFeedback {
    /// Attach to `#scrollProgress` and the given nav element
    ///
    /// Returns `None` when neither exists. The initial state is applied
    /// right away.
    pub fn install(page: &mut Page, nav: Option<ElementId>, glass_threshold: f32) -> Option<Self> {
        let feedback = Self {
            bar: page.document().get_by_id(PROGRESS_BAR_ID),
            nav,
            glass_threshold,
        };
        if feedback.bar.is_none() && feedback.nav.is_none() {
            return None;
        }
        page.add_listener(EventTarget::Document, EventType::Scroll, move |page, _| {
            feedback.update(page);
        });
        feedback.update(page);
        Some(feedback)
    }

    /// Scroll progress in percent; 0 when the page cannot scroll
    pub fn progress(page: &Page) -> f32 {
        let range = page.scroll_height() - page.viewport_height();
        if range <= 0.0 {
            return 0.0;
        }
        (page.scroll_top() / range * 100.0).clamp(0.0, 100.0)
    }

    pub fn update(&self, page: &mut Page) {
        let progress = Self::progress(page);
        let glassy = page.scroll_top() > self.glass_threshold;
        let doc = page.document_mut();

        if let Some(bar) = self.bar {
            if let Err(err) = doc.set_style(bar, "width", format!("{}%", progress)) {
                tracing::debug!("progress bar update failed: {}", err);
            }
        }
        if let Some(nav) = self.nav {
            let result = if glassy {
                doc.set_attribute(nav, GLASS_ATTRIBUTE, "true")
            } else {
                doc.remove_attribute(nav, GLASS_ATTRIBUTE).map(|_| ())
            };
            if let Err(err) = result {
                tracing::debug!("nav glass update failed: {}", err);
            }
        }
    }
}
