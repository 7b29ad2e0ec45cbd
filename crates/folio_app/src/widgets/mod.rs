//! Page collaborators
//!
//! Small, independent behaviors that the landing page wires up next to the
//! entrance animations. Each one looks up its own elements and does nothing
//! when they are absent.

mod anchors;
mod nav;
mod progress;
mod quotes;
mod viewer;
mod year;

pub use anchors::SmoothAnchors;
pub use nav::{NavMenu, NAV_MENU_ID, NAV_OPEN_CLASS, NAV_TOGGLE_ACTIVE_CLASS, NAV_TOGGLE_ID};
pub use progress::{ScrollFeedback, GLASS_ATTRIBUTE, PROGRESS_BAR_ID};
pub use quotes::{QuoteRotator, ACTIVE_QUOTE_CLASS};
pub use viewer::{ImageViewer, VIEWER_ACTIVE_CLASS};
pub use year::{stamp_current_year, stamp_year, YEAR_ELEMENT_ID};
