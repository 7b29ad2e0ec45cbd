//! Folio Application
//!
//! Progressive enhancement for a single-page portfolio: entrance animations,
//! the hero typing sequence and the small interactive widgets around them.
//!
//! # Example
//!
//! ```
//! use folio_app::{enhance, PageConfig};
//! use folio_core::{element, Document, Page};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! doc.append(body, element("span").id("year")).unwrap();
//! let mut page = Page::new(doc);
//!
//! let installed = enhance(&mut page, &PageConfig::default());
//! assert!(installed.year_stamped);
//! ```

pub mod config;
pub mod enhance;
pub mod error;
pub mod logging;
pub mod widgets;


pub use config::{PageConfig, SelectorConfig};
pub use enhance::{enhance, Enhancements};
pub use error::{ConfigError, Result};
