//! Folio Animation System
//!
//! Staged entrance animations and typing reveals for page elements.
//!
//! # Features
//!
//! - **Visibility Trigger**: one-shot or repeatable entrance callbacks when
//!   elements scroll into view, with per-element delays
//! - **Text Reveal**: character-by-character typing that restores the
//!   element's rich markup when done
//! - **Hero Sequence**: heading → lead reveal chaining on completion signals
//! - **Smooth Scroll**: eased scroll position animation

pub mod easing;
pub mod hero;
pub mod reveal;
pub mod scroll;
pub mod trigger;

pub use easing::Easing;
pub use hero::{HeroSequence, HeroTiming};
pub use reveal::{RevealError, RevealHandle, TextReveal, REVEALED_CLASS, REVEALING_CLASS};
pub use scroll::SmoothScroll;
pub use trigger::{
    delay_from_dataset, EnterCallback, Role, TrackOptions, TrackableId, VisibilityTrigger,
    DEFAULT_THRESHOLD, IN_VIEW_CLASS,
};
