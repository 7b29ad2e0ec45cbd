//! Page configuration
//!
//! Every setting has a default matching the stock landing page, so an empty
//! `folio.toml` is valid:
//!
//! ```toml
//! heading_speed_ms = 70
//! lead_speed_ms = 30
//! chain_buffer_ms = 500
//! visibility_threshold = 0.1
//! repeatable_classes = ["carousel", "marquee"]
//!
//! [selectors]
//! heading = ".hero__copy h1"
//! lead = ".hero__copy .lead"
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use folio_animation::HeroTiming;
use folio_core::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Tunables for [`enhance`](crate::enhance)
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageConfig {
    /// Typing speed of the hero heading
    pub heading_speed_ms: u64,
    /// Typing speed of the hero lead paragraph
    pub lead_speed_ms: u64,
    /// Pause between the heading finishing and the lead starting
    pub chain_buffer_ms: u64,
    /// Visible fraction that counts as "in view"
    pub visibility_threshold: f32,
    pub quote_interval_ms: u64,
    /// Extra space left above anchor targets, below the nav bar
    pub nav_offset_px: f32,
    /// Scroll distance after which the nav bar turns glassy
    pub glass_threshold_px: f32,
    pub smooth_scroll_ms: u64,
    /// Classes that keep `data-animate` elements observed after firing
    pub repeatable_classes: Vec<String>,
    pub selectors: SelectorConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            heading_speed_ms: 70,
            lead_speed_ms: 30,
            chain_buffer_ms: 500,
            visibility_threshold: 0.1,
            quote_interval_ms: 4000,
            nav_offset_px: 20.0,
            glass_threshold_px: 50.0,
            smooth_scroll_ms: 400,
            repeatable_classes: vec!["carousel".to_string(), "marquee".to_string()],
            selectors: SelectorConfig::default(),
        }
    }
}

/// Markup contract: where each behavior finds its elements
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub animate: String,
    pub heading: String,
    pub lead: String,
    pub anchors: String,
    pub nav: String,
    pub quotes: String,
    pub gallery: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            animate: "[data-animate]".to_string(),
            heading: ".hero__copy h1".to_string(),
            lead: ".hero__copy .lead".to_string(),
            anchors: "a[href^=\"#\"]".to_string(),
            nav: ".nav".to_string(),
            quotes: ".quote".to_string(),
            gallery: ".gallery__item img".to_string(),
        }
    }
}

impl SelectorConfig {
    fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("selectors.animate", self.animate.as_str()),
            ("selectors.heading", self.heading.as_str()),
            ("selectors.lead", self.lead.as_str()),
            ("selectors.anchors", self.anchors.as_str()),
            ("selectors.nav", self.nav.as_str()),
            ("selectors.quotes", self.quotes.as_str()),
            ("selectors.gallery", self.gallery.as_str()),
        ]
    }
}

impl PageConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: PageConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("heading_speed_ms", self.heading_speed_ms),
            ("lead_speed_ms", self.lead_speed_ms),
            ("quote_interval_ms", self.quote_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if !(self.visibility_threshold > 0.0 && self.visibility_threshold <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "visibility_threshold",
                reason: format!("{} is outside (0, 1]", self.visibility_threshold),
            });
        }
        if !self.nav_offset_px.is_finite() || !self.glass_threshold_px.is_finite() {
            return Err(ConfigError::Invalid {
                field: "nav_offset_px",
                reason: "offsets must be finite".to_string(),
            });
        }
        for (field, value) in self.selectors.fields() {
            Selector::parse(value).map_err(|source| ConfigError::Selector { field, source })?;
        }
        Ok(())
    }

    pub fn hero_timing(&self) -> HeroTiming {
        HeroTiming {
            heading_speed_ms: self.heading_speed_ms,
            lead_speed_ms: self.lead_speed_ms,
            chain_buffer_ms: self.chain_buffer_ms,
        }
    }
}
