//! Page bootstrap
//!
//! Wires every behavior onto a loaded page. Missing markup and bad selectors
//! disable the affected behavior only; the rest of the page still works.

use folio_animation::{
    HeroSequence, Role, SmoothScroll, TextReveal, TrackOptions, VisibilityTrigger,
};
use folio_core::{ElementId, Page, Selector};

use crate::config::PageConfig;
use crate::widgets::{
    stamp_current_year, ImageViewer, NavMenu, QuoteRotator, ScrollFeedback, SmoothAnchors,
};

/// Handles to everything [`enhance`] installed
#[derive(Clone)]
pub struct Enhancements {
    pub trigger: VisibilityTrigger,
    pub reveal: TextReveal,
    pub hero: HeroSequence,
    pub scroll: SmoothScroll,
    pub nav: Option<NavMenu>,
    pub feedback: Option<ScrollFeedback>,
    pub quotes: Option<QuoteRotator>,
    pub viewer: Option<ImageViewer>,
    /// Number of anchor links wired for smooth scrolling
    pub anchors: usize,
    /// Elements registered for entrance animations
    pub animated: Vec<ElementId>,
    pub year_stamped: bool,
}

fn parse(field: &str, source: &str) -> Option<Selector> {
    match Selector::parse(source) {
        Ok(selector) => Some(selector),
        Err(err) => {
            tracing::warn!("{} selector {:?} disabled: {}", field, source, err);
            None
        }
    }
}

fn find_one(page: &Page, field: &str, source: &str) -> Option<ElementId> {
    parse(field, source).and_then(|s| page.document().query(&s))
}

/// Install all page behaviors
pub fn enhance(page: &mut Page, config: &PageConfig) -> Enhancements {
    let selectors = &config.selectors;
    let year_stamped = stamp_current_year(page);

    let scroll = SmoothScroll::new(config.smooth_scroll_ms);
    let nav_selector = parse("nav", &selectors.nav);
    let anchors = match parse("anchors", &selectors.anchors) {
        Some(links) => {
            SmoothAnchors::new(nav_selector.clone(), config.nav_offset_px, scroll.clone())
                .install(page, &links)
        }
        None => 0,
    };

    let nav = NavMenu::install(page);
    let nav_bar = nav_selector.as_ref().and_then(|s| page.document().query(s));
    let feedback = ScrollFeedback::install(page, nav_bar, config.glass_threshold_px);

    let (trigger, reveal, hero, animated) = install_animations(page, config);

    let quotes = parse("quotes", &selectors.quotes)
        .and_then(|s| QuoteRotator::install(page, &s, config.quote_interval_ms));

    let viewer = parse("gallery", &selectors.gallery).and_then(|gallery| {
        ImageViewer::install(page, &gallery)
            .map_err(|err| tracing::warn!("image viewer disabled: {}", err))
            .ok()
    });

    tracing::info!(
        animated = animated.len(),
        anchors,
        nav = nav.is_some(),
        quotes = quotes.is_some(),
        "page enhanced"
    );

    Enhancements {
        trigger,
        reveal,
        hero,
        scroll,
        nav,
        feedback,
        quotes,
        viewer,
        anchors,
        animated,
        year_stamped,
    }
}

fn install_animations(
    page: &mut Page,
    config: &PageConfig,
) -> (VisibilityTrigger, TextReveal, HeroSequence, Vec<ElementId>) {
    let selectors = &config.selectors;
    let heading = find_one(page, "heading", &selectors.heading);
    let lead = find_one(page, "lead", &selectors.lead);

    let reveal = TextReveal::new();
    let hero = HeroSequence::new(reveal.clone(), heading, lead, config.hero_timing());
    let trigger = VisibilityTrigger::install(page, config.visibility_threshold);

    let mut targets = parse("animate", &selectors.animate)
        .map(|s| page.document().query_all(&s))
        .unwrap_or_default();
    for hero_element in [heading, lead].into_iter().flatten() {
        if !targets.contains(&hero_element) {
            targets.push(hero_element);
        }
    }

    for &element in &targets {
        let role = if Some(element) == heading {
            Role::HeroHeading
        } else if Some(element) == lead {
            Role::HeroLead
        } else {
            Role::Plain
        };
        let repeatable = role != Role::Plain
            || config
                .repeatable_classes
                .iter()
                .any(|class| page.document().has_class(element, class));
        let options = TrackOptions::new().role(role).repeatable(repeatable);
        let hero = hero.clone();
        trigger.register_marked(page, element, options, move |page, element| {
            hero.on_enter(page, element);
        });
    }

    (trigger, reveal, hero, targets)
}
