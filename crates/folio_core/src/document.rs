//! Document model
//!
//! A [`Document`] is an arena of [`Element`]s keyed by [`ElementId`]. The root
//! element is the page `body`. Elements carry the state the page contract is
//! expressed in: classes, attributes (`data-*`, `aria-*`, `href`, ...), inline
//! style properties, rich inline content and layout bounds.
//!
//! Elements are created through [`ElementBuilder`]:
//!
//! ```rust
//! use folio_core::document::{div, element, Document};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let hero = doc
//!     .append(
//!         body,
//!         div()
//!             .class("hero__copy")
//!             .at(0.0, 400.0)
//!             .child(element("h1").text("Hello")),
//!     )
//!     .unwrap();
//! assert_eq!(doc.children(hero).len(), 1);
//! ```

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{DomError, Result, SelectorError};
use crate::geometry::Bounds;
use crate::markup::{Inline, Markup};
use crate::selector::Selector;

new_key_type! {
    /// Handle to an element in a [`Document`]
    pub struct ElementId;
}

/// A single node of the page
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    classes: SmallVec<[String; 4]>,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    content: Markup,
    bounds: Bounds,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    locked: bool,
}

impl Element {
    fn new(tag: String) -> Self {
        Self {
            tag,
            classes: SmallVec::new(),
            attributes: IndexMap::new(),
            style: IndexMap::new(),
            content: Markup::new(),
            bounds: Bounds::default(),
            parent: None,
            children: Vec::new(),
            locked: false,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Value of the `id` attribute
    pub fn id_attr(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// `data-*` attribute lookup (`dataset("delay")` reads `data-delay`)
    pub fn dataset(&self, key: &str) -> Option<&str> {
        self.attribute(&format!("data-{key}"))
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn content(&self) -> &Markup {
        &self.content
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Whether a writer currently holds the content lock
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_string());
        true
    }

    fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        before != self.classes.len()
    }
}

// ============================================================================
// Content lock
// ============================================================================

/// Exclusive write access to one element's content
///
/// Obtained from [`Document::lock_content`]. While a lock is outstanding,
/// [`Document::set_text`] and [`Document::set_markup`] refuse to touch the
/// element; only [`Document::write_locked`] can change it. The lock is not
/// `Clone` and is consumed by [`Document::unlock`].
#[derive(Debug)]
pub struct ContentLock {
    element: ElementId,
}

impl ContentLock {
    pub fn element(&self) -> ElementId {
        self.element
    }
}

// ============================================================================
// Document
// ============================================================================

/// Arena of elements rooted at `body`
#[derive(Debug, Clone)]
pub struct Document {
    elements: SlotMap<ElementId, Element>,
    body: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut elements = SlotMap::with_key();
        let body = elements.insert(Element::new("body".to_string()));
        Self { elements, body }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(id)
            .ok_or(DomError::MissingElement(id))
    }

    // ========================================================================
    // Tree structure
    // ========================================================================

    /// Insert `builder` (and its children) as the last child of `parent`
    ///
    /// Fails with [`DomError::ContentLocked`] when `parent` or one of its
    /// ancestors has its content locked.
    pub fn append(&mut self, parent: ElementId, builder: ElementBuilder) -> Result<ElementId> {
        if !self.contains(parent) {
            return Err(DomError::MissingElement(parent));
        }
        if let Some(locked) = self.locked_inclusive_ancestor(parent) {
            return Err(DomError::ContentLocked(locked));
        }
        Ok(self.insert_tree(parent, builder))
    }

    /// Nearest element at or above `id` whose content is locked
    fn locked_inclusive_ancestor(&self, id: ElementId) -> Option<ElementId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|a| self.elements.get(*a).is_some_and(|e| e.locked))
    }

    fn insert_tree(&mut self, parent: ElementId, builder: ElementBuilder) -> ElementId {
        let ElementBuilder {
            mut element,
            children,
        } = builder;
        element.parent = Some(parent);
        let id = self.elements.insert(element);
        if let Some(parent) = self.elements.get_mut(parent) {
            parent.children.push(id);
        }
        for child in children {
            self.insert_tree(id, child);
        }
        id
    }

    /// Remove an element and its whole subtree
    ///
    /// Removing `body` or anything inside a locked element is refused;
    /// returns whether anything was removed.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if id == self.body {
            return false;
        }
        if let Some(locked) = self.parent(id).and_then(|p| self.locked_inclusive_ancestor(p)) {
            tracing::debug!("refusing to remove {:?} inside locked {:?}", id, locked);
            return false;
        }
        let Some(parent) = self.elements.get(id).map(|e| e.parent) else {
            return false;
        };
        if let Some(parent) = parent.and_then(|p| self.elements.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(removed) = self.elements.remove(next) {
                stack.extend(removed.children);
            }
        }
        true
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate from `id`'s parent up to the root
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// All elements below `scope` (excluding it) in document order
    pub fn descendants(&self, scope: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// All elements matching `selector` in document order
    pub fn query_all(&self, selector: &Selector) -> Vec<ElementId> {
        self.query_all_within(self.body, selector)
    }

    /// All descendants of `scope` matching `selector` in document order
    pub fn query_all_within(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        let mut candidates = Vec::new();
        if scope == self.body {
            candidates.push(scope);
        }
        candidates.extend(self.descendants(scope));
        candidates
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    /// First element matching `selector`
    pub fn query(&self, selector: &Selector) -> Option<ElementId> {
        self.query_all(selector).into_iter().next()
    }

    /// Parse `selector` and return all matches
    pub fn select(&self, selector: &str) -> std::result::Result<Vec<ElementId>, SelectorError> {
        Ok(self.query_all(&Selector::parse(selector)?))
    }

    /// Parse `selector` and return the first match
    pub fn select_one(
        &self,
        selector: &str,
    ) -> std::result::Result<Option<ElementId>, SelectorError> {
        Ok(self.query(&Selector::parse(selector)?))
    }

    /// Element whose `id` attribute equals `id`
    pub fn get_by_id(&self, id: &str) -> Option<ElementId> {
        std::iter::once(self.body)
            .chain(self.descendants(self.body))
            .find(|el| self.attribute(*el, "id") == Some(id))
    }

    // ========================================================================
    // Classes, attributes, style
    // ========================================================================

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements.get(id).is_some_and(|e| e.has_class(class))
    }

    /// Add a class; returns whether it was newly added
    pub fn add_class(&mut self, id: ElementId, class: &str) -> Result<bool> {
        Ok(self.element_mut(id)?.add_class(class))
    }

    /// Remove a class; returns whether it was present
    pub fn remove_class(&mut self, id: ElementId, class: &str) -> Result<bool> {
        Ok(self.element_mut(id)?.remove_class(class))
    }

    /// Toggle a class; returns whether it is present afterwards
    pub fn toggle_class(&mut self, id: ElementId, class: &str) -> Result<bool> {
        let element = self.element_mut(id)?;
        if element.remove_class(class) {
            Ok(false)
        } else {
            element.add_class(class);
            Ok(true)
        }
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements.get(id).and_then(|e| e.attribute(name))
    }

    pub fn set_attribute(
        &mut self,
        id: ElementId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        self.element_mut(id)?
            .attributes
            .insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> Result<Option<String>> {
        Ok(self.element_mut(id)?.attributes.shift_remove(name))
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.elements.get(id).and_then(|e| e.style(property))
    }

    pub fn set_style(
        &mut self,
        id: ElementId,
        property: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        self.element_mut(id)?
            .style
            .insert(property.to_string(), value.into());
        Ok(())
    }

    // ========================================================================
    // Content
    // ========================================================================

    pub fn markup(&self, id: ElementId) -> Option<&Markup> {
        self.elements.get(id).map(|e| &e.content)
    }

    /// Own text followed by the text of every descendant in document order
    pub fn text_content(&self, id: ElementId) -> Option<String> {
        let mut text = self.markup(id)?.text_content();
        for child in self.descendants(id) {
            if let Some(markup) = self.markup(child) {
                text.push_str(&markup.text_content());
            }
        }
        Some(text)
    }

    pub fn inner_html(&self, id: ElementId) -> Option<String> {
        self.markup(id).map(Markup::to_html)
    }

    /// Replace the content with a single text run
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<()> {
        self.set_markup(id, Markup::from_text(text))
    }

    /// Replace the content with `markup`
    ///
    /// Fails with [`DomError::ContentLocked`] while a [`ContentLock`] is held.
    pub fn set_markup(&mut self, id: ElementId, markup: Markup) -> Result<()> {
        let element = self.element_mut(id)?;
        if element.locked {
            return Err(DomError::ContentLocked(id));
        }
        element.content = markup;
        Ok(())
    }

    /// Take exclusive ownership of an element's content
    pub fn lock_content(&mut self, id: ElementId) -> Result<ContentLock> {
        let element = self.element_mut(id)?;
        if element.locked {
            return Err(DomError::ContentLocked(id));
        }
        element.locked = true;
        Ok(ContentLock { element: id })
    }

    /// Mutate locked content
    pub fn write_locked<R>(
        &mut self,
        lock: &ContentLock,
        f: impl FnOnce(&mut Markup) -> R,
    ) -> Result<R> {
        let element = self.element_mut(lock.element)?;
        if !element.locked {
            return Err(DomError::StaleLock(lock.element));
        }
        Ok(f(&mut element.content))
    }

    /// Release a lock, optionally installing final content
    pub fn unlock(&mut self, lock: ContentLock, content: Option<Markup>) -> Result<()> {
        let element = self.element_mut(lock.element)?;
        if !element.locked {
            return Err(DomError::StaleLock(lock.element));
        }
        if let Some(content) = content {
            element.content = content;
        }
        element.locked = false;
        Ok(())
    }

    // ========================================================================
    // Layout
    // ========================================================================

    pub fn bounds(&self, id: ElementId) -> Option<Bounds> {
        self.elements.get(id).map(|e| e.bounds)
    }

    pub fn set_bounds(&mut self, id: ElementId, bounds: Bounds) -> Result<()> {
        self.element_mut(id)?.bounds = bounds;
        Ok(())
    }

    /// Bottom edge of the lowest element
    pub fn content_height(&self) -> f32 {
        self.elements
            .values()
            .map(|e| e.bounds.bottom())
            .fold(0.0, f32::max)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Declarative element construction
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    element: Element,
    children: Vec<ElementBuilder>,
}

/// Start building an element with the given tag name
pub fn element(tag: impl Into<String>) -> ElementBuilder {
    ElementBuilder {
        element: Element::new(tag.into()),
        children: Vec::new(),
    }
}

/// Shorthand for `element("div")`
pub fn div() -> ElementBuilder {
    element("div")
}

impl ElementBuilder {
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: &str) -> Self {
        self.element.add_class(class);
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.element.attributes.insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.element.style.insert(property.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.element.content = Markup::from_text(text);
        self
    }

    pub fn markup(mut self, markup: Markup) -> Self {
        self.element.content = markup;
        self
    }

    /// Append an inline node to the content
    pub fn inline(mut self, node: Inline) -> Self {
        self.element.content.push(node);
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.element.bounds = bounds;
        self
    }

    /// Place the element at `top` with the given height
    pub fn at(self, top: f32, height: f32) -> Self {
        self.bounds(Bounds::new(top, height))
    }

    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = ElementBuilder>,
    {
        self.children.extend(children);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, ElementId, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc
            .append(
                body,
                element("nav")
                    .class("nav")
                    .child(element("a").attr("href", "#about").text("About")),
            )
            .unwrap();
        let about = doc
            .append(body, element("section").id("about").at(900.0, 600.0))
            .unwrap();
        (doc, nav, about)
    }

    #[test]
    fn test_append_builds_tree() {
        let (doc, nav, _) = sample();
        assert_eq!(doc.children(doc.body()).len(), 2);
        let link = doc.children(nav)[0];
        assert_eq!(doc.parent(link), Some(nav));
        assert_eq!(doc.ancestors(link).collect::<Vec<_>>(), vec![nav, doc.body()]);
        assert_eq!(doc.text_content(link).as_deref(), Some("About"));
    }

    #[test]
    fn test_get_by_id() {
        let (doc, _, about) = sample();
        assert_eq!(doc.get_by_id("about"), Some(about));
        assert_eq!(doc.get_by_id("missing"), None);
    }

    #[test]
    fn test_class_operations() {
        let (mut doc, nav, _) = sample();
        assert!(doc.add_class(nav, "show").unwrap());
        assert!(!doc.add_class(nav, "show").unwrap());
        assert!(!doc.toggle_class(nav, "show").unwrap());
        assert!(doc.toggle_class(nav, "show").unwrap());
        assert!(doc.remove_class(nav, "show").unwrap());
        assert!(!doc.has_class(nav, "show"));
    }

    #[test]
    fn test_remove_subtree() {
        let (mut doc, nav, _) = sample();
        let link = doc.children(nav)[0];
        assert!(doc.remove(nav));
        assert!(!doc.contains(link));
        assert_eq!(doc.children(doc.body()).len(), 1);
        assert_eq!(doc.add_class(nav, "x"), Err(DomError::MissingElement(nav)));
        assert!(!doc.remove(doc.body()));
    }

    #[test]
    fn test_content_lock_excludes_other_writers() {
        let (mut doc, _, about) = sample();
        let lock = doc.lock_content(about).unwrap();
        assert_eq!(doc.set_text(about, "x"), Err(DomError::ContentLocked(about)));
        assert_eq!(
            doc.lock_content(about).unwrap_err(),
            DomError::ContentLocked(about)
        );

        doc.write_locked(&lock, |m| m.push_char('a')).unwrap();
        assert_eq!(doc.text_content(about).as_deref(), Some("a"));

        doc.unlock(lock, Some(Markup::from_text("done"))).unwrap();
        assert_eq!(doc.text_content(about).as_deref(), Some("done"));
        doc.set_text(about, "free").unwrap();
    }

    #[test]
    fn test_text_content_includes_descendants() {
        let (mut doc, nav, _) = sample();
        doc.set_text(nav, "Menu: ").unwrap();
        let link = doc.children(nav)[0];
        doc.append(link, element("span").text("!")).unwrap();
        assert_eq!(doc.text_content(nav).as_deref(), Some("Menu: About!"));
    }

    #[test]
    fn test_locked_subtree_refuses_tree_changes() {
        let (mut doc, nav, _) = sample();
        let link = doc.children(nav)[0];
        let lock = doc.lock_content(nav).unwrap();

        assert_eq!(
            doc.append(nav, element("a")).unwrap_err(),
            DomError::ContentLocked(nav)
        );
        assert_eq!(
            doc.append(link, element("span")).unwrap_err(),
            DomError::ContentLocked(nav)
        );
        assert!(!doc.remove(link));
        assert!(doc.contains(link));

        doc.unlock(lock, None).unwrap();
        assert!(doc.remove(link));
        assert!(doc.children(nav).is_empty());
    }

    #[test]
    fn test_content_height() {
        let (doc, _, _) = sample();
        assert_eq!(doc.content_height(), 1500.0);
    }
}
