//! Rich inline markup
//!
//! Element content is a sequence of inline nodes: plain text runs and styled
//! spans (e.g. `<span class="grad">Folio</span>`). A [`Markup`] value is the
//! Rust equivalent of an element's `innerHTML`; cloning it captures the content
//! losslessly, including nested styled fragments.

use html_escape::{encode_double_quoted_attribute, encode_text};
use smallvec::SmallVec;

/// A single inline node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    /// Plain text run
    Text(String),
    /// Styled fragment with its own class list
    Span {
        classes: SmallVec<[String; 2]>,
        children: Vec<Inline>,
    },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(text.into())
    }

    /// A span with one class wrapping a text run
    pub fn span(class: impl Into<String>, text: impl Into<String>) -> Self {
        let mut classes = SmallVec::new();
        classes.push(class.into());
        Inline::Span {
            classes,
            children: vec![Inline::Text(text.into())],
        }
    }

    /// A span with an arbitrary class list and children
    pub fn styled<I, S>(classes: I, children: Vec<Inline>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Inline::Span {
            classes: classes.into_iter().map(Into::into).collect(),
            children,
        }
    }

    fn write_text(&self, out: &mut String) {
        match self {
            Inline::Text(text) => out.push_str(text),
            Inline::Span { children, .. } => {
                for child in children {
                    child.write_text(out);
                }
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Inline::Text(text) => out.push_str(&encode_text(text)),
            Inline::Span { classes, children } => {
                out.push_str("<span");
                if !classes.is_empty() {
                    out.push_str(" class=\"");
                    out.push_str(&encode_double_quoted_attribute(&classes.join(" ")));
                    out.push('"');
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</span>");
            }
        }
    }
}

/// Inline content of an element
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Markup {
    nodes: Vec<Inline>,
}

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup consisting of a single text run
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self {
            nodes: vec![Inline::Text(text)],
        }
    }

    /// Builder-style append
    pub fn with(mut self, node: Inline) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn push(&mut self, node: Inline) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Inline] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Append one character to the trailing text run, creating it if needed
    pub fn push_char(&mut self, ch: char) {
        if let Some(Inline::Text(text)) = self.nodes.last_mut() {
            text.push(ch);
        } else {
            self.nodes.push(Inline::Text(ch.to_string()));
        }
    }

    /// All text with markup stripped (`textContent`)
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_text(&mut out);
        }
        out
    }

    /// Serialized, escaped HTML (`innerHTML`)
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }
}

impl From<&str> for Markup {
    fn from(text: &str) -> Self {
        Markup::from_text(text)
    }
}

impl From<String> for Markup {
    fn from(text: String) -> Self {
        Markup::from_text(text)
    }
}

impl FromIterator<Inline> for Markup {
    fn from_iter<I: IntoIterator<Item = Inline>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
