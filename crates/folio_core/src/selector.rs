//! CSS selector subset
//!
//! Supports what page markup contracts are expressed in:
//!
//! - Type selectors: `h1`, `img`
//! - ID and class selectors: `#navMenu`, `.hero__copy`
//! - Attribute selectors: `[data-animate]`, `[type="button"]`, `[href^="#"]`
//! - Compounds: `a.btn[href]`
//! - Descendant combinator: `.gallery__item img`
//!
//! Matching walks right to left: the last compound must match the element,
//! every earlier compound must match some ancestor, in order.

use std::fmt;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};

use crate::document::{Document, ElementId};
use crate::error::SelectorError;

/// How an attribute selector compares values
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrOp {
    /// `[name]`
    Exists,
    /// `[name="value"]`
    Equals(String),
    /// `[name^="value"]`
    Prefix(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub op: AttrOp,
}

impl AttrSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        match (&self.op, value) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(expected), Some(value)) => value == expected,
            (AttrOp::Prefix(prefix), Some(value)) => value.starts_with(prefix.as_str()),
        }
    }
}

/// A compound selector: everything between two combinators
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttrSelector>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
    }

    fn matches(&self, doc: &Document, id: ElementId) -> bool {
        let Some(element) = doc.get(id) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if tag != "*" && !element.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if element.id_attr() != Some(expected.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| element.has_class(c))
            && self
                .attributes
                .iter()
                .all(|a| a.matches(element.attribute(&a.name)))
    }
}

/// A parsed selector: compounds joined by descendant combinators
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }
        let (_, compounds) = all_consuming(parse_selector)(trimmed)
            .finish()
            .map_err(|e: nom::error::Error<&str>| SelectorError::Invalid {
                input: input.to_string(),
                remaining: e.input.to_string(),
            })?;
        Ok(Self {
            source: trimmed.to_string(),
            compounds,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    /// Whether `id` matches this selector within `doc`
    pub fn matches(&self, doc: &Document, id: ElementId) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(doc, id) {
            return false;
        }
        let mut ancestors = doc.ancestors(id);
        rest.iter()
            .rev()
            .all(|compound| ancestors.any(|a| compound.matches(doc, a)))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ============================================================================
// Parsers
// ============================================================================

enum Simple {
    Id(String),
    Class(String),
    Attr(AttrSelector),
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(is_ident_char)(input)
}

fn type_name(input: &str) -> IResult<&str, &str> {
    alt((tag("*"), ident))(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        ident,
    ))(input)
}

fn attribute(input: &str) -> IResult<&str, AttrSelector> {
    let (input, (name, op)) = delimited(
        terminated(char('['), multispace0),
        pair(
            ident,
            opt(tuple((
                delimited(multispace0, alt((tag("^="), tag("="))), multispace0),
                quoted,
            ))),
        ),
        preceded(multispace0, char(']')),
    )(input)?;

    let op = match op {
        None => AttrOp::Exists,
        Some(("^=", value)) => AttrOp::Prefix(value.to_string()),
        Some((_, value)) => AttrOp::Equals(value.to_string()),
    };
    Ok((
        input,
        AttrSelector {
            name: name.to_string(),
            op,
        },
    ))
}

fn simple(input: &str) -> IResult<&str, Simple> {
    alt((
        map(preceded(char('#'), ident), |s: &str| Simple::Id(s.to_string())),
        map(preceded(char('.'), ident), |s: &str| Simple::Class(s.to_string())),
        map(attribute, Simple::Attr),
    ))(input)
}

fn compound(input: &str) -> IResult<&str, Compound> {
    let (rest, (tag_name, parts)) = pair(opt(type_name), many0(simple))(input)?;

    let mut compound = Compound {
        tag: tag_name.map(str::to_string),
        ..Default::default()
    };
    for part in parts {
        match part {
            Simple::Id(id) => compound.id = Some(id),
            Simple::Class(class) => compound.classes.push(class),
            Simple::Attr(attr) => compound.attributes.push(attr),
        }
    }
    if compound.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((rest, compound))
}

fn parse_selector(input: &str) -> IResult<&str, Vec<Compound>> {
    separated_list1(multispace1, compound)(input)
}
