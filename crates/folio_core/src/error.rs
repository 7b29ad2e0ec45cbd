//! Error types for folio_core

use thiserror::Error;

use crate::document::ElementId;

/// Errors raised by document mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The element was never created or has been removed
    #[error("element {0:?} is not part of the document")]
    MissingElement(ElementId),

    /// Another writer holds the element's content lock
    #[error("content of element {0:?} is locked by an active writer")]
    ContentLocked(ElementId),

    /// A content lock was presented for the wrong element or after release
    #[error("stale content lock for element {0:?}")]
    StaleLock(ElementId),
}

/// Errors raised while parsing a selector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("invalid selector `{input}` near `{remaining}`")]
    Invalid { input: String, remaining: String },
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DomError>;
