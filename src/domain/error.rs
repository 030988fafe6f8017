//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

/// What kind of key a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Book,
    GraphTitle,
    Member,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Lookup::Book => "book",
            Lookup::GraphTitle => "graph title",
            Lookup::Member => "member",
        };
        f.write_str(s)
    }
}

/// Domain errors represent violated structure rules.
/// None of them are fatal: the caller can retry with different input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: Lookup, key: String },

    #[error("title already in graph: {0}")]
    Duplicate(String),

    #[error("graph is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("{0} is empty")]
    EmptyContainer(&'static str),

    #[error("a title cannot be related to itself: {0}")]
    SelfRelation(String),

    #[error("{field} must not contain commas or line breaks: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

impl DomainError {
    pub fn book_not_found(title: impl Into<String>) -> Self {
        Self::NotFound {
            kind: Lookup::Book,
            key: title.into(),
        }
    }

    pub fn title_not_in_graph(title: impl Into<String>) -> Self {
        Self::NotFound {
            kind: Lookup::GraphTitle,
            key: title.into(),
        }
    }

    pub fn member_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: Lookup::Member,
            key: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
