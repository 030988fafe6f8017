//! Domain entities: core data structures

use std::fmt;

use crate::domain::error::{DomainError, DomainResult};

/// Data file fields are comma separated, one record per line, so a field may
/// contain neither.
pub fn check_field(field: &'static str, value: &str) -> DomainResult<()> {
    if value.contains([',', '\n', '\r']) {
        return Err(DomainError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A catalog record. The title is the ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub author: String,
    /// ISBN or any other opaque identifier
    pub identifier: String,
    /// `true` until borrowed, flips back on return
    pub available: bool,
}

/// Borrow state of a single book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Borrowed,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            identifier: identifier.into(),
            available: true,
        }
    }

    pub fn availability(&self) -> Availability {
        if self.available {
            Availability::Available
        } else {
            Availability::Borrowed
        }
    }

    /// Fails when a field would not survive a save and reload.
    pub fn validate(&self) -> DomainResult<()> {
        check_field("title", &self.title)?;
        check_field("author", &self.author)?;
        check_field("identifier", &self.identifier)
    }

    /// Parse one line of the books file: `title,author,identifier`.
    ///
    /// Mirrors a plain comma split: missing trailing fields become empty
    /// strings and anything after the third comma is ignored.
    /// Returns `None` for blank lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }
        let mut fields = line.split(',');
        let title = fields.next().unwrap_or_default();
        let author = fields.next().unwrap_or_default();
        let identifier = fields.next().unwrap_or_default();
        Some(Self::new(title, author, identifier))
    }

    /// Serialize to the books file format. Availability is not part of it.
    pub fn to_line(&self) -> String {
        format!("{},{},{}", self.title, self.author, self.identifier)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title: {}, Author: {}, ISBN: {}, Available: {}",
            self.title,
            self.author,
            self.identifier,
            if self.available { "Yes" } else { "No" }
        )
    }
}

/// A registered library member, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub id: String,
}

impl Member {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        check_field("member name", &self.name)?;
        check_field("member id", &self.id)
    }

    /// Parse one line of the members file: `name,id`.
    pub fn parse_line(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }
        let mut fields = line.split(',');
        let name = fields.next().unwrap_or_default();
        let id = fields.next().unwrap_or_default();
        Some(Self::new(name, id))
    }

    pub fn to_line(&self) -> String {
        format!("{},{}", self.name, self.id)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {}, Member ID: {}", self.name, self.id)
    }
}
