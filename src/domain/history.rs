//! Append-only transaction log read back most-recent-first.
//!
//! A singly linked stack of boxed nodes. Reading walks the links and never
//! pops, so a replay can be repeated and always sees the same entries.

use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug)]
struct Entry {
    text: String,
    next: Option<Box<Entry>>,
}

#[derive(Debug, Default)]
pub struct HistoryLog {
    top: Option<Box<Entry>>,
    len: usize,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    pub fn append(&mut self, text: impl Into<String>) {
        let entry = Box::new(Entry {
            text: text.into(),
            next: self.top.take(),
        });
        self.top = Some(entry);
        self.len += 1;
    }

    /// Most recent entry.
    pub fn peek(&self) -> DomainResult<&str> {
        self.top
            .as_deref()
            .map(|e| e.text.as_str())
            .ok_or(DomainError::EmptyContainer("history log"))
    }

    /// Borrowing walk from newest to oldest.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.top.as_deref(),
        }
    }

    /// Independent copy of the whole log.
    pub fn snapshot(&self) -> HistoryLog {
        self.clone()
    }

    /// Owned copy of every entry, newest first. The live log is untouched.
    pub fn replay(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }
}

impl Clone for HistoryLog {
    /// Deep copy preserving order; the two logs share no nodes afterwards.
    fn clone(&self) -> Self {
        let mut copy = HistoryLog::new();
        let entries: Vec<&str> = self.iter().collect();
        for text in entries.into_iter().rev() {
            copy.append(text);
        }
        copy
    }
}

impl Drop for HistoryLog {
    // Boxed links dropped recursively overflow the stack on long logs.
    fn drop(&mut self) {
        let mut cursor = self.top.take();
        while let Some(mut entry) = cursor {
            cursor = entry.next.take();
        }
    }
}

pub struct Iter<'a> {
    next: Option<&'a Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.next?;
        self.next = entry.next.as_deref();
        Some(entry.text.as_str())
    }
}
