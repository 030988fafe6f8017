//! FIFO of titles waiting for a borrowed book.
//!
//! A singly linked list whose nodes live in an arena; the queue keeps indices
//! to both ends so enqueue and dequeue are O(1).

use generational_arena::{Arena, Index};

use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug)]
struct QueueNode {
    title: String,
    next: Option<Index>,
}

#[derive(Debug, Default)]
pub struct RequestQueue {
    nodes: Arena<QueueNode>,
    front: Option<Index>,
    rear: Option<Index>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_none()
    }

    pub fn enqueue(&mut self, title: impl Into<String>) {
        let idx = self.nodes.insert(QueueNode {
            title: title.into(),
            next: None,
        });
        match self.rear.and_then(|rear| self.nodes.get_mut(rear)) {
            Some(rear) => rear.next = Some(idx),
            None => self.front = Some(idx),
        }
        self.rear = Some(idx);
    }

    pub fn dequeue(&mut self) -> DomainResult<String> {
        let front = self.front.ok_or(DomainError::EmptyContainer("request queue"))?;
        let node = self
            .nodes
            .remove(front)
            .ok_or(DomainError::EmptyContainer("request queue"))?;
        self.front = node.next;
        if self.front.is_none() {
            self.rear = None;
        }
        Ok(node.title)
    }

    pub fn peek(&self) -> DomainResult<&str> {
        self.front
            .and_then(|idx| self.nodes.get(idx))
            .map(|n| n.title.as_str())
            .ok_or(DomainError::EmptyContainer("request queue"))
    }

    /// Oldest first, without consuming anything.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let mut cursor = self.front;
        std::iter::from_fn(move || {
            let node = self.nodes.get(cursor?)?;
            cursor = node.next;
            Some(node.title.as_str())
        })
    }

    /// How many requests are waiting on `title`.
    pub fn count_of(&self, title: &str) -> usize {
        self.iter().filter(|t| *t == title).count()
    }
}
