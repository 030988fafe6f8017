//! Undirected relationship graph over book titles.
//!
//! Backed by a fixed-capacity adjacency matrix. Titles keep the index they were
//! added at; nothing is ever removed.

use std::fmt;

use itertools::Itertools;
use tracing::{instrument, warn};

use crate::domain::error::{DomainError, DomainResult};

/// Default number of titles a graph can hold.
pub const DEFAULT_CAPACITY: usize = 100;

/// Largest supported capacity; the matrix needs `capacity²` cells.
pub const MAX_CAPACITY: usize = 4096;

#[derive(Debug, Clone)]
pub struct RelationGraph {
    titles: Vec<String>,
    /// `capacity * capacity` cells, row-major
    adjacency: Vec<bool>,
    capacity: usize,
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacities above [`MAX_CAPACITY`] are clamped to it.
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity > MAX_CAPACITY {
            warn!("graph capacity {capacity} clamped to {MAX_CAPACITY}");
        }
        let capacity = capacity.min(MAX_CAPACITY);
        Self {
            titles: Vec::with_capacity(capacity),
            adjacency: vec![false; capacity * capacity],
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.titles.len() >= self.capacity
    }

    pub fn contains(&self, title: &str) -> bool {
        self.index_of(title).is_some()
    }

    /// Titles in insertion order.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Registers `title` at the next free index.
    #[instrument(level = "trace", skip(self))]
    pub fn add_node(&mut self, title: &str) -> DomainResult<usize> {
        if self.is_full() {
            return Err(DomainError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if self.contains(title) {
            return Err(DomainError::Duplicate(title.to_string()));
        }
        self.titles.push(title.to_string());
        Ok(self.titles.len() - 1)
    }

    /// Relates two registered titles in both directions.
    #[instrument(level = "trace", skip(self))]
    pub fn add_edge(&mut self, a: &str, b: &str) -> DomainResult<()> {
        let ia = self
            .index_of(a)
            .ok_or_else(|| DomainError::title_not_in_graph(a))?;
        let ib = self
            .index_of(b)
            .ok_or_else(|| DomainError::title_not_in_graph(b))?;
        if ia == ib {
            return Err(DomainError::SelfRelation(a.to_string()));
        }
        self.set(ia, ib);
        self.set(ib, ia);
        Ok(())
    }

    pub fn is_related(&self, a: &str, b: &str) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(ia), Some(ib)) => self.get(ia, ib),
            _ => false,
        }
    }

    /// Every title related to `title`, in index order.
    pub fn neighbors(&self, title: &str) -> DomainResult<Vec<&str>> {
        let row = self
            .index_of(title)
            .ok_or_else(|| DomainError::title_not_in_graph(title))?;
        Ok(self
            .titles
            .iter()
            .enumerate()
            .filter(|(col, _)| self.get(row, *col))
            .map(|(_, t)| t.as_str())
            .collect())
    }

    /// Copy of the occupied part of the matrix, insertion order on both axes.
    pub fn dump(&self) -> AdjacencyView {
        let n = self.titles.len();
        let rows = (0..n)
            .map(|i| (0..n).map(|j| self.get(i, j)).collect())
            .collect();
        AdjacencyView {
            titles: self.titles.clone(),
            rows,
        }
    }

    fn index_of(&self, title: &str) -> Option<usize> {
        self.titles.iter().position(|t| t == title)
    }

    fn get(&self, row: usize, col: usize) -> bool {
        self.adjacency
            .get(row * self.capacity + col)
            .copied()
            .unwrap_or(false)
    }

    fn set(&mut self, row: usize, col: usize) {
        if let Some(cell) = self.adjacency.get_mut(row * self.capacity + col) {
            *cell = true;
        }
    }
}

/// Snapshot of the adjacency matrix for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyView {
    pub titles: Vec<String>,
    pub rows: Vec<Vec<bool>>,
}

impl fmt::Display for AdjacencyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t{}", self.titles.iter().join("\t"))?;
        for (title, row) in self.titles.iter().zip(&self.rows) {
            let cells = row.iter().map(|&c| u8::from(c)).join("\t");
            writeln!(f, "{title}\t{cells}")?;
        }
        Ok(())
    }
}
