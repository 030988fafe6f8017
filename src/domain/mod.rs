//! Domain layer: entities and the in-memory structures
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod catalog;
pub mod entities;
pub mod error;
pub mod graph;
pub mod history;
pub mod members;
pub mod queue;

pub use catalog::Catalog;
pub use entities::*;
pub use error::{DomainError, DomainResult, Lookup};
pub use graph::{AdjacencyView, RelationGraph, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use history::HistoryLog;
pub use members::MemberDirectory;
pub use queue::RequestQueue;
