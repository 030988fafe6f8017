//! In-memory library engine.
//!
//! A title-ordered catalog (binary search tree), an undirected relationship
//! graph for recommendations, a queue of pending borrow requests and a
//! transaction history, kept consistent by [`application::services::LibraryService`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
