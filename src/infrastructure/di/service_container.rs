//! Service container for dependency injection
//!
//! Wires the library service to settings and the filesystem.

use std::sync::Arc;

use crate::application::services::{LibraryPaths, LibraryService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding settings and I/O dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    pub fn library_paths(&self) -> LibraryPaths {
        LibraryPaths {
            books: self.settings.books_path(),
            members: self.settings.members_path(),
        }
    }

    /// Open the library described by the settings, loading its data files.
    pub fn open_library(&self) -> ApplicationResult<LibraryService> {
        LibraryService::open(
            Arc::clone(&self.fs),
            self.library_paths(),
            self.settings.graph_capacity,
        )
    }
}
