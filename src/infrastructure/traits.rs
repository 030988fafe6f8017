//! I/O boundary for the data files
//!
//! The library only ever reads a whole file or replaces one, so the trait
//! exposes exactly that. Tests swap in their own implementation.

use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

/// Whole-file access to the books and members files.
pub trait FileSystem: Send + Sync {
    /// Contents of `path`, or `None` when it does not exist yet.
    fn read_optional(&self, path: &Path) -> io::Result<Option<String>>;

    /// Replace `path` with `content`, creating missing parent directories.
    fn replace(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Real filesystem. Writes go to a sibling `.tmp` file that is then renamed
/// over the target, so readers see either the old or the new file.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    fn staging_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl FileSystem for RealFileSystem {
    fn read_optional(&self, path: &Path) -> io::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn replace(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let staging = Self::staging_path(path);
        trace!("replace {} via {}", path.display(), staging.display());
        std::fs::write(&staging, content)?;
        std::fs::rename(&staging, path)
    }
}
