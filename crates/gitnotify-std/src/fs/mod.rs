//! Filesystem access for the configuration file.
//!
//! ```
//! use gitnotify_std::fs::{ReadFile, SystemFs};
//! use std::path::Path;
//!
//! fn read_config<F: ReadFile>(fs: &F, path: &Path) -> String {
//!     fs.read_to_string(path).unwrap_or_default()
//! }
//!
//! let _ = read_config(&SystemFs, Path::new("config.yml"));
//! ```

use std::io;
use std::path::Path;

mod mem;
mod system;

#[cfg(any(test, feature = "test-support"))]
pub use mem::MemFs;
pub use system::SystemFs;

pub trait ReadFile {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Replaces the whole file at `path` with `contents`.
pub trait WriteFile {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}
