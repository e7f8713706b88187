use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use super::{ReadFile, WriteFile};

/// Zero-sized type, delegates to `std::fs`.
pub struct SystemFs;

impl ReadFile for SystemFs {
    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

impl WriteFile for SystemFs {
    /// Writes to a uniquely named temp file in the target directory and
    /// persists it over `path`, so readers never see a half-written file.
    /// The temp file is created `0600` on Unix and removed if any step fails.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path)?;
        Ok(())
    }
}
