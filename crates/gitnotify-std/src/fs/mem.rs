#[cfg(any(test, feature = "test-support"))]
use std::collections::HashMap;
#[cfg(any(test, feature = "test-support"))]
use std::io;
#[cfg(any(test, feature = "test-support"))]
use std::path::{Path, PathBuf};
#[cfg(any(test, feature = "test-support"))]
use std::sync::Mutex;
#[cfg(any(test, feature = "test-support"))]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(any(test, feature = "test-support"))]
use super::{ReadFile, WriteFile};

/// In-memory filesystem. All methods take `&self`.
///
/// Paths are stored as raw [`PathBuf`] keys with **no normalization**:
/// `"config.yml"` and `"./config.yml"` are distinct entries.
///
/// [`MemFs::fail_writes`] makes every subsequent write return
/// `PermissionDenied`, for exercising persistence failures.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct MemFs {
    files: Mutex<HashMap<PathBuf, String>>,
    fail_writes: AtomicBool,
}

#[cfg(any(test, feature = "test-support"))]
impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ReadFile for MemFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WriteFile for MemFs {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            ));
        }
        self.insert(path, contents);
        Ok(())
    }
}
