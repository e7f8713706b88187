//! Zero-cost seams over `std` for gitnotify.
//!
//! | Concern | Trait(s) | Production | Test |
//! |---------|----------|------------|------|
//! | Env vars | [`ReadEnv`] | [`SystemEnv`] | [`InMemoryEnv`]* |
//! | Filesystem | [`ReadFile`], [`WriteFile`] | [`SystemFs`] | [`MemFs`]* |
//!
//! *Available with `#[cfg(test)]` or the `"test-support"` feature.
//!
//! # Thread Safety
//!
//! Every type here is `Send + Sync`. The in-memory doubles are backed by a
//! `Mutex` so they can sit inside shared axum state under a multi-threaded
//! `#[tokio::test]` runtime.

pub mod env;
pub mod fs;

pub use env::{ReadEnv, SystemEnv};
pub use fs::{ReadFile, SystemFs, WriteFile};

#[cfg(any(test, feature = "test-support"))]
pub use env::InMemoryEnv;
#[cfg(any(test, feature = "test-support"))]
pub use fs::MemFs;
