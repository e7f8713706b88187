//! Environment variable access.
//!
//! ```
//! use gitnotify_std::env::{ReadEnv, SystemEnv};
//!
//! fn config_token<E: ReadEnv>(env: &E) -> Option<String> {
//!     env.var("GITNOTIFY_CONFIG_TOKEN").ok().filter(|t| !t.is_empty())
//! }
//!
//! let _ = config_token(&SystemEnv);
//! ```

mod in_memory;
mod system;

#[cfg(any(test, feature = "test-support"))]
pub use in_memory::InMemoryEnv;
pub use system::SystemEnv;

/// Does **not** require `Send + Sync`. Add the bounds at your call site.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, std::env::VarError>;
}
