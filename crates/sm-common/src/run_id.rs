//! ULID identifiers for processes and match generations.
//!
//! The process id is fixed at first access and stamped on startup logs.
//! Every match generation gets its own id from [`generate`], so a stored
//! result set can be traced back to the run that produced it.
//!
//! ```
//! use sm_common::run_id;
//!
//! let process = run_id::get();
//! let generation = run_id::generate();
//! assert_ne!(process, generation);
//! ```

use std::sync::LazyLock;

use ulid::Ulid;

static RUN_ID: LazyLock<String> = LazyLock::new(|| Ulid::new().to_string());

/// Process-level id: 26 characters, time-ordered.
#[inline]
pub fn get() -> &'static str {
    &RUN_ID
}

#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}
