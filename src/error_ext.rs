//! Logging conversions from `Result` to `Option`.
//!
//! The analyzer never lets a failure cross its public boundary; this helper
//! makes sure the dropped error still reaches the log.

use tracing::warn;

/// Turn a `Result` into an `Option`, logging the error on the way.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Log at warn level. A container file that does not parse is an
    /// expected case and goes through here.
    fn ok_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn ok_warn(self, context: &str) -> Option<T> {
        self.map_err(|e| warn!(context = %context, error = %e, "Recovered from failure"))
            .ok()
    }
}
