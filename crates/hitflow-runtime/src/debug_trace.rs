#![forbid(unsafe_code)]

//! Opt-in stderr tracing for scheduler internals.
//!
//! Set `HITFLOW_DEBUG_TRACE=1` to print drain and flush diagnostics to
//! stderr without installing a `tracing` subscriber. When unset, each call
//! site costs one static bool load.
//!
//! ```ignore
//! use hitflow_runtime::debug_trace;
//! debug_trace!("drain stopped: remaining={}", remaining);
//! ```

use std::sync::LazyLock;
use std::time::Instant;

/// Environment variable that enables [`debug_trace!`](crate::debug_trace).
pub const DEBUG_TRACE_ENV: &str = "HITFLOW_DEBUG_TRACE";

static DEBUG_TRACE_ENABLED: LazyLock<bool> =
    LazyLock::new(|| std::env::var(DEBUG_TRACE_ENV).is_ok_and(|v| parse_flag(&v)));

/// Startup timestamp for relative timing in debug output.
static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Check if debug tracing is enabled.
#[inline]
pub fn is_enabled() -> bool {
    *DEBUG_TRACE_ENABLED
}

/// Milliseconds since the first trace call.
#[inline]
pub fn elapsed_ms() -> u64 {
    START_TIME.elapsed().as_millis() as u64
}

/// Print a timestamped line to stderr when `HITFLOW_DEBUG_TRACE` is set.
#[macro_export]
macro_rules! debug_trace {
    ($($arg:tt)*) => {
        if $crate::debug_trace::is_enabled() {
            eprintln!(
                "[hitflow {:>8}ms] {}",
                $crate::debug_trace::elapsed_ms(),
                format_args!($($arg)*)
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("true"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("yes"));
    }

    #[test]
    fn elapsed_ms_increases() {
        let t1 = elapsed_ms();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(elapsed_ms() >= t1);
    }

    #[test]
    fn macro_expands() {
        let _ = is_enabled();
        crate::debug_trace!("value={}", 3);
    }
}
