//! Emitter configuration.
//!
//! The first-attempt buffer size can be overridden with the
//! `SETFMT_INITIAL_CAPACITY` environment variable (decimal or `0x` hex).
//! Zero, unparseable, or missing values select the default of 1024 bytes.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Capacity of the first render attempt.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Environment variable consulted by [`EmitConfig::from_env`].
pub const INITIAL_CAPACITY_ENV: &str = "SETFMT_INITIAL_CAPACITY";

/// Capacities are reported to sinks as `u32`.
const MAX_INITIAL_CAPACITY: usize = u32::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitConfig {
    /// Bytes allocated for the first render attempt. Always at least 1.
    pub initial_capacity: usize,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl EmitConfig {
    /// Config with an explicit first-attempt capacity, clamped to `1..=u32::MAX`.
    #[must_use]
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            initial_capacity: initial_capacity.clamp(1, MAX_INITIAL_CAPACITY),
        }
    }

    /// Config resolved from the environment (cached after the first call).
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(initial_capacity())
    }
}

/// Parse an initial-capacity override. Returns the default on bad input.
#[must_use]
pub fn parse_initial_capacity(raw: &str) -> usize {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse::<usize>().ok(),
    };
    match parsed {
        Some(0) | None => DEFAULT_INITIAL_CAPACITY,
        Some(n) => n.min(MAX_INITIAL_CAPACITY),
    }
}

// 0 = unresolved, usize::MAX = resolving, anything else = resolved capacity.
static CACHED_CAPACITY: AtomicUsize = AtomicUsize::new(0);

const CAPACITY_UNRESOLVED: usize = 0;
const CAPACITY_RESOLVING: usize = usize::MAX;

/// Initial capacity from `SETFMT_INITIAL_CAPACITY`, resolved once per process.
///
/// A caller that races the first resolution gets the default rather than
/// blocking.
#[must_use]
pub fn initial_capacity() -> usize {
    let cached = CACHED_CAPACITY.load(Ordering::Acquire);
    if cached != CAPACITY_UNRESOLVED && cached != CAPACITY_RESOLVING {
        return cached;
    }
    if cached == CAPACITY_RESOLVING {
        return DEFAULT_INITIAL_CAPACITY;
    }

    if CACHED_CAPACITY
        .compare_exchange(
            CAPACITY_UNRESOLVED,
            CAPACITY_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        let v = CACHED_CAPACITY.load(Ordering::Acquire);
        return if v != CAPACITY_UNRESOLVED && v != CAPACITY_RESOLVING {
            v
        } else {
            DEFAULT_INITIAL_CAPACITY
        };
    }

    let capacity = std::env::var(INITIAL_CAPACITY_ENV)
        .map(|v| parse_initial_capacity(&v))
        .unwrap_or(DEFAULT_INITIAL_CAPACITY);
    CACHED_CAPACITY.store(capacity, Ordering::Release);
    capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_1024() {
        assert_eq!(EmitConfig::default().initial_capacity, 1024);
    }

    #[test]
    fn parse_accepts_decimal_and_hex() {
        assert_eq!(parse_initial_capacity("64"), 64);
        assert_eq!(parse_initial_capacity(" 0x100 "), 256);
        assert_eq!(parse_initial_capacity("0X10"), 16);
    }

    #[test]
    fn parse_falls_back_on_bad_input() {
        assert_eq!(parse_initial_capacity(""), DEFAULT_INITIAL_CAPACITY);
        assert_eq!(parse_initial_capacity("0"), DEFAULT_INITIAL_CAPACITY);
        assert_eq!(parse_initial_capacity("big"), DEFAULT_INITIAL_CAPACITY);
        assert_eq!(parse_initial_capacity("-5"), DEFAULT_INITIAL_CAPACITY);
    }

    #[test]
    fn new_clamps_to_valid_range() {
        assert_eq!(EmitConfig::new(0).initial_capacity, 1);
        assert_eq!(
            EmitConfig::new(usize::MAX).initial_capacity,
            u32::MAX as usize
        );
    }

    #[test]
    fn cached_capacity_is_stable() {
        let first = initial_capacity();
        assert!(first >= 1);
        assert_eq!(initial_capacity(), first);
        assert_eq!(EmitConfig::from_env().initial_capacity, first);
    }
}
