//! `tracing` subscriber setup for binaries.
//!
//! The library only emits events; installing a subscriber is left to the binary.

use std::io;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default level when `RUST_LOG` is unset.
pub fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

/// Filter built from `RUST_LOG`, falling back to [`default_level`].
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level(verbose).into()))
}

/// Install a formatting subscriber writing to stderr, so stdout carries only the result.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_default_level() {
        assert_eq!(default_level(false), Level::WARN);
        assert_eq!(default_level(true), Level::DEBUG);
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_tracing(false);
        init_tracing(true);
    }
}
