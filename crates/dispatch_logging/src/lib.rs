#![deny(missing_docs)]
//! Shared logging utilities for the dispatch workspace.
//!
//! This crate provides the `dispatch_*` logging macros used by the core,
//! engine and application crates, plus a minimal test initializer for the
//! global logger. Progress lines meant for the operator are not routed here;
//! they go through the engine's progress sink.

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! dispatch_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! dispatch_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! dispatch_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! dispatch_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! dispatch_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Log level used by tests: debug in debug builds, info in release builds.
pub fn test_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized, which
/// happens routinely when several tests in one binary call it.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let _ = CombinedLogger::init(vec![TermLogger::new(
        test_level(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Never,
    )]);
}
