#![deny(missing_docs)]
//! Logging for morsefeed runs.
//!
//! The `feed_*` macros forward to the `log` facade with the caller's module
//! as target. While a linked page is being streamed, every line is tagged
//! with that page's index so fetch, pause and skip messages can be matched
//! to the banner printed for the page.

use std::cell::Cell;
use std::fmt::Arguments;

thread_local! {
    static PAGE_INDEX: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Records which linked page the current thread is streaming.
/// Pass `None` once the pipeline leaves multi-page mode.
pub fn set_page_index(index: Option<usize>) {
    PAGE_INDEX.with(|v| v.set(index));
}

/// Returns the linked page index set by [`set_page_index`], if any.
pub fn page_index() -> Option<usize> {
    PAGE_INDEX.with(|v| v.get())
}

#[doc(hidden)]
pub use log as __log;

#[doc(hidden)]
pub fn emit(level: log::Level, target: &str, args: Arguments<'_>) {
    match page_index() {
        Some(index) => log::log!(target: target, level, "[page {index}] {args}"),
        None => log::log!(target: target, level, "{args}"),
    }
}

/// Logs at trace level.
#[macro_export]
macro_rules! feed_trace {
    ($($arg:tt)*) => {
        $crate::emit($crate::__log::Level::Trace, module_path!(), format_args!($($arg)*))
    };
}

/// Logs at debug level.
#[macro_export]
macro_rules! feed_debug {
    ($($arg:tt)*) => {
        $crate::emit($crate::__log::Level::Debug, module_path!(), format_args!($($arg)*))
    };
}

/// Logs at info level.
#[macro_export]
macro_rules! feed_info {
    ($($arg:tt)*) => {
        $crate::emit($crate::__log::Level::Info, module_path!(), format_args!($($arg)*))
    };
}

/// Logs at warn level.
#[macro_export]
macro_rules! feed_warn {
    ($($arg:tt)*) => {
        $crate::emit($crate::__log::Level::Warn, module_path!(), format_args!($($arg)*))
    };
}

/// Logs at error level.
#[macro_export]
macro_rules! feed_error {
    ($($arg:tt)*) => {
        $crate::emit($crate::__log::Level::Error, module_path!(), format_args!($($arg)*))
    };
}

/// Sends debug output to stderr for tests; stdout is often the sink under test.
/// Does nothing when a logger is already installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

    let _ = TermLogger::init(
        log::LevelFilter::Debug,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Never,
    );
}
