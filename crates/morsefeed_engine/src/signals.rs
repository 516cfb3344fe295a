//! Process-wide teardown for playback sessions.
//!
//! Terminating signals restore the terminal and exit. Child exits are only
//! recorded. A panic restores the terminal and prints a backtrace before the
//! default hook runs.

use std::backtrace::Backtrace;
use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use feed_logging::feed_debug;
use signal_hook::consts::{SIGCHLD, SIGHUP, SIGINT, SIGPIPE, SIGQUIT, SIGTERM, SIGTSTP};
use signal_hook::iterator::Signals;

use crate::terminal::restore_saved_terminal;

/// SIGSEGV is absent: signal-hook refuses to register it, and restoring the
/// terminal takes a lock that is not async-signal-safe. A segfault or a stack
/// overflow abort leaves stdin raw and non-blocking; `stty sane` recovers it.
/// Panics are covered by the panic hook instead.
const TERMINATING_SIGNALS: [i32; 6] = [SIGINT, SIGHUP, SIGQUIT, SIGTERM, SIGPIPE, SIGTSTP];

static CHILD_EXITED: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Installs the handlers once per process. Later calls do nothing.
pub fn install_teardown_handlers() -> io::Result<()> {
    if CHILD_EXITED.get().is_some() {
        return Ok(());
    }

    let child_exited = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGCHLD, Arc::clone(&child_exited))?;

    let mut signals = Signals::new(TERMINATING_SIGNALS)?;
    thread::Builder::new()
        .name("signal-teardown".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                restore_saved_terminal();
                eprintln!(" caught {}", signal_name(signal));
                std::process::exit(1);
            }
        })?;

    install_panic_hook();
    let _ = CHILD_EXITED.set(child_exited);
    feed_debug!("signal teardown handlers installed");
    Ok(())
}

/// True once SIGCHLD has been delivered after installation.
pub fn child_exit_observed() -> bool {
    CHILD_EXITED
        .get()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_saved_terminal();
        eprintln!("Stack:\n{}", Backtrace::force_capture());
        default_hook(info);
    }));
}

fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGINT => "SIGINT",
        SIGHUP => "SIGHUP",
        SIGQUIT => "SIGQUIT",
        SIGTERM => "SIGTERM",
        SIGPIPE => "SIGPIPE",
        SIGTSTP => "SIGTSTP",
        _ => "signal",
    }
}
