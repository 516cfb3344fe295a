//! Raw, non-blocking, non-echoing stdin for single-key playback control.
//!
//! The attributes and descriptor flags in effect before [`TerminalGuard::acquire`]
//! are kept in a process-wide slot so the signal thread and the panic hook can
//! put the terminal back too. Whoever takes the slot first restores it; later
//! attempts are no-ops.

use std::io;
use std::sync::Mutex;

use feed_logging::{feed_debug, feed_warn};
use rustix::fs::{fcntl_getfl, fcntl_setfl, OFlags};
use rustix::io::Errno;
use rustix::termios::{self, LocalModes, OptionalActions, Termios};

struct SavedTerminal {
    termios: Termios,
    flags: OFlags,
}

static SAVED_TERMINAL: Mutex<Option<SavedTerminal>> = Mutex::new(None);

/// Something that can be polled for a single pending keystroke.
pub trait KeySource {
    /// Returns `None` when no key is waiting.
    fn poll_key(&mut self) -> io::Result<Option<u8>>;
}

pub fn stdin_is_terminal() -> bool {
    termios::isatty(io::stdin())
}

/// Holds stdin in raw mode until dropped.
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn acquire() -> io::Result<Self> {
        let stdin = io::stdin();
        let original = termios::tcgetattr(&stdin)?;
        let flags = fcntl_getfl(&stdin)?;

        let mut raw = original.clone();
        raw.local_modes.remove(LocalModes::ECHO | LocalModes::ICANON);

        {
            let mut saved = lock_saved();
            if saved.is_none() {
                *saved = Some(SavedTerminal {
                    termios: original,
                    flags,
                });
            }
        }

        let applied = termios::tcsetattr(&stdin, OptionalActions::Now, &raw)
            .and_then(|()| fcntl_setfl(&stdin, flags | OFlags::NONBLOCK));
        if let Err(err) = applied {
            restore_saved_terminal();
            return Err(err.into());
        }
        feed_debug!("terminal switched to raw non-blocking mode");
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if restore_saved_terminal() {
            feed_debug!("terminal mode restored");
        }
    }
}

impl KeySource for TerminalGuard {
    fn poll_key(&mut self) -> io::Result<Option<u8>> {
        let mut key = [0u8; 1];
        match rustix::io::read(io::stdin(), &mut key[..]) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(key[0])),
            Err(err) if err == Errno::AGAIN || err == Errno::INTR => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Puts back the terminal state saved by [`TerminalGuard::acquire`].
/// Returns whether there was anything to restore.
pub fn restore_saved_terminal() -> bool {
    let Some(saved) = lock_saved().take() else {
        return false;
    };
    let stdin = io::stdin();
    if let Err(err) = termios::tcsetattr(&stdin, OptionalActions::Now, &saved.termios) {
        feed_warn!("restoring terminal attributes failed: {err}");
    }
    if let Err(err) = fcntl_setfl(&stdin, saved.flags) {
        feed_warn!("restoring stdin flags failed: {err}");
    }
    true
}

fn lock_saved() -> std::sync::MutexGuard<'static, Option<SavedTerminal>> {
    SAVED_TERMINAL
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
