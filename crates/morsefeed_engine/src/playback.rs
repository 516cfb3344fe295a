//! The player subprocess and interactive pause/skip/quit control.
//!
//! Rows go to the player's stdin; after each row the player writes one
//! acknowledgment line to its stdout, so we never run more than a row ahead
//! of what has been played.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::ControlFlow;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use feed_logging::{feed_debug, feed_info, feed_trace, feed_warn};
use morsefeed_core::{FeedOptions, StopReason};

use crate::signals::child_exit_observed;
use crate::terminal::KeySource;
use crate::{FeedError, RowSink};

pub const DEFAULT_PLAYER: &str = "mbeep";

#[derive(Debug, Clone)]
pub struct PlaybackSettings {
    /// Sleep between key polls while paused.
    pub pause_poll_interval: Duration,
    /// Sleep right after pausing, so a held space bar does not toggle twice.
    pub pause_debounce: Duration,
    /// Read pause/skip/quit keys from a raw-mode terminal when stdin is one.
    pub key_control: bool,
    pub install_signal_handlers: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            pause_poll_interval: Duration::from_millis(50),
            pause_debounce: Duration::from_millis(500),
            key_control: true,
            install_signal_handlers: true,
        }
    }
}

/// Program and arguments used to start the player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCommand {
    pub program: String,
    pub frequency: Option<f64>,
    pub paris_wpm: Option<f64>,
    pub codex_wpm: Option<f64>,
    pub farnsworth_wpm: Option<f64>,
    pub print_fcc_wpm: bool,
}

impl PlayerCommand {
    pub fn from_options(program: impl Into<String>, options: &FeedOptions, print_fcc_wpm: bool) -> Self {
        Self {
            program: program.into(),
            frequency: options.frequency,
            paris_wpm: options.paris_wpm,
            codex_wpm: options.codex_wpm,
            farnsworth_wpm: options.farnsworth_wpm,
            print_fcc_wpm,
        }
    }

    /// Echo mode, stdin input, optional tone and speed settings, then `-c`.
    /// PARIS speed wins over CODEX speed when both are set.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-e".to_string(), "-I".to_string()];
        if let Some(freq) = self.frequency {
            args.extend(["-f".to_string(), format!("{freq:.3}")]);
        }
        if let Some(wpm) = self.paris_wpm {
            args.extend(["-w".to_string(), format!("{wpm:.3}")]);
        } else if let Some(wpm) = self.codex_wpm {
            args.extend(["--codex-wpm".to_string(), format!("{wpm:.3}")]);
        }
        if let Some(wpm) = self.farnsworth_wpm {
            args.extend(["-x".to_string(), format!("{wpm:.3}")]);
        }
        if self.print_fcc_wpm {
            args.push("--fcc".to_string());
        }
        args.push("-c".to_string());
        args
    }
}

/// A running player. Dropping it closes both pipes and reaps the child.
pub struct Playback {
    child: Child,
    to_player: Option<BufWriter<ChildStdin>>,
    from_player: Option<BufReader<ChildStdout>>,
    keys: Option<Box<dyn KeySource>>,
    settings: PlaybackSettings,
    paused: bool,
    rows_acknowledged: u64,
    exit_status: Option<ExitStatus>,
}

impl Playback {
    pub fn spawn(
        command: &PlayerCommand,
        keys: Option<Box<dyn KeySource>>,
        settings: PlaybackSettings,
    ) -> Result<Self, FeedError> {
        let args = command.args();
        feed_debug!("starting {} {}", command.program, args.join(" "));
        let mut child = Command::new(&command.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| FeedError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(FeedError::Pipe("player pipes were not created".to_string()));
        };
        feed_info!("player {} started (pid {})", command.program, child.id());

        Ok(Self {
            child,
            to_player: Some(BufWriter::new(stdin)),
            from_player: Some(BufReader::new(stdout)),
            keys,
            settings,
            paused: false,
            rows_acknowledged: 0,
            exit_status: None,
        })
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn rows_acknowledged(&self) -> u64 {
        self.rows_acknowledged
    }

    /// Closes both pipes and waits for the player to exit.
    /// A player that crashed or was killed is not an error here.
    pub fn shutdown(&mut self) -> Result<ExitStatus, FeedError> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }
        let flushed = match self.to_player.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        };
        self.from_player = None;
        self.keys = None;

        let status = self.child.wait()?;
        self.exit_status = Some(status);
        feed_info!(
            "player exited with {status} after {} rows",
            self.rows_acknowledged
        );
        if child_exit_observed() {
            feed_trace!("SIGCHLD seen for player");
        }
        if let Err(err) = flushed {
            feed_warn!("flushing the last row to the player failed: {err}");
        }
        Ok(status)
    }

    fn writer(&mut self) -> Result<&mut BufWriter<ChildStdin>, FeedError> {
        self.to_player
            .as_mut()
            .ok_or_else(|| FeedError::Pipe("player input already closed".to_string()))
    }

    fn pipe_error(context: &str, err: std::io::Error) -> FeedError {
        FeedError::Pipe(format!("{context}: {err}"))
    }
}

impl RowSink for Playback {
    fn write_text(&mut self, text: &str) -> Result<(), FeedError> {
        self.writer()?
            .write_all(text.as_bytes())
            .map_err(|err| Self::pipe_error("writing to player", err))
    }

    fn end_row(&mut self) -> Result<(), FeedError> {
        let writer = self.writer()?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|err| Self::pipe_error("sending row to player", err))?;

        let reader = self
            .from_player
            .as_mut()
            .ok_or_else(|| FeedError::Pipe("player output already closed".to_string()))?;
        let mut ack = String::new();
        let read = reader
            .read_line(&mut ack)
            .map_err(|err| Self::pipe_error("reading player acknowledgment", err))?;
        if read == 0 {
            return Err(FeedError::Pipe(
                "player closed its output before acknowledging a row".to_string(),
            ));
        }
        self.rows_acknowledged += 1;
        feed_trace!("player acknowledged {:?}", ack.trim_end());
        Ok(())
    }

    fn poll_control(&mut self) -> Result<ControlFlow<StopReason>, FeedError> {
        let Some(keys) = self.keys.as_mut() else {
            return Ok(ControlFlow::Continue(()));
        };
        loop {
            let key = keys.poll_key()?;
            match key {
                Some(b' ') => {
                    self.paused = !self.paused;
                    if self.paused {
                        feed_info!("paused");
                        thread::sleep(self.settings.pause_debounce);
                    } else {
                        feed_info!("resumed");
                    }
                }
                Some(b'q' | b'Q') => {
                    feed_info!("quit requested");
                    return Ok(ControlFlow::Break(StopReason::Quit));
                }
                Some(b'n' | b'N') => {
                    feed_info!("skip to next page requested");
                    return Ok(ControlFlow::Break(StopReason::NextPage));
                }
                _ => {}
            }
            if !self.paused {
                return Ok(ControlFlow::Continue(()));
            }
            if key.is_none() {
                thread::sleep(self.settings.pause_poll_interval);
            }
        }
    }

    /// The player gets no newline for a row the user walked away from.
    fn abandon_row(&mut self) -> Result<(), FeedError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), FeedError> {
        self.shutdown().map(|_| ())
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        if self.exit_status.is_none() {
            if let Err(err) = self.shutdown() {
                feed_warn!("player shutdown failed: {err}");
            }
        }
    }
}
