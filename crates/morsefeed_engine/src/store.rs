//! The flat position/option store file, usually `~/.morsefeed`.
//!
//! Every operation reads the whole file, edits the table in memory and
//! rewrites it atomically. Concurrent invocations may still lose an update.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use feed_logging::{feed_debug, feed_info};
use morsefeed_core::{FeedOptions, RecordTable, STATE_FIELDS, STATE_TAG};

use crate::persist::AtomicFileWriter;
use crate::FeedError;

pub const STATE_FILE_NAME: &str = ".morsefeed";

/// `$HOME/.morsefeed`, when `HOME` is set.
pub fn default_state_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(STATE_FILE_NAME))
}

#[derive(Debug, Clone)]
pub struct PositionStore {
    writer: AtomicFileWriter,
}

impl PositionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.writer.target()
    }

    /// A missing file reads as an empty store.
    pub fn load(&self) -> Result<RecordTable, FeedError> {
        match fs::read(self.path()) {
            Ok(bytes) => Ok(RecordTable::parse(&String::from_utf8_lossy(&bytes))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(RecordTable::new()),
            Err(source) => Err(FeedError::Open {
                path: self.path().to_path_buf(),
                source,
            }),
        }
    }

    fn save(&self, table: &RecordTable) -> Result<(), FeedError> {
        self.writer.write(&table.format())?;
        feed_debug!("rewrote {} ({} records)", self.path().display(), table.len());
        Ok(())
    }

    pub fn read_position(&self, key: &str) -> Result<u64, FeedError> {
        Ok(self.load()?.position(key))
    }

    /// Saves `offset` for `key`; 0 removes the record. The file is left
    /// untouched when nothing changes.
    pub fn write_position(&self, key: &str, offset: u64) -> Result<(), FeedError> {
        let mut table = self.load()?;
        if table.position(key) == offset {
            return Ok(());
        }
        table.set_position(key, offset);
        self.save(&table)?;
        if offset == 0 {
            feed_info!("cleared saved position for {key}");
        } else {
            feed_info!("saved position {offset} for {key}");
        }
        Ok(())
    }

    pub fn save_options(&self, label: &str, options: &FeedOptions) -> Result<(), FeedError> {
        let mut table = self.load()?;
        table.upsert(options.to_record(label));
        self.save(&table)?;
        feed_info!("saved options under {label:?}");
        Ok(())
    }

    pub fn load_options(&self, label: &str) -> Result<FeedOptions, FeedError> {
        let table = self.load()?;
        let record = table
            .find(STATE_TAG, label, STATE_FIELDS)
            .ok_or_else(|| FeedError::UnknownLabel(label.to_string()))?;
        Ok(FeedOptions::from_record(record)?)
    }
}
