use std::path::PathBuf;

use morsefeed_core::FeedOptions;

use crate::playback::{PlaybackSettings, DEFAULT_PLAYER};
use crate::store::default_state_path;

/// Everything one run needs, with options already validated by the caller
/// or by [`crate::run_feed`].
#[derive(Debug, Clone)]
pub struct FeedParams {
    pub options: FeedOptions,
    /// `None` writes to stdout.
    pub output_path: Option<PathBuf>,
    pub state_path: Option<PathBuf>,
    pub print_fcc_wpm: bool,
    pub player_program: String,
    pub playback: PlaybackSettings,
}

impl FeedParams {
    pub fn new(options: FeedOptions) -> Self {
        Self {
            options,
            output_path: None,
            state_path: default_state_path(),
            print_fcc_wpm: false,
            player_program: DEFAULT_PLAYER.to_string(),
            playback: PlaybackSettings::default(),
        }
    }

    /// URL if given, else the input file name. Stdin has no key.
    pub fn source_key(&self) -> Option<&str> {
        self.options
            .url
            .as_deref()
            .or(self.options.input_file.as_deref())
    }
}
