use std::path::{Path, PathBuf};

use clap::Parser;
use morsefeed_core::FeedOptions;
use morsefeed_engine::{
    default_state_path, FeedError, FeedParams, PlaybackSettings, PositionStore, DEFAULT_PLAYER,
};

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "morsefeed")]
#[command(
    version,
    about = "Converts text and web pages for Morse code practice",
    long_about = None
)]
#[command(after_help = "EXAMPLES:
    morsefeed -i book.txt -o drill.txt -c 5      Write five words per row
    morsefeed -i book.txt -m -p -w 20            Play at 20 wpm, resuming where the last session stopped
    morsefeed -u https://lite.cnn.com -L -m      Play every linked article
    morsefeed -r news                            Rerun options saved with -s news

KEYS (while playing):
    space   pause / resume
    n       skip to the next linked page
    q       quit")]
pub struct Cli {
    /// Input file for text to be converted
    #[arg(short = 'i', value_name = "FILE", conflicts_with = "url")]
    pub input: Option<String>,

    /// Input URL for text to be converted
    #[arg(short = 'u', value_name = "URL")]
    pub url: Option<String>,

    /// Use input text after this string
    #[arg(short = 'a', value_name = "TEXT")]
    pub text_after: Option<String>,

    /// Use input text before this string
    #[arg(short = 'b', value_name = "TEXT")]
    pub text_before: Option<String>,

    /// Follow links on the web page at URL to get the text
    #[arg(short = 'L')]
    pub follow_links: bool,

    /// Use linked page text after this string
    #[arg(short = 'A', value_name = "TEXT")]
    pub linked_text_after: Option<String>,

    /// Use linked page text before this string
    #[arg(short = 'B', value_name = "TEXT")]
    pub linked_text_before: Option<String>,

    /// Output file for converted text [default: stdout]
    #[arg(short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Send converted text to the Morse player
    #[arg(short = 'm', long = "mbeep")]
    pub send_to_player: bool,

    /// Remember the position in the input and resume from it
    #[arg(short = 'p')]
    pub save_position: bool,

    /// Save options for reuse under LABEL, then run
    #[arg(short = 's', value_name = "LABEL")]
    pub save_label: Option<String>,

    /// Load options previously saved under LABEL
    #[arg(short = 'r', value_name = "LABEL")]
    pub read_label: Option<String>,

    /// Number of words per row [default: 5, or 1 with -m]
    #[arg(short = 'c', value_name = "WORDS_PER_ROW")]
    pub words_per_row: Option<u32>,

    /// Number of words to emit
    #[arg(short = 'n', value_name = "NUMBER_OF_WORDS")]
    pub word_count: Option<u64>,

    /// Tone frequency in Hz
    #[arg(short = 'f', value_name = "HZ")]
    pub frequency: Option<f64>,

    /// Code speed in PARIS words per minute
    #[arg(
        short = 'w',
        long = "paris-wpm",
        value_name = "WPM",
        conflicts_with = "codex_wpm"
    )]
    pub paris_wpm: Option<f64>,

    /// Code speed in CODEX words per minute
    #[arg(long = "codex-wpm", value_name = "WPM")]
    pub codex_wpm: Option<f64>,

    /// Character speed for Farnsworth timing
    #[arg(short = 'x', long = "farnsworth", value_name = "WPM")]
    pub farnsworth_wpm: Option<f64>,

    /// Have the player print the effective FCC code test speed
    #[arg(long)]
    pub fcc: bool,

    /// Player program to send rows to
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_PLAYER)]
    pub player: String,

    /// Position and option store [default: $HOME/.morsefeed]
    #[arg(long, value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log debug detail
    #[arg(long)]
    pub verbose: bool,

    /// Show copyright and license
    #[arg(long)]
    pub license: bool,

    /// Print roff source for the man page
    #[arg(long)]
    pub man_page: bool,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::File(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn state_path(&self) -> Option<PathBuf> {
        self.state_file.clone().or_else(default_state_path)
    }

    /// Options given directly on the command line.
    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            input_file: self.input.clone(),
            url: self.url.clone(),
            words_per_row: self.words_per_row,
            word_count: self.word_count,
            send_to_player: self.send_to_player,
            save_position: self.save_position,
            follow_links: self.follow_links,
            text_after: self.text_after.clone(),
            text_before: self.text_before.clone(),
            linked_text_after: self.linked_text_after.clone(),
            linked_text_before: self.linked_text_before.clone(),
            frequency: self.frequency,
            paris_wpm: self.paris_wpm,
            codex_wpm: self.codex_wpm,
            farnsworth_wpm: self.farnsworth_wpm,
        }
    }

    /// Command-line options layered over those saved under `-r`, validated.
    pub fn resolve_options(&self, state_path: Option<&Path>) -> Result<FeedOptions, FeedError> {
        let mut options = self.feed_options();
        if let Some(label) = self.read_label.as_deref() {
            let store = PositionStore::new(require_state_path(state_path, "-r")?);
            options = store.load_options(label)?.overlay(options);
        }
        options.validate()?;
        if options.save_position {
            require_state_path(state_path, "-p")?;
        }
        Ok(options)
    }

    /// Resolves the options, saves them under `-s` when asked, and builds the
    /// run parameters.
    pub fn feed_params(&self) -> Result<FeedParams, FeedError> {
        let state_path = self.state_path();
        let options = self.resolve_options(state_path.as_deref())?;
        if let Some(label) = self.save_label.as_deref() {
            let store = PositionStore::new(require_state_path(state_path.as_deref(), "-s")?);
            store.save_options(label, &options)?;
        }
        Ok(FeedParams {
            options,
            output_path: self.output.clone(),
            state_path,
            print_fcc_wpm: self.fcc,
            player_program: self.player.clone(),
            playback: PlaybackSettings::default(),
        })
    }
}

fn require_state_path(path: Option<&Path>, flag: &str) -> Result<PathBuf, FeedError> {
    path.map(Path::to_path_buf).ok_or_else(|| {
        FeedError::InvalidValue(format!(
            "{flag} needs a state file: set HOME or pass --state-file"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use morsefeed_engine::ErrorKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("morsefeed").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_map_onto_options() {
        let cli = parse(&[
            "-u", "https://news.example/", "-L", "-A", "<p>", "-B", "</p>", "-m", "-c", "2",
            "-n", "40", "-f", "650", "--codex-wpm", "18", "-x", "12",
        ]);
        let options = cli.feed_options();
        assert_eq!(options.url.as_deref(), Some("https://news.example/"));
        assert!(options.follow_links && options.send_to_player);
        assert_eq!(options.linked_text_after.as_deref(), Some("<p>"));
        assert_eq!(options.linked_text_before.as_deref(), Some("</p>"));
        assert_eq!(options.words_per_row, Some(2));
        assert_eq!(options.word_count, Some(40));
        assert_eq!(options.frequency, Some(650.0));
        assert_eq!(options.codex_wpm, Some(18.0));
        assert_eq!(options.farnsworth_wpm, Some(12.0));
        assert_eq!(cli.player, DEFAULT_PLAYER);
    }

    #[test]
    fn paris_and_codex_speeds_conflict() {
        let args = ["morsefeed", "-w", "20", "--codex-wpm", "18"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn input_file_and_url_conflict() {
        let args = ["morsefeed", "-i", "a.txt", "-u", "https://x.example/"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = parse(&["-c", "101"]).resolve_options(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        let err = parse(&["-w", "99"]).resolve_options(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn position_tracking_needs_a_state_path() {
        let err = parse(&["-i", "a.txt", "-p"])
            .resolve_options(None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn saved_options_are_reloaded_and_overridden() {
        let temp = TempDir::new().unwrap();
        let state = temp.path().join("state");
        let state_arg = state.to_string_lossy().into_owned();

        let saving = parse(&[
            "--state-file", &state_arg, "-s", "drill", "-i", "book.txt", "-c", "3", "-w", "20",
        ]);
        let saved = saving.feed_params().unwrap();
        assert_eq!(saved.state_path.as_deref(), Some(state.as_path()));

        let reading = parse(&["--state-file", &state_arg, "-r", "drill", "-c", "4", "-m"]);
        let options = reading.resolve_options(Some(&state)).unwrap();
        assert_eq!(options.input_file.as_deref(), Some("book.txt"));
        assert_eq!(options.words_per_row, Some(4));
        assert_eq!(options.paris_wpm, Some(20.0));
        assert!(options.send_to_player);
    }

    #[test]
    fn unknown_label_is_an_error() {
        let temp = TempDir::new().unwrap();
        let state = temp.path().join("state");
        let err = parse(&["-r", "missing"])
            .resolve_options(Some(&state))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownLabel);
    }
}
