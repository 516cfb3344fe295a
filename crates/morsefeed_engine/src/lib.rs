//! Morsefeed engine: fetching, the position store, row sinks, the player
//! process and the run pipeline that ties them together.
mod error;
mod fetch;
mod loader;
mod params;
mod persist;
mod pipeline;
mod playback;
mod row_writer;
mod signals;
mod sink;
mod store;
mod terminal;
mod types;

pub use error::{ErrorKind, FeedError};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use loader::PageLoader;
pub use params::FeedParams;
pub use persist::{AtomicFileWriter, PersistError};
pub use pipeline::{run_feed, FeedSummary};
pub use playback::{Playback, PlaybackSettings, PlayerCommand, DEFAULT_PLAYER};
pub use row_writer::RowWriter;
pub use signals::install_teardown_handlers;
pub use sink::{RowSink, WriterSink};
pub use store::{default_state_path, PositionStore, STATE_FILE_NAME};
pub use terminal::{restore_saved_terminal, stdin_is_terminal, KeySource, TerminalGuard};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
