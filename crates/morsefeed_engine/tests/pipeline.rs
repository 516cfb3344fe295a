use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use morsefeed_core::{FeedOptions, SourceBuffer, StopReason};
use morsefeed_engine::{
    run_feed, ErrorKind, FailureKind, FeedError, FeedParams, FeedSummary, FetchError,
    FetchMetadata, FetchOutput, Fetcher, PageLoader, PlaybackSettings, PositionStore,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const INDEX_URL: &str = "http://index.test/list/";
const INDEX_PAGE: &str = r#"Links: <a href="one">First</a> <a href="/two">Second</a>"#;

/// Serves canned pages without touching the network.
struct StubFetcher {
    pages: HashMap<String, String>,
}

impl StubFetcher {
    fn loader(pages: &[(&str, &str)]) -> PageLoader {
        let pages = pages
            .iter()
            .map(|(url, body)| (url.to_string(), body.to_string()))
            .collect();
        PageLoader::new(Arc::new(StubFetcher { pages })).unwrap()
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let body = self
            .pages
            .get(url)
            .ok_or_else(|| FetchError::new(FailureKind::HttpStatus(404), "404 Not Found"))?;
        Ok(FetchOutput {
            body: SourceBuffer::from_vec(body.clone().into_bytes()),
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: Some("text/html".to_string()),
                byte_len: body.len() as u64,
            },
        })
    }
}

fn news_loader() -> PageLoader {
    StubFetcher::loader(&[
        (INDEX_URL, INDEX_PAGE),
        (
            "http://index.test/list/one",
            "<nav>menu</nav><article>alpha beta</article>",
        ),
        ("http://index.test/two", "<article>gamma</article><p>footer</p>"),
    ])
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        feed_logging::initialize_for_tests();
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn input(&self, text: &str) -> String {
        let path = self.dir.path().join("input.txt");
        fs::write(&path, text).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn output_path(&self) -> PathBuf {
        self.dir.path().join("out.txt")
    }

    fn state_path(&self) -> PathBuf {
        self.dir.path().join(".morsefeed")
    }

    fn params(&self, options: FeedOptions) -> FeedParams {
        let mut params = FeedParams::new(options);
        params.output_path = Some(self.output_path());
        params.state_path = Some(self.state_path());
        params.playback = PlaybackSettings {
            pause_poll_interval: Duration::ZERO,
            pause_debounce: Duration::ZERO,
            key_control: false,
            install_signal_handlers: false,
        };
        params
    }

    fn output(&self) -> String {
        fs::read_to_string(self.output_path()).unwrap()
    }
}

#[test]
fn file_input_is_written_in_rows() {
    let ws = Workspace::new();
    let options = FeedOptions {
        input_file: Some(ws.input("cq cq de k1abc k1abc\nde w2xyz k\n")),
        words_per_row: Some(3),
        ..FeedOptions::default()
    };
    let summary = run_feed(&ws.params(options), &StubFetcher::loader(&[])).unwrap();

    assert_eq!(ws.output(), "CQ CQ DE\nK1ABC K1ABC DE\nW2XYZ K\n");
    assert_eq!(
        summary,
        FeedSummary {
            words: 8,
            stop: None,
            pages: 1,
            saved_offset: None,
        }
    );
}

#[test]
fn word_count_ends_the_run_early() {
    let ws = Workspace::new();
    let options = FeedOptions {
        input_file: Some(ws.input("one two three four")),
        word_count: Some(3),
        ..FeedOptions::default()
    };
    let summary = run_feed(&ws.params(options), &StubFetcher::loader(&[])).unwrap();
    assert_eq!(ws.output(), "ONE TWO THREE\n");
    assert_eq!(summary.stop, Some(StopReason::WordLimit));
    assert_eq!(summary.words, 3);
}

#[test]
fn markers_restrict_the_text_that_is_read() {
    let ws = Workspace::new();
    let options = FeedOptions {
        input_file: Some(ws.input("header START cq de k1abc END footer")),
        text_after: Some("START".to_string()),
        text_before: Some("END".to_string()),
        ..FeedOptions::default()
    };
    run_feed(&ws.params(options), &StubFetcher::loader(&[])).unwrap();
    assert_eq!(ws.output(), "CQ DE K1ABC\n");
}

#[test]
fn missing_marker_reads_everything() {
    let ws = Workspace::new();
    let options = FeedOptions {
        input_file: Some(ws.input("all of it")),
        text_after: Some("NOWHERE".to_string()),
        ..FeedOptions::default()
    };
    run_feed(&ws.params(options), &StubFetcher::loader(&[])).unwrap();
    assert_eq!(ws.output(), "ALL OF IT\n");
}

#[test]
fn saved_position_resumes_and_clears_at_the_end() {
    let ws = Workspace::new();
    let input = ws.input("alpha beta gamma delta");
    let options = FeedOptions {
        input_file: Some(input.clone()),
        word_count: Some(2),
        save_position: true,
        ..FeedOptions::default()
    };
    let params = ws.params(options);
    let store = PositionStore::new(ws.state_path());

    let first = run_feed(&params, &StubFetcher::loader(&[])).unwrap();
    assert_eq!(ws.output(), "ALPHA BETA\n");
    assert_eq!(first.saved_offset, Some(11));
    assert_eq!(store.read_position(&input).unwrap(), 11);

    let second = run_feed(&params, &StubFetcher::loader(&[])).unwrap();
    assert_eq!(ws.output(), "GAMMA DELTA\n");
    assert_eq!(second.saved_offset, Some(0));
    assert_eq!(store.read_position(&input).unwrap(), 0);
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn position_needs_a_named_source() {
    let ws = Workspace::new();
    let options = FeedOptions {
        save_position: true,
        ..FeedOptions::default()
    };
    let err = run_feed(&ws.params(options), &StubFetcher::loader(&[])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn invalid_options_are_rejected_before_any_io() {
    let ws = Workspace::new();
    let options = FeedOptions {
        input_file: Some("/nonexistent/input".to_string()),
        words_per_row: Some(0),
        ..FeedOptions::default()
    };
    let err = run_feed(&ws.params(options), &StubFetcher::loader(&[])).unwrap_err();
    assert!(matches!(err, FeedError::InvalidOption(_)));
    assert!(!ws.output_path().exists());
}

#[test]
fn missing_input_file_is_an_io_error() {
    let ws = Workspace::new();
    let options = FeedOptions {
        input_file: Some(
            ws.dir
                .path()
                .join("missing.txt")
                .to_string_lossy()
                .into_owned(),
        ),
        ..FeedOptions::default()
    };
    let err = run_feed(&ws.params(options), &StubFetcher::loader(&[])).unwrap_err();
    assert!(matches!(err, FeedError::Open { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn url_input_is_filtered_as_html() {
    let ws = Workspace::new();
    let loader = StubFetcher::loader(&[("http://page.test/", "<b>hi</b> there &amp; back")]);
    let options = FeedOptions {
        url: Some("http://page.test/".to_string()),
        words_per_row: Some(10),
        ..FeedOptions::default()
    };
    run_feed(&ws.params(options), &loader).unwrap();
    assert_eq!(ws.output(), "  HI   THERE andsign BACK\n");
}

#[test]
fn fetch_failure_is_reported() {
    let ws = Workspace::new();
    let options = FeedOptions {
        url: Some("http://missing.test/".to_string()),
        ..FeedOptions::default()
    };
    let err = run_feed(&ws.params(options), &StubFetcher::loader(&[])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

#[test]
fn linked_pages_are_read_in_order_with_separators() {
    let ws = Workspace::new();
    let options = FeedOptions {
        url: Some(INDEX_URL.to_string()),
        follow_links: true,
        linked_text_after: Some("<article>".to_string()),
        linked_text_before: Some("</article>".to_string()),
        ..FeedOptions::default()
    };
    let summary = run_feed(&ws.params(options), &news_loader()).unwrap();
    assert_eq!(ws.output(), "ALPHA BETA = GAMMA\n");
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.words, 3);
}

#[test]
fn link_position_is_saved_when_a_linked_page_is_cut_short() {
    let ws = Workspace::new();
    let store = PositionStore::new(ws.state_path());
    let options = FeedOptions {
        url: Some(INDEX_URL.to_string()),
        follow_links: true,
        save_position: true,
        word_count: Some(1),
        linked_text_after: Some("<article>".to_string()),
        ..FeedOptions::default()
    };
    let summary = run_feed(&ws.params(options.clone()), &news_loader()).unwrap();
    assert_eq!(ws.output(), "ALPHA\n");
    assert_eq!(summary.saved_offset, Some(7));
    assert_eq!(store.read_position(INDEX_URL).unwrap(), 7);

    let finish = FeedOptions {
        word_count: None,
        linked_text_before: Some("</article>".to_string()),
        ..options
    };
    let summary = run_feed(&ws.params(finish), &news_loader()).unwrap();
    assert_eq!(ws.output(), "ALPHA BETA = GAMMA\n");
    assert_eq!(summary.saved_offset, Some(0));
    assert_eq!(store.read_position(INDEX_URL).unwrap(), 0);
}

#[test]
fn failing_linked_page_keeps_the_position_of_its_anchor() {
    let ws = Workspace::new();
    let loader = StubFetcher::loader(&[
        (INDEX_URL, INDEX_PAGE),
        ("http://index.test/list/one", "alpha"),
    ]);
    let options = FeedOptions {
        url: Some(INDEX_URL.to_string()),
        follow_links: true,
        save_position: true,
        ..FeedOptions::default()
    };
    let err = run_feed(&ws.params(options), &loader).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert_eq!(
        PositionStore::new(ws.state_path())
            .read_position(INDEX_URL)
            .unwrap(),
        31
    );
}

#[test]
fn index_without_links_is_read_as_text() {
    let ws = Workspace::new();
    let loader = StubFetcher::loader(&[("http://plain.test/", "no links here")]);
    let options = FeedOptions {
        url: Some("http://plain.test/".to_string()),
        follow_links: true,
        ..FeedOptions::default()
    };
    run_feed(&ws.params(options), &loader).unwrap();
    assert_eq!(ws.output(), "NO LINKS HERE\n");
}

fn acking_player(dir: &Path) -> PathBuf {
    let script = dir.join("player.sh");
    fs::write(
        &script,
        "#!/bin/sh\nwhile IFS= read -r line; do\n  printf '%s\\n' \"$line\" >> \"$0.log\"\n  echo ok\ndone\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[test]
fn player_mode_sends_one_word_per_row() {
    let ws = Workspace::new();
    let script = acking_player(ws.dir.path());
    let options = FeedOptions {
        input_file: Some(ws.input("cq de k1abc")),
        send_to_player: true,
        ..FeedOptions::default()
    };
    let mut params = ws.params(options);
    params.player_program = script.to_string_lossy().into_owned();

    let summary = run_feed(&params, &StubFetcher::loader(&[])).unwrap();
    assert_eq!(summary.words, 3);
    assert_eq!(
        fs::read_to_string(ws.dir.path().join("player.sh.log")).unwrap(),
        "CQ\nDE\nK1ABC\n"
    );
    assert!(!ws.output_path().exists());
}
