//! One complete run: open the source, select the span, stream tokens through
//! the transliterator into the row writer, then persist the resume position.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::ops::ControlFlow;
use std::path::PathBuf;

use feed_logging::{feed_debug, feed_info, feed_warn, set_page_index};
use morsefeed_core::{
    extract_links, ByteSpan, FeedOptions, LinkEntry, SourceBuffer, StopReason, TokenReader,
    Transliterator, Word,
};

use crate::playback::{Playback, PlayerCommand};
use crate::store::PositionStore;
use crate::terminal::{stdin_is_terminal, KeySource, TerminalGuard};
use crate::{signals, FeedError, FeedParams, PageLoader, RowSink, RowWriter, WriterSink};

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSummary {
    /// Words counted toward the word limit.
    pub words: u64,
    /// Why the run ended early, if it did.
    pub stop: Option<StopReason>,
    /// Documents streamed: the linked pages visited, or 1 for a single source.
    pub pages: usize,
    /// Offset written to the store; `Some(0)` means the record was removed.
    pub saved_offset: Option<u64>,
}

enum Body {
    Buffer {
        buffer: SourceBuffer,
        filter_html: bool,
        base_url: String,
    },
    Stream(Box<dyn BufRead>),
}

struct Input {
    body: Body,
    from_stdin: bool,
}

struct Tracking {
    store: PositionStore,
    key: String,
}

struct Session<'a> {
    params: &'a FeedParams,
    loader: &'a PageLoader,
    writer: RowWriter<Box<dyn RowSink>>,
    /// Best-known offset into the tracked document.
    resume_offset: usize,
    /// Reaching this offset means the document was read to the end.
    document_end: usize,
    pages: usize,
}

pub fn run_feed(params: &FeedParams, loader: &PageLoader) -> Result<FeedSummary, FeedError> {
    let options = &params.options;
    options.validate()?;
    let tracking = position_tracking(params)?;
    let saved = match &tracking {
        Some(tracking) => tracking.store.read_position(&tracking.key)?,
        None => 0,
    };
    let saved = usize::try_from(saved).unwrap_or(usize::MAX);

    if options.send_to_player && params.playback.install_signal_handlers {
        signals::install_teardown_handlers()?;
    }

    let input = open_input(options, loader)?;
    let sink = open_sink(params, input.from_stdin)?;
    let words_per_row = options.effective_words_per_row() as usize;
    let mut session = Session {
        params,
        loader,
        writer: RowWriter::new(sink, words_per_row, options.word_count),
        resume_offset: saved,
        document_end: usize::MAX,
        pages: 0,
    };

    let result = match input.body {
        Body::Buffer {
            buffer,
            filter_html,
            base_url,
        } => session.feed_document(&buffer, filter_html, &base_url, saved),
        Body::Stream(reader) => session.feed_stream(reader),
    };
    let result = result.and_then(|stop| {
        session.writer.finish(stop)?;
        Ok(stop)
    });
    let closed = session.writer.sink_mut().close();
    set_page_index(None);
    let result = result.and_then(|stop| closed.map(|()| stop));

    let saved_offset = match &tracking {
        Some(tracking) => session.persist_position(tracking, result.as_ref().err())?,
        None => None,
    };

    let stop = result?;
    if let Some(reason) = stop {
        feed_info!("stopped early: {reason:?}");
    }
    Ok(FeedSummary {
        words: session.writer.words_written(),
        stop,
        pages: session.pages,
        saved_offset,
    })
}

impl Session<'_> {
    fn feed_document(
        &mut self,
        buffer: &SourceBuffer,
        filter_html: bool,
        base_url: &str,
        saved: usize,
    ) -> Result<Option<StopReason>, FeedError> {
        let params = self.params;
        let options = &params.options;
        let bytes = buffer.as_bytes();
        let mut span = buffer.whole_span();
        if let Some(marker) = options.text_after.as_deref() {
            select_after(&mut span, bytes, marker);
        }
        span.apply_resume(saved);
        if let Some(marker) = options.text_before.as_deref() {
            select_before(&mut span, bytes, marker);
        }
        feed_debug!("reading bytes {}..{} of {}", span.start, span.end, bytes.len());
        self.resume_offset = span.start;
        self.document_end = span.end;

        if options.follow_links {
            let links = extract_links(base_url, bytes, span);
            feed_info!("found {} links", links.len());
            if !links.is_empty() {
                return self.follow_links(&links);
            }
        }

        self.pages = 1;
        let mut machine = Transliterator::new(filter_html);
        let flow = stream_tokens(
            span.slice(bytes),
            span.start,
            &mut machine,
            &mut self.writer,
            &mut self.resume_offset,
        )?;
        Ok(match flow {
            ControlFlow::Continue(()) => {
                self.resume_offset = self.document_end;
                None
            }
            ControlFlow::Break(reason) => Some(reason),
        })
    }

    fn follow_links(&mut self, links: &[LinkEntry]) -> Result<Option<StopReason>, FeedError> {
        let params = self.params;
        let options = &params.options;
        for (index, link) in links.iter().enumerate() {
            self.resume_offset = link.anchor_offset;
            set_page_index(Some(index));
            if options.send_to_player {
                eprintln!("{index}) {}", link.title);
            }
            feed_info!("page {index}: {}", link.url);

            let page = self.loader.load(&link.url)?;
            self.pages += 1;

            if index > 0 {
                loop {
                    match self.writer.emit(&Word::PageBreak)? {
                        ControlFlow::Continue(()) => break,
                        // The page it was aimed at has already ended.
                        ControlFlow::Break(StopReason::NextPage) => {
                            feed_debug!("skip key at page separator ignored");
                        }
                        ControlFlow::Break(reason) => return Ok(Some(reason)),
                    }
                }
            }

            let bytes = page.body.as_bytes();
            let mut span = ByteSpan::whole(bytes);
            if let Some(marker) = options.linked_text_after.as_deref() {
                select_after(&mut span, bytes, marker);
            }
            if let Some(marker) = options.linked_text_before.as_deref() {
                select_before(&mut span, bytes, marker);
            }

            let mut machine = Transliterator::new(true);
            let mut page_offset = span.start;
            match stream_tokens(
                span.slice(bytes),
                span.start,
                &mut machine,
                &mut self.writer,
                &mut page_offset,
            )? {
                ControlFlow::Continue(()) | ControlFlow::Break(StopReason::NextPage) => {}
                ControlFlow::Break(reason) => return Ok(Some(reason)),
            }
        }
        self.resume_offset = self.document_end;
        Ok(None)
    }

    fn feed_stream(&mut self, reader: Box<dyn BufRead>) -> Result<Option<StopReason>, FeedError> {
        self.pages = 1;
        let mut machine = Transliterator::new(false);
        let mut offset = 0;
        let flow = stream_tokens(reader, 0, &mut machine, &mut self.writer, &mut offset)?;
        Ok(match flow {
            ControlFlow::Continue(()) => None,
            ControlFlow::Break(reason) => Some(reason),
        })
    }

    /// Saves the best-known offset, or clears it once the document is done.
    /// When the run already failed, a failing save is only logged.
    fn persist_position(
        &self,
        tracking: &Tracking,
        failure: Option<&FeedError>,
    ) -> Result<Option<u64>, FeedError> {
        let offset = if self.resume_offset >= self.document_end {
            0
        } else {
            self.resume_offset as u64
        };
        match tracking.store.write_position(&tracking.key, offset) {
            Ok(()) => Ok(Some(offset)),
            Err(err) => match failure {
                Some(failure) => {
                    feed_warn!("could not save position after {failure}: {err}");
                    Ok(None)
                }
                None => Err(err),
            },
        }
    }
}

/// Feeds every token of `reader` through `machine` into `writer`.
///
/// `offset` tracks where a later session should resume: just past the last
/// token whose words were all written.
fn stream_tokens<R: BufRead, S: RowSink>(
    reader: R,
    base_offset: usize,
    machine: &mut Transliterator,
    writer: &mut RowWriter<S>,
    offset: &mut usize,
) -> Result<ControlFlow<StopReason>, FeedError> {
    let mut tokens = TokenReader::new(reader, base_offset);
    let mut words = Vec::new();
    while let Some(token) = tokens.next_token()? {
        words.clear();
        machine.transliterate(&token.bytes, &mut words)?;
        for (index, word) in words.iter().enumerate() {
            if let ControlFlow::Break(reason) = writer.emit(word)? {
                if reason == StopReason::WordLimit && index + 1 == words.len() {
                    *offset = token.resume_at;
                }
                return Ok(ControlFlow::Break(reason));
            }
        }
        *offset = token.resume_at;
    }
    Ok(ControlFlow::Continue(()))
}

fn select_after(span: &mut ByteSpan, bytes: &[u8], marker: &str) {
    if !span.select_after(bytes, marker.as_bytes()) {
        feed_warn!("start marker {marker:?} not found; reading from the beginning");
    }
}

fn select_before(span: &mut ByteSpan, bytes: &[u8], marker: &str) {
    if !span.select_before(bytes, marker.as_bytes()) {
        feed_warn!("end marker {marker:?} not found; reading to the end");
    }
}

fn position_tracking(params: &FeedParams) -> Result<Option<Tracking>, FeedError> {
    if !params.options.save_position {
        return Ok(None);
    }
    let path = params.state_path.clone().ok_or_else(|| {
        FeedError::InvalidValue("saving the position needs a state file path".to_string())
    })?;
    let key = params.source_key().ok_or_else(|| {
        FeedError::InvalidValue("saving the position needs an input file or URL".to_string())
    })?;
    Ok(Some(Tracking {
        store: PositionStore::new(path),
        key: key.to_string(),
    }))
}

fn open_input(options: &FeedOptions, loader: &PageLoader) -> Result<Input, FeedError> {
    if let Some(url) = options.url.as_deref() {
        let page = loader.load(url)?;
        return Ok(Input {
            body: Body::Buffer {
                buffer: page.body,
                filter_html: true,
                base_url: page.metadata.final_url,
            },
            from_stdin: false,
        });
    }

    let materialize = options.needs_materialized_source();
    let from_stdin = options.input_file.is_none();
    let reader: Box<dyn BufRead> = match options.input_file.as_deref() {
        Some(path) => {
            let file = File::open(path).map_err(|source| FeedError::Open {
                path: PathBuf::from(path),
                source,
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let body = if materialize {
        let mut buffer = SourceBuffer::new();
        let read = buffer.read_from(reader)?;
        feed_debug!("read {read} bytes of input");
        Body::Buffer {
            buffer,
            filter_html: false,
            base_url: String::new(),
        }
    } else {
        Body::Stream(reader)
    };
    Ok(Input { body, from_stdin })
}

fn open_sink(params: &FeedParams, from_stdin: bool) -> Result<Box<dyn RowSink>, FeedError> {
    let options = &params.options;
    if options.send_to_player {
        let command =
            PlayerCommand::from_options(params.player_program.clone(), options, params.print_fcc_wpm);
        let keys: Option<Box<dyn KeySource>> =
            if params.playback.key_control && !from_stdin && stdin_is_terminal() {
                Some(Box::new(TerminalGuard::acquire()?))
            } else {
                None
            };
        let playback = Playback::spawn(&command, keys, params.playback.clone())?;
        return Ok(Box::new(playback));
    }

    match &params.output_path {
        Some(path) => {
            let file = File::create(path).map_err(|source| FeedError::Open {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(WriterSink::new(BufWriter::new(file))))
        }
        None => Ok(Box::new(WriterSink::new(io::stdout()))),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::sync::Arc;

    use morsefeed_core::FeedOptions;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher};

    struct Pages(HashMap<&'static str, &'static str>);

    #[async_trait::async_trait]
    impl Fetcher for Pages {
        async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
            let body = self
                .0
                .get(url)
                .ok_or_else(|| FetchError::new(FailureKind::HttpStatus(404), "404 Not Found"))?;
            Ok(FetchOutput {
                body: SourceBuffer::from_vec(body.as_bytes().to_vec()),
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

    /// Records rows and answers `NextPage` on chosen polls (1-based).
    struct KeyedSink {
        out: Rc<RefCell<String>>,
        polls: usize,
        skip_on: Vec<usize>,
    }

    impl RowSink for KeyedSink {
        fn write_text(&mut self, text: &str) -> Result<(), FeedError> {
            self.out.borrow_mut().push_str(text);
            Ok(())
        }

        fn end_row(&mut self) -> Result<(), FeedError> {
            self.out.borrow_mut().push('\n');
            Ok(())
        }

        fn poll_control(&mut self) -> Result<ControlFlow<StopReason>, FeedError> {
            self.polls += 1;
            if self.skip_on.contains(&self.polls) {
                Ok(ControlFlow::Break(StopReason::NextPage))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        }

        fn close(&mut self) -> Result<(), FeedError> {
            Ok(())
        }
    }

    fn two_pages() -> (PageLoader, Vec<LinkEntry>) {
        let pages = HashMap::from([
            ("http://feed.test/one", "alpha beta"),
            ("http://feed.test/two", "gamma delta"),
        ]);
        let loader = PageLoader::new(Arc::new(Pages(pages))).unwrap();
        let links = ["one", "two"]
            .iter()
            .enumerate()
            .map(|(index, name)| LinkEntry {
                url: format!("http://feed.test/{name}"),
                title: name.to_string(),
                anchor_offset: index * 10,
            })
            .collect();
        (loader, links)
    }

    fn follow_with_skips(skip_on: Vec<usize>) -> (Option<StopReason>, String, usize) {
        feed_logging::initialize_for_tests();
        let (loader, links) = two_pages();
        let params = FeedParams::new(FeedOptions {
            follow_links: true,
            ..FeedOptions::default()
        });
        let out = Rc::new(RefCell::new(String::new()));
        let sink: Box<dyn RowSink> = Box::new(KeyedSink {
            out: Rc::clone(&out),
            polls: 0,
            skip_on,
        });
        let mut session = Session {
            params: &params,
            loader: &loader,
            writer: RowWriter::new(sink, 1, None),
            resume_offset: 0,
            document_end: 100,
            pages: 0,
        };
        let stop = session.follow_links(&links).unwrap();
        let text = out.borrow().clone();
        (stop, text, session.pages)
    }

    #[test]
    fn skip_key_inside_a_page_moves_to_the_next_page() {
        let (stop, text, pages) = follow_with_skips(vec![2]);
        assert_eq!(stop, None);
        assert_eq!(text, "ALPHA\n=\nGAMMA\nDELTA\n");
        assert_eq!(pages, 2);
    }

    #[test]
    fn skip_key_read_at_the_separator_still_plays_the_next_page() {
        let (stop, text, pages) = follow_with_skips(vec![3]);
        assert_eq!(stop, None);
        assert_eq!(text, "ALPHA\nBETA\n=\nGAMMA\nDELTA\n");
        assert_eq!(pages, 2);
    }
}
