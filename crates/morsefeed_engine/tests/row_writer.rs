use std::collections::VecDeque;
use std::ops::ControlFlow;

use morsefeed_core::{StopReason, Word};
use morsefeed_engine::{FeedError, RowSink, RowWriter, WriterSink};
use pretty_assertions::assert_eq;

fn plain(text: &str) -> Word {
    Word::Plain(text.to_string())
}

fn output(writer: RowWriter<WriterSink<Vec<u8>>>) -> String {
    String::from_utf8(writer.into_sink().into_inner()).unwrap()
}

/// Records sink calls and replays scripted control decisions.
#[derive(Default)]
struct ScriptedSink {
    log: Vec<String>,
    controls: VecDeque<ControlFlow<StopReason>>,
}

impl RowSink for ScriptedSink {
    fn write_text(&mut self, text: &str) -> Result<(), FeedError> {
        self.log.push(format!("text {text:?}"));
        Ok(())
    }

    fn end_row(&mut self) -> Result<(), FeedError> {
        self.log.push("end".to_string());
        Ok(())
    }

    fn poll_control(&mut self) -> Result<ControlFlow<StopReason>, FeedError> {
        Ok(self.controls.pop_front().unwrap_or(ControlFlow::Continue(())))
    }

    fn abandon_row(&mut self) -> Result<(), FeedError> {
        self.log.push("abandon".to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<(), FeedError> {
        self.log.push("close".to_string());
        Ok(())
    }
}

#[test]
fn rows_wrap_and_partial_row_is_terminated() {
    let mut writer = RowWriter::new(WriterSink::new(Vec::new()), 3, None);
    for text in ["A", "B", "C", "D", "E", "F", "G"] {
        assert_eq!(writer.emit(&plain(text)).unwrap(), ControlFlow::Continue(()));
    }
    writer.finish(None).unwrap();
    assert_eq!(writer.words_written(), 7);
    assert_eq!(output(writer), "A B C\nD E F\nG\n");
}

#[test]
fn full_last_row_gets_no_extra_newline() {
    let mut writer = RowWriter::new(WriterSink::new(Vec::new()), 2, None);
    for text in ["CQ", "DE"] {
        writer.emit(&plain(text)).unwrap();
    }
    writer.finish(None).unwrap();
    assert_eq!(output(writer), "CQ DE\n");
}

#[test]
fn word_limit_stops_right_after_the_last_counted_word() {
    let mut writer = RowWriter::new(WriterSink::new(Vec::new()), 5, Some(2));
    assert_eq!(writer.emit(&plain("ONE")).unwrap(), ControlFlow::Continue(()));
    assert_eq!(writer.emit(&Word::TagFiller).unwrap(), ControlFlow::Continue(()));
    assert_eq!(
        writer.emit(&plain("TWO")).unwrap(),
        ControlFlow::Break(StopReason::WordLimit)
    );
    writer.finish(Some(StopReason::WordLimit)).unwrap();
    assert_eq!(writer.words_written(), 2);
    assert_eq!(output(writer), "ONE   TWO\n");
}

#[test]
fn quit_stops_before_the_word_and_abandons_the_row() {
    let sink = ScriptedSink {
        controls: VecDeque::from([
            ControlFlow::Continue(()),
            ControlFlow::Break(StopReason::Quit),
        ]),
        ..ScriptedSink::default()
    };
    let mut writer = RowWriter::new(sink, 3, None);
    assert_eq!(writer.emit(&plain("HI")).unwrap(), ControlFlow::Continue(()));
    assert_eq!(
        writer.emit(&plain("THERE")).unwrap(),
        ControlFlow::Break(StopReason::Quit)
    );
    writer.finish(Some(StopReason::Quit)).unwrap();
    writer.sink_mut().close().unwrap();

    assert_eq!(writer.words_written(), 1);
    assert_eq!(
        writer.into_sink().log,
        vec!["text \"HI\"", "abandon", "close"]
    );
}

#[test]
fn next_page_request_leaves_the_row_open_for_the_next_page() {
    let sink = ScriptedSink {
        controls: VecDeque::from([ControlFlow::Break(StopReason::NextPage)]),
        ..ScriptedSink::default()
    };
    let mut writer = RowWriter::new(sink, 2, None);
    assert_eq!(
        writer.emit(&plain("SKIPPED")).unwrap(),
        ControlFlow::Break(StopReason::NextPage)
    );
    assert_eq!(writer.emit(&Word::PageBreak).unwrap(), ControlFlow::Continue(()));
    assert_eq!(writer.emit(&plain("NEXT")).unwrap(), ControlFlow::Continue(()));
    writer.finish(None).unwrap();

    assert_eq!(
        writer.into_sink().log,
        vec!["text \"=\"", "text \" \"", "text \"NEXT\"", "end"]
    );
}

#[test]
fn finish_without_pending_row_does_nothing() {
    let mut writer = RowWriter::new(ScriptedSink::default(), 1, None);
    writer.emit(&plain("K")).unwrap();
    writer.finish(Some(StopReason::Quit)).unwrap();
    assert_eq!(writer.into_sink().log, vec!["text \"K\"", "end"]);
}
