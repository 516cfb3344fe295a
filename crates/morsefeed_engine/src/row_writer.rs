use std::ops::ControlFlow;

use feed_logging::feed_debug;
use morsefeed_core::{RowLayout, StopReason, Word, WordBudget};

use crate::{FeedError, RowSink};

/// Lays words out in rows on a [`RowSink`] and enforces the word limit.
pub struct RowWriter<S> {
    sink: S,
    layout: RowLayout,
    budget: WordBudget,
}

impl<S: RowSink> RowWriter<S> {
    pub fn new(sink: S, words_per_row: usize, word_limit: Option<u64>) -> Self {
        Self {
            sink,
            layout: RowLayout::new(words_per_row),
            budget: WordBudget::new(word_limit),
        }
    }

    /// Writes one word. A `Break` means the word may not have been written:
    /// `Quit` and `NextPage` stop before it, `WordLimit` right after it.
    pub fn emit(&mut self, word: &Word) -> Result<ControlFlow<StopReason>, FeedError> {
        if let ControlFlow::Break(reason) = self.sink.poll_control()? {
            return Ok(ControlFlow::Break(reason));
        }

        let placement = self.layout.place();
        if placement.leading_space {
            self.sink.write_text(" ")?;
        }
        self.sink.write_text(word.as_str())?;
        if placement.ends_row {
            self.sink.end_row()?;
        }

        if self.budget.record(word) {
            feed_debug!("word limit reached after {} words", self.budget.counted());
            return Ok(ControlFlow::Break(StopReason::WordLimit));
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Terminates a pending partial row.
    pub fn finish(&mut self, stop: Option<StopReason>) -> Result<(), FeedError> {
        if !self.layout.row_in_progress() {
            return Ok(());
        }
        self.layout.close_row();
        if stop == Some(StopReason::Quit) {
            self.sink.abandon_row()
        } else {
            self.sink.end_row()
        }
    }

    pub fn words_written(&self) -> u64 {
        self.budget.counted()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
