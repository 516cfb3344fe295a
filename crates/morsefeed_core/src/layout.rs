use crate::Word;

/// Where a word lands within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// A single space goes before the word.
    pub leading_space: bool,
    /// The word completes its row; a newline follows.
    pub ends_row: bool,
}

/// Assigns every emitted word, counted or not, to a fixed-width row.
#[derive(Debug, Clone)]
pub struct RowLayout {
    words_per_row: usize,
    slot: usize,
}

impl RowLayout {
    pub fn new(words_per_row: usize) -> Self {
        Self {
            words_per_row: words_per_row.max(1),
            slot: 0,
        }
    }

    pub fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    pub fn place(&mut self) -> Placement {
        let placement = Placement {
            leading_space: self.slot != 0,
            ends_row: self.slot == self.words_per_row - 1,
        };
        self.slot = if placement.ends_row { 0 } else { self.slot + 1 };
        placement
    }

    /// True when some words have been placed on a row that is not yet closed.
    pub fn row_in_progress(&self) -> bool {
        self.slot != 0
    }

    /// Closes the current row without placing a word.
    pub fn close_row(&mut self) {
        self.slot = 0;
    }
}

/// Counts content words against an optional limit.
#[derive(Debug, Clone, Default)]
pub struct WordBudget {
    limit: Option<u64>,
    counted: u64,
}

impl WordBudget {
    pub fn new(limit: Option<u64>) -> Self {
        Self { limit, counted: 0 }
    }

    /// Records an emitted word and reports whether the limit is now reached.
    pub fn record(&mut self, word: &Word) -> bool {
        if word.is_counted() {
            self.counted += 1;
        }
        self.is_exhausted()
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.counted >= limit)
    }

    pub fn counted(&self) -> u64 {
        self.counted
    }
}
