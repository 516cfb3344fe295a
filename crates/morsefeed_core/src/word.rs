use std::fmt;

/// One unit of output queued for display or playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Word {
    /// Normalized characters: digits, upper-cased letters, `. , ? /` and
    /// Latin-1 transliterations.
    Plain(String),
    /// Spelled-out punctuation, entity or symbol.
    Named(&'static str),
    /// Stands in for a stripped HTML tag other than `</li>`.
    TagFiller,
    /// Marks the end of an HTML list item.
    ListItem,
    /// Separates consecutive linked pages.
    PageBreak,
}

impl Word {
    pub fn as_str(&self) -> &str {
        match self {
            Word::Plain(text) => text,
            Word::Named(name) => name,
            Word::TagFiller => " ",
            Word::ListItem => "|",
            Word::PageBreak => "=",
        }
    }

    /// Whether the word counts toward a configured word limit.
    /// Formatting words still occupy a row slot.
    pub fn is_counted(&self) -> bool {
        match self {
            Word::Plain(text) => !text.trim().is_empty(),
            Word::Named(name) => !name.trim().is_empty(),
            Word::TagFiller | Word::ListItem | Word::PageBreak => false,
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
