//! Morsefeed core: character tables, the tokenizer state machine, row layout,
//! spans, link extraction and the store record codec. Performs no IO of its own
//! beyond reading from a caller-supplied `BufRead`.
mod charmap;
mod flow;
mod layout;
mod links;
mod options;
mod record;
mod span;
mod tokens;
mod transliterate;
mod word;

pub use charmap::{
    classify_ascii, classify_code_point, classify_latin1, entity_name, is_space, CharClass,
};
pub use flow::StopReason;
pub use layout::{Placement, RowLayout, WordBudget};
pub use links::{extract_links, resolve_link, LinkEntry, TITLE_CAPACITY, URL_CAPACITY};
pub use options::{FeedOptions, OptionError, STATE_FIELDS, STATE_TAG};
pub use record::{
    escape_field, unescape_field, RecordError, RecordTable, POSITION_FIELDS, POSITION_TAG,
};
pub use span::{find_marker, BufferError, ByteSpan, SourceBuffer, FIRST_BUFFER_CAPACITY};
pub use tokens::{Token, TokenReader, MAX_TOKEN_LEN};
pub use transliterate::{TokenizeError, Transliterator, WORD_CAPACITY};
pub use word::Word;
