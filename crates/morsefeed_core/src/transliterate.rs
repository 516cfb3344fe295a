//! Character-level state machine turning raw tokens into output words.
//!
//! Tag and entity state persists across tokens of one document, so a tag
//! split by whitespace (`<a href="x">`) is still stripped as a whole.

use thiserror::Error;

use crate::charmap::{
    classify_ascii, classify_code_point, classify_latin1, entity_name, CharClass,
};
use crate::Word;

/// Longest plain word emitted before it is split.
pub const WORD_CAPACITY: usize = 1023;
const TAG_CAPACITY: usize = 7;
const ENTITY_CAPACITY: usize = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("internal invariant violated: stalled at byte {index} of a {len} byte token")]
    InternalInvariantViolation { index: usize, len: usize },
}

#[derive(Debug, Clone, Default)]
pub struct Transliterator {
    filter_html: bool,
    excluding_tag: bool,
    tag: Vec<u8>,
    /// Non-empty while inside an entity.
    entity: Vec<u8>,
}

impl Transliterator {
    pub fn new(filter_html: bool) -> Self {
        Self {
            filter_html,
            ..Self::default()
        }
    }

    pub fn filters_html(&self) -> bool {
        self.filter_html
    }

    /// Forgets any half-read tag or entity. Called between documents.
    pub fn reset(&mut self) {
        self.excluding_tag = false;
        self.tag.clear();
        self.entity.clear();
    }

    /// Expands one whitespace-free token into words appended to `out`.
    pub fn transliterate(&mut self, token: &[u8], out: &mut Vec<Word>) -> Result<(), TokenizeError> {
        let mut word = String::new();
        let mut index = 0;
        while index < token.len() {
            let consumed = self.step(&token[index..], &mut word, out);
            if consumed == 0 {
                return Err(TokenizeError::InternalInvariantViolation {
                    index,
                    len: token.len(),
                });
            }
            index += consumed;
        }
        flush(&mut word, out);
        Ok(())
    }

    /// Consumes the leading character of `rest` and returns its byte length.
    fn step(&mut self, rest: &[u8], word: &mut String, out: &mut Vec<Word>) -> usize {
        let Some(&c) = rest.first() else {
            return 0;
        };

        if self.filter_html && c == b'<' {
            self.excluding_tag = true;
            push_bounded(&mut self.tag, c, TAG_CAPACITY);
            return 1;
        }

        if self.excluding_tag {
            push_bounded(&mut self.tag, c, TAG_CAPACITY);
            if c == b'>' {
                self.excluding_tag = false;
                let filler = if self.tag == b"</li>" {
                    Word::ListItem
                } else {
                    Word::TagFiller
                };
                self.tag.clear();
                emit(word, filler, out);
            }
            return 1;
        }

        if self.filter_html && c == b'&' {
            self.entity.clear();
            self.entity.push(c);
            return 1;
        }

        if self.filter_html && !self.entity.is_empty() {
            push_bounded(&mut self.entity, c, ENTITY_CAPACITY);
            if c == b';' {
                if let Some(name) = entity_name(&self.entity, word.is_empty()) {
                    emit(word, Word::Named(name), out);
                }
                self.entity.clear();
            }
            return 1;
        }

        if c.is_ascii() {
            apply(classify_ascii(c, word.is_empty()), word, out);
            return 1;
        }

        let (class, consumed) = decode_non_ascii(rest);
        apply(class, word, out);
        consumed
    }
}

/// Decodes a UTF-8 sequence, falling back to reading the lead byte as Latin-1.
fn decode_non_ascii(rest: &[u8]) -> (CharClass, usize) {
    let lead = rest[0];
    let len = match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return (classify_latin1(lead), 1),
    };
    let well_formed = rest.len() >= len && rest[1..len].iter().all(|b| b & 0xC0 == 0x80);
    if !well_formed {
        return (classify_latin1(lead), 1);
    }

    let mut code_point = u32::from(lead & (0x7F >> len));
    for b in &rest[1..len] {
        code_point = (code_point << 6) | u32::from(b & 0x3F);
    }
    let class = match u8::try_from(code_point) {
        Ok(latin1) => classify_latin1(latin1),
        Err(_) => classify_code_point(code_point),
    };
    (class, len)
}

fn apply(class: CharClass, word: &mut String, out: &mut Vec<Word>) {
    match class {
        CharClass::Literal(c) => {
            if word.len() >= WORD_CAPACITY {
                flush(word, out);
            }
            word.push(char::from(c));
        }
        CharClass::Transliterated(text) => {
            if word.len() + text.len() > WORD_CAPACITY {
                flush(word, out);
            }
            word.push_str(text);
        }
        CharClass::Named(name) => emit(word, Word::Named(name), out),
        CharClass::Ignored => {}
    }
}

fn emit(word: &mut String, named: Word, out: &mut Vec<Word>) {
    flush(word, out);
    out.push(named);
}

fn flush(word: &mut String, out: &mut Vec<Word>) {
    if !word.is_empty() {
        out.push(Word::Plain(std::mem::take(word)));
    }
}

fn push_bounded(buffer: &mut Vec<u8>, c: u8, capacity: usize) {
    if buffer.len() < capacity {
        buffer.push(c);
    }
}
