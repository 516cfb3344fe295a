use std::io::{self, BufRead};

use crate::charmap::is_space;

/// Tokens longer than this are split into several tokens.
pub const MAX_TOKEN_LEN: usize = 1023;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub bytes: Vec<u8>,
    /// Offset of the first byte.
    pub start: usize,
    /// Offset at which reading resumes once this token has been emitted.
    pub resume_at: usize,
}

/// Splits a byte stream into whitespace-delimited tokens, tracking offsets.
///
/// Tokens are reassembled across buffer refills, so a token never breaks at a
/// read boundary.
#[derive(Debug)]
pub struct TokenReader<R> {
    reader: R,
    offset: usize,
    pending: Vec<u8>,
    pending_start: usize,
}

impl<R: BufRead> TokenReader<R> {
    /// `base_offset` is the absolute position of the reader's first byte.
    pub fn new(reader: R, base_offset: usize) -> Self {
        Self {
            reader,
            offset: base_offset,
            pending: Vec::new(),
            pending_start: base_offset,
        }
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn next_token(&mut self) -> io::Result<Option<Token>> {
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };

            if buf.is_empty() {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(Token {
                    bytes: std::mem::take(&mut self.pending),
                    start: self.pending_start,
                    resume_at: self.offset,
                }));
            }

            let mut used = 0;
            let mut token = None;
            for &c in buf {
                let pos = self.offset + used;
                if is_space(c) {
                    used += 1;
                    if !self.pending.is_empty() {
                        token = Some(Token {
                            bytes: std::mem::take(&mut self.pending),
                            start: self.pending_start,
                            resume_at: pos + 1,
                        });
                        break;
                    }
                } else if self.pending.len() == MAX_TOKEN_LEN {
                    // Leave `c` unread; it starts the next token.
                    token = Some(Token {
                        bytes: std::mem::take(&mut self.pending),
                        start: self.pending_start,
                        resume_at: pos,
                    });
                    break;
                } else {
                    if self.pending.is_empty() {
                        self.pending_start = pos;
                    }
                    self.pending.push(c);
                    used += 1;
                }
            }

            self.reader.consume(used);
            self.offset += used;
            if token.is_some() {
                return Ok(token);
            }
        }
    }
}

impl<R: BufRead> Iterator for TokenReader<R> {
    type Item = io::Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
