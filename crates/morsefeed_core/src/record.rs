//! Tab-separated record codec for the position/option store.
//!
//! One record per line, fields separated by tabs. Tabs, newlines, carriage
//! returns and backslashes inside a field are backslash-escaped.

use thiserror::Error;

pub const POSITION_TAG: &str = "position";
pub const POSITION_FIELDS: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record has {found} fields, expected {expected}")]
    FieldCount { expected: usize, found: usize },
    #[error("field {index} ({name}) is not a valid number: {value:?}")]
    InvalidNumber {
        index: usize,
        name: &'static str,
        value: String,
    },
}

pub fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_field`]. Unknown escapes keep the escaped character and
/// a trailing lone backslash is kept literally.
pub fn unescape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Every record in a store file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    records: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Self {
        let records = text
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.split('\t').map(unescape_field).collect())
            .collect();
        Self { records }
    }

    pub fn format(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            let fields: Vec<String> = record.iter().map(|f| escape_field(f)).collect();
            out.push_str(&fields.join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    /// First record with `field_count` fields whose first two fields are
    /// `tag` and `key`.
    pub fn find(&self, tag: &str, key: &str, field_count: usize) -> Option<&[String]> {
        self.position_of(tag, key, field_count)
            .map(|index| self.records[index].as_slice())
    }

    /// Replaces the matching record in place, or appends a new one.
    pub fn upsert(&mut self, record: Vec<String>) {
        let index = match record.as_slice() {
            [tag, key, ..] => self.position_of(tag, key, record.len()),
            _ => None,
        };
        match index {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
    }

    /// Removes every matching record. Returns whether anything was removed.
    pub fn remove(&mut self, tag: &str, key: &str, field_count: usize) -> bool {
        let before = self.records.len();
        self.records
            .retain(|record| !matches_key(record, tag, key, field_count));
        self.records.len() != before
    }

    /// Saved offset for `key`, or 0 when there is none.
    pub fn position(&self, key: &str) -> u64 {
        self.find(POSITION_TAG, key, POSITION_FIELDS)
            .and_then(|record| record[2].trim().parse().ok())
            .unwrap_or(0)
    }

    /// Stores `offset` for `key`. An offset of 0 removes the record.
    pub fn set_position(&mut self, key: &str, offset: u64) {
        if offset == 0 {
            self.remove(POSITION_TAG, key, POSITION_FIELDS);
        } else {
            self.upsert(vec![
                POSITION_TAG.to_owned(),
                key.to_owned(),
                offset.to_string(),
            ]);
        }
    }

    fn position_of(&self, tag: &str, key: &str, field_count: usize) -> Option<usize> {
        self.records
            .iter()
            .position(|record| matches_key(record, tag, key, field_count))
    }
}

fn matches_key(record: &[String], tag: &str, key: &str, field_count: usize) -> bool {
    record.len() == field_count && record[0] == tag && record[1] == key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters_and_backslash() {
        assert_eq!(escape_field("a\tb\\c\nd\re"), "a\\tb\\\\c\\nd\\re");
        assert_eq!(unescape_field("a\\tb\\\\c\\nd\\re"), "a\tb\\c\nd\re");
        assert_eq!(unescape_field("end\\"), "end\\");
    }
}
