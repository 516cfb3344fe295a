//! The persistable parameter set and its `state` record form.

use thiserror::Error;

use crate::record::RecordError;

pub const STATE_TAG: &str = "state";
pub const STATE_FIELDS: usize = 17;

pub const WORDS_PER_ROW_RANGE: std::ops::RangeInclusive<u32> = 1..=100;
pub const FREQUENCY_RANGE: std::ops::RangeInclusive<f64> = 20.0..=20_000.0;
pub const WPM_RANGE: std::ops::RangeInclusive<f64> = 5.0..=60.0;

const WORDS_PER_ROW_TO_PLAYER: u32 = 1;
const WORDS_PER_ROW_TO_FILE: u32 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum OptionError {
    #[error("words per row must be between 1 and 100, got {0}")]
    WordsPerRow(u32),
    #[error("word count must be at least 1")]
    WordCount,
    #[error("frequency must be between 20 and 20000 Hz, got {0}")]
    Frequency(f64),
    #[error("{name} must be between 5 and 60 wpm, got {value}")]
    Wpm { name: &'static str, value: f64 },
}

/// Everything a session can be configured with, as saved under a label.
///
/// `None` means "not given"; the player or the row writer picks its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedOptions {
    pub input_file: Option<String>,
    pub url: Option<String>,
    pub words_per_row: Option<u32>,
    pub word_count: Option<u64>,
    pub send_to_player: bool,
    pub save_position: bool,
    pub follow_links: bool,
    pub text_after: Option<String>,
    pub text_before: Option<String>,
    pub linked_text_after: Option<String>,
    pub linked_text_before: Option<String>,
    pub frequency: Option<f64>,
    pub paris_wpm: Option<f64>,
    pub codex_wpm: Option<f64>,
    pub farnsworth_wpm: Option<f64>,
}

impl FeedOptions {
    pub fn validate(&self) -> Result<(), OptionError> {
        if let Some(n) = self.words_per_row {
            if !WORDS_PER_ROW_RANGE.contains(&n) {
                return Err(OptionError::WordsPerRow(n));
            }
        }
        if self.word_count == Some(0) {
            return Err(OptionError::WordCount);
        }
        if let Some(freq) = self.frequency {
            if !FREQUENCY_RANGE.contains(&freq) {
                return Err(OptionError::Frequency(freq));
            }
        }
        for (name, wpm) in [
            ("PARIS speed", self.paris_wpm),
            ("CODEX speed", self.codex_wpm),
            ("Farnsworth speed", self.farnsworth_wpm),
        ] {
            if let Some(value) = wpm {
                if !WPM_RANGE.contains(&value) {
                    return Err(OptionError::Wpm { name, value });
                }
            }
        }
        Ok(())
    }

    pub fn effective_words_per_row(&self) -> u32 {
        self.words_per_row.unwrap_or(if self.send_to_player {
            WORDS_PER_ROW_TO_PLAYER
        } else {
            WORDS_PER_ROW_TO_FILE
        })
    }

    /// Needs random access to the whole source rather than a single pass.
    pub fn needs_materialized_source(&self) -> bool {
        self.save_position
            || self.follow_links
            || self.text_after.is_some()
            || self.text_before.is_some()
    }

    /// Values set in `overrides` win; flags are combined.
    pub fn overlay(mut self, overrides: FeedOptions) -> FeedOptions {
        fn pick<T>(base: &mut Option<T>, over: Option<T>) {
            if over.is_some() {
                *base = over;
            }
        }
        pick(&mut self.input_file, overrides.input_file);
        pick(&mut self.url, overrides.url);
        pick(&mut self.words_per_row, overrides.words_per_row);
        pick(&mut self.word_count, overrides.word_count);
        self.send_to_player |= overrides.send_to_player;
        self.save_position |= overrides.save_position;
        self.follow_links |= overrides.follow_links;
        pick(&mut self.text_after, overrides.text_after);
        pick(&mut self.text_before, overrides.text_before);
        pick(&mut self.linked_text_after, overrides.linked_text_after);
        pick(&mut self.linked_text_before, overrides.linked_text_before);
        pick(&mut self.frequency, overrides.frequency);
        pick(&mut self.paris_wpm, overrides.paris_wpm);
        pick(&mut self.codex_wpm, overrides.codex_wpm);
        pick(&mut self.farnsworth_wpm, overrides.farnsworth_wpm);
        self
    }

    pub fn to_record(&self, label: &str) -> Vec<String> {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let flag = |b: bool| if b { "1" } else { "0" }.to_owned();
        vec![
            STATE_TAG.to_owned(),
            label.to_owned(),
            text(&self.input_file),
            text(&self.url),
            format_int(self.words_per_row.map(u64::from)),
            format_int(self.word_count),
            flag(self.send_to_player),
            flag(self.save_position),
            flag(self.follow_links),
            text(&self.text_after),
            text(&self.text_before),
            text(&self.linked_text_after),
            text(&self.linked_text_before),
            format_float(self.frequency),
            format_float(self.paris_wpm),
            format_float(self.codex_wpm),
            format_float(self.farnsworth_wpm),
        ]
    }

    pub fn from_record(record: &[String]) -> Result<FeedOptions, RecordError> {
        if record.len() != STATE_FIELDS {
            return Err(RecordError::FieldCount {
                expected: STATE_FIELDS,
                found: record.len(),
            });
        }
        let text = |i: usize| Some(record[i].clone()).filter(|s| !s.is_empty());
        let flag = |i: usize| -> Result<bool, RecordError> {
            Ok(parse_int(record, i, "flag")?.is_some_and(|n| n != 0))
        };
        Ok(FeedOptions {
            input_file: text(2),
            url: text(3),
            words_per_row: parse_int(record, 4, "words per row")?
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
            word_count: parse_int(record, 5, "word count")?,
            send_to_player: flag(6)?,
            save_position: flag(7)?,
            follow_links: flag(8)?,
            text_after: text(9),
            text_before: text(10),
            linked_text_after: text(11),
            linked_text_before: text(12),
            frequency: parse_float(record, 13, "frequency")?,
            paris_wpm: parse_float(record, 14, "PARIS speed")?,
            codex_wpm: parse_float(record, 15, "CODEX speed")?,
            farnsworth_wpm: parse_float(record, 16, "Farnsworth speed")?,
        })
    }
}

fn format_int(value: Option<u64>) -> String {
    value.map_or_else(|| "-1".to_owned(), |n| n.to_string())
}

fn format_float(value: Option<f64>) -> String {
    format!("{:12.3}", value.unwrap_or(-1.0))
}

/// Negative values mean "not given".
fn parse_int(record: &[String], index: usize, name: &'static str) -> Result<Option<u64>, RecordError> {
    let raw = record[index].trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: i64 = raw.parse().map_err(|_| RecordError::InvalidNumber {
        index,
        name,
        value: raw.to_owned(),
    })?;
    Ok(u64::try_from(value).ok())
}

fn parse_float(record: &[String], index: usize, name: &'static str) -> Result<Option<f64>, RecordError> {
    let raw = record[index].trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw.parse().map_err(|_| RecordError::InvalidNumber {
        index,
        name,
        value: raw.to_owned(),
    })?;
    Ok((value >= 0.0).then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_row_width_depends_on_sink() {
        let mut options = FeedOptions::default();
        assert_eq!(options.effective_words_per_row(), 5);
        options.send_to_player = true;
        assert_eq!(options.effective_words_per_row(), 1);
        options.words_per_row = Some(3);
        assert_eq!(options.effective_words_per_row(), 3);
    }

    #[test]
    fn absent_numbers_serialize_as_minus_one() {
        let record = FeedOptions::default().to_record("x");
        assert_eq!(record.len(), STATE_FIELDS);
        assert_eq!(record[4], "-1");
        assert_eq!(record[13], "      -1.000");
    }
}
