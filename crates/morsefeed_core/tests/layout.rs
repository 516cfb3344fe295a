use morsefeed_core::{Placement, RowLayout, Word, WordBudget};
use pretty_assertions::assert_eq;

fn render(words: &[Word], words_per_row: usize) -> String {
    let mut layout = RowLayout::new(words_per_row);
    let mut out = String::new();
    for word in words {
        let Placement {
            leading_space,
            ends_row,
        } = layout.place();
        if leading_space {
            out.push(' ');
        }
        out.push_str(word.as_str());
        if ends_row {
            out.push('\n');
        }
    }
    if layout.row_in_progress() {
        layout.close_row();
        out.push('\n');
    }
    out
}

#[test]
fn seven_words_wrap_into_two_full_rows_and_a_partial_row() {
    let words: Vec<Word> = ["A", "B", "C", "D", "E", "F", "G"]
        .into_iter()
        .map(|w| Word::Plain(w.to_string()))
        .collect();
    assert_eq!(render(&words, 3), "A B C\nD E F\nG\n");
}

#[test]
fn fillers_take_slots_but_not_budget() {
    let words = vec![
        Word::Plain("ONE".into()),
        Word::TagFiller,
        Word::ListItem,
        Word::Plain("TWO".into()),
    ];
    assert_eq!(render(&words, 3), "ONE   |\nTWO\n");

    let mut budget = WordBudget::new(Some(2));
    let reached: Vec<bool> = words.iter().map(|w| budget.record(w)).collect();
    assert_eq!(reached, vec![false, false, false, true]);
    assert_eq!(budget.counted(), 2);
}

#[test]
fn zero_width_rows_fall_back_to_one_word() {
    let layout = RowLayout::new(0);
    assert_eq!(layout.words_per_row(), 1);
}

#[test]
fn unlimited_budget_is_never_exhausted() {
    let mut budget = WordBudget::new(None);
    for _ in 0..1000 {
        assert!(!budget.record(&Word::Named("dash")));
    }
    assert!(!budget.is_exhausted());
}
