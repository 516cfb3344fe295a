use morsefeed_core::{ByteSpan, SourceBuffer};
use pretty_assertions::assert_eq;

const PAGE: &[u8] = b"header START body text END footer END";

#[test]
fn after_and_before_markers_narrow_the_span() {
    let mut span = ByteSpan::whole(PAGE);
    assert!(span.select_after(PAGE, b"START"));
    assert!(span.select_before(PAGE, b"END"));
    assert_eq!(span.slice(PAGE), b" body text ");
}

#[test]
fn missing_markers_leave_the_span_unchanged() {
    let mut span = ByteSpan::whole(PAGE);
    assert!(!span.select_after(PAGE, b"nowhere"));
    assert!(!span.select_before(PAGE, b"nowhere"));
    assert_eq!(span, ByteSpan::whole(PAGE));
}

#[test]
fn before_marker_is_searched_from_the_current_start() {
    let text = b"END one START two END";
    let mut span = ByteSpan::whole(text);
    span.select_after(text, b"START");
    span.select_before(text, b"END");
    assert_eq!(span.slice(text), b" two ");
}

#[test]
fn saved_offset_past_the_marker_wins() {
    let mut span = ByteSpan::whole(PAGE);
    span.select_after(PAGE, b"START");
    let marker_start = span.start;

    span.apply_resume(0);
    assert_eq!(span.start, marker_start);

    span.apply_resume(3);
    assert_eq!(span.start, marker_start);

    span.apply_resume(marker_start + 5);
    assert_eq!(span.start, marker_start + 5);
}

#[test]
fn resume_offset_is_clamped_to_the_end() {
    let mut span = ByteSpan::whole(b"short");
    span.apply_resume(500);
    assert_eq!(span.start, 5);
    assert!(span.is_empty());
}

#[test]
fn buffer_reads_a_whole_reader() {
    let mut buffer = SourceBuffer::new();
    let read = buffer.read_from(&PAGE[..]).unwrap();
    assert_eq!(read, PAGE.len());
    assert_eq!(buffer.as_bytes(), PAGE);
    assert_eq!(buffer.whole_span().len(), PAGE.len());
}
