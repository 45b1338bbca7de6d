use super::*;
use crate::character::LineEnding;
use crate::encoding::{Endianness, Utf16, Utf8};
use crate::error::ErrorType;

fn doc(text: &str) -> Document {
    Document::from_text(1, text, Box::new(Utf8)).unwrap()
}

fn caret_offsets(doc: &Document) -> Vec<usize> {
    doc.carets().iter().map(|c| c.caret).collect()
}

#[test]
fn test_new_document() {
    let doc = Document::new(7, Box::new(Utf8)).unwrap();
    assert_eq!(doc.id, 7);
    assert!(doc.is_empty());
    assert!(!doc.is_dirty());
    assert_eq!(doc.display_name(), "[No Name]");
    assert_eq!(caret_offsets(&doc), vec![0]);
}

#[test]
fn test_insert_at_multiple_carets() {
    let mut doc = doc("abc");
    doc.set_carets([Caret::new(3), Caret::new(0)]).unwrap();
    doc.insert_text("X").unwrap();
    assert_eq!(doc.text(), "XabcX");
    assert_eq!(caret_offsets(&doc), vec![1, 5]);
    assert_eq!(doc.revision(), 1);
    assert!(doc.is_dirty());
}

#[test]
fn test_insert_replaces_selection() {
    let mut doc = doc("hello world");
    doc.set_carets([Caret::with_selection(11, 6)]).unwrap();
    doc.insert_text("rust").unwrap();
    assert_eq!(doc.text(), "hello rust");
    assert_eq!(caret_offsets(&doc), vec![10]);
}

#[test]
fn test_delete_backward_removes_crlf() {
    let mut doc = doc("ab\r\ncd");
    assert_eq!(doc.interpretation().line_count(), 2);
    doc.set_carets([Caret::new(3)]).unwrap();
    doc.delete_backward().unwrap();
    assert_eq!(doc.text(), "abcd");
    assert_eq!(caret_offsets(&doc), vec![2]);
    assert_eq!(doc.interpretation().line_count(), 1);
    assert_eq!(doc.interpretation().codepoint_count(), 4);
}

#[test]
fn test_delete_backward_multibyte() {
    let mut doc = doc("aé€");
    doc.set_carets([Caret::new(3), Caret::new(2)]).unwrap();
    doc.delete_backward().unwrap();
    assert_eq!(doc.text(), "a");
    assert_eq!(caret_offsets(&doc), vec![1]);
}

#[test]
fn test_delete_backward_at_start_is_noop() {
    let mut doc = doc("abc");
    doc.delete_backward().unwrap();
    assert_eq!(doc.text(), "abc");
    assert_eq!(doc.revision(), 0);
}

#[test]
fn test_delete_forward() {
    let mut doc = doc("abcdef");
    doc.set_carets([Caret::new(0), Caret::with_selection(2, 4), Caret::new(6)])
        .unwrap();
    doc.delete_forward().unwrap();
    assert_eq!(doc.text(), "bef");
    assert_eq!(caret_offsets(&doc), vec![0, 1, 3]);
}

#[test]
fn test_newline_uses_line_ending() {
    let mut doc = doc("ab");
    doc.set_carets([Caret::new(1)]).unwrap();
    doc.set_line_ending(LineEnding::Crlf);
    doc.insert_newline().unwrap();
    assert_eq!(doc.text(), "a\r\nb");
    assert_eq!(caret_offsets(&doc), vec![2]);
    assert_eq!(doc.interpretation().line_count(), 2);
}

#[test]
fn test_caret_past_end_rejected() {
    let mut doc = doc("abc");
    let err = doc.set_carets([Caret::new(1), Caret::new(4)]).unwrap_err();
    assert_eq!(err.kind, ErrorType::Range);
    assert_eq!(err.code, INVALID_CURSOR);
    assert_eq!(caret_offsets(&doc), vec![0]);
}

#[test]
fn test_utf16_document() {
    let mut doc = Document::from_text(2, "x\u{1F600}y", Box::new(Utf16::new(Endianness::Little)))
        .unwrap();
    assert_eq!(doc.buffer().len(), 8);
    doc.set_carets([Caret::new(2)]).unwrap();
    doc.delete_backward().unwrap();
    assert_eq!(doc.text(), "xy");
    doc.insert_text("é").unwrap();
    assert_eq!(doc.text(), "xéy");
    assert_eq!(doc.buffer().len(), 6);
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");

    let mut doc = doc("one\r\ntwo");
    doc.set_carets([Caret::new(7)]).unwrap();
    doc.insert_text("!").unwrap();
    assert!(doc.save().is_err());
    doc.save_as(&path).unwrap();
    assert!(!doc.is_dirty());
    assert_eq!(doc.display_name(), "note.txt");

    let loaded =
        Document::from_file(3, &path, Box::new(Utf8), InterpretationConfig::default()).unwrap();
    assert_eq!(loaded.text(), "one\r\ntwo!");
    assert_eq!(loaded.path(), Some(path.as_path()));
    assert_eq!(loaded.interpretation().line_count(), 2);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Document::from_file(
        1,
        dir.path().join("absent"),
        Box::new(Utf8),
        InterpretationConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorType::Io);
}

#[test]
fn test_delete_selection_and_bare_caret_together() {
    let mut doc = doc("aé\r\nxyz");
    let spans = [Caret::with_selection(3, 2), Caret::with_selection(6, 4)];
    {
        let interp = doc.interpretation.borrow();
        let bytes: Vec<_> = doc
            .cache
            .get(&interp, &doc.buffer, &spans)
            .iter()
            .map(|b| b.range())
            .collect();
        assert_eq!(bytes, vec![3..5, 6..8]);
    }

    doc.set_carets([Caret::with_selection(6, 4), Caret::new(3)])
        .unwrap();
    doc.delete_backward().unwrap();
    assert_eq!(doc.text(), "aéx");
    assert_eq!(caret_offsets(&doc), vec![2, 3]);
    assert_eq!(doc.interpretation().line_count(), 1);
}
