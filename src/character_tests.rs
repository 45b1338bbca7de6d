use super::*;

#[test]
fn test_line_ending_lengths() {
    assert_eq!(LineEnding::None.codepoints(), 0);
    assert_eq!(LineEnding::Cr.codepoints(), 1);
    assert_eq!(LineEnding::Lf.codepoints(), 1);
    assert_eq!(LineEnding::Crlf.codepoints(), 2);

    assert_eq!(LineEnding::None.chars(), 0);
    assert_eq!(LineEnding::Crlf.chars(), 1);
    assert!(!LineEnding::None.is_break());
    assert!(LineEnding::Cr.is_break());
}

#[test]
fn test_codepoint_len() {
    assert_eq!(Character::Codepoint('🦀').codepoint_len(), 1);
    assert_eq!(Character::Invalid.codepoint_len(), 1);
    assert_eq!(Character::LineBreak(LineEnding::Crlf).codepoint_len(), 2);
}

#[test]
fn test_render() {
    let text: String = [
        Character::Codepoint('a'),
        Character::LineBreak(LineEnding::Crlf),
        Character::Invalid,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    assert_eq!(text, "a\r\n\u{FFFD}");
}

#[test]
fn test_to_char_lossy() {
    assert_eq!(Character::Invalid.to_char_lossy(), '\u{FFFD}');
    assert_eq!(Character::LineBreak(LineEnding::Crlf).to_char_lossy(), '\n');
    assert_eq!(Character::LineBreak(LineEnding::Cr).to_char_lossy(), '\r');
}
