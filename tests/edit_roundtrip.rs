// Property-based tests using proptest
// Random edit batches are applied to an attached interpretation, which must
// always agree with one decoded from scratch.

use monster_rift_interp::buffer::ByteBuffer;
use monster_rift_interp::caret::Caret;
use monster_rift_interp::config::InterpretationConfig;
use monster_rift_interp::document::Document;
use monster_rift_interp::encoding::{Encoding, Endianness, Utf16, Utf8};
use monster_rift_interp::interpretation::{Interpretation, Line};
use proptest::prelude::*;

/// Bytes that stress line breaks, multi-byte sequences and invalid input
/// for both UTF-8 and UTF-16
fn interesting_byte() -> impl Strategy<Value = u8> {
    prop_oneof![
        3 => Just(b'a'),
        2 => Just(b'\r'),
        2 => Just(b'\n'),
        1 => Just(0x00),
        1 => Just(0xC3),
        1 => Just(0xA9),
        1 => Just(0xE2),
        1 => Just(0x82),
        1 => Just(0xAC),
        1 => Just(0xD8),
        1 => Just(0xDC),
        1 => Just(0xFF),
    ]
}

fn bytes_strategy(max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(interesting_byte(), 0..max)
}

/// (position seed, bytes removed, bytes inserted)
type Edit = (usize, usize, Vec<u8>);

fn batch_strategy() -> impl Strategy<Value = Vec<Edit>> {
    prop::collection::vec((any::<usize>(), 0usize..6, bytes_strategy(6)), 1..6)
}

/// Turn random edits into an ascending, non-overlapping batch and apply it
fn apply_batch(buffer: &mut ByteBuffer, edits: &[Edit]) {
    let len = buffer.len();
    let mut planned: Vec<(usize, usize, &[u8])> = edits
        .iter()
        .map(|(seed, removed, bytes)| (seed % (len + 1), *removed, bytes.as_slice()))
        .collect();
    planned.sort_by_key(|edit| edit.0);

    let mut modifier = buffer.modify();
    let mut floor = 0;
    for (position, removed, bytes) in planned {
        let position = position.max(floor);
        let removed = removed.min(len - position);
        modifier.replace(position, removed, bytes).unwrap();
        floor = position + removed;
    }
    modifier.commit();
}

fn encoding_for(utf16: bool) -> Box<dyn Encoding> {
    if utf16 {
        Box::new(Utf16::new(Endianness::Little))
    } else {
        Box::new(Utf8)
    }
}

fn assert_matches_fresh(buffer: &ByteBuffer, interp: &Interpretation, utf16: bool) {
    let fresh =
        Interpretation::new(buffer, encoding_for(utf16), InterpretationConfig::default()).unwrap();
    assert!(interp.check_integrity(buffer));
    assert_eq!(interp.byte_count(), buffer.len());
    assert_eq!(interp.codepoint_count(), fresh.codepoint_count());
    assert_eq!(interp.character_count(), fresh.character_count());
    let lines: Vec<Line> = interp.lines().copied().collect();
    let expected: Vec<Line> = fresh.lines().copied().collect();
    assert_eq!(lines, expected);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        max_shrink_iters: 2000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_fixup_matches_full_decode(
        initial in bytes_strategy(80),
        batches in prop::collection::vec(batch_strategy(), 1..8),
        max_chunk in 2usize..9,
        utf16 in any::<bool>(),
    ) {
        let mut buffer = ByteBuffer::from_bytes(initial);
        let config = InterpretationConfig::default().with_max_codepoints_per_chunk(max_chunk);
        let interp = Interpretation::attach(&mut buffer, encoding_for(utf16), config).unwrap();

        for batch in &batches {
            apply_batch(&mut buffer, batch);
            assert_matches_fresh(&buffer, &interp.borrow(), utf16);
        }
        prop_assert_eq!(interp.borrow().revision() as usize, buffer.revision() as usize);
    }

    #[test]
    fn prop_converters_round_trip(
        initial in bytes_strategy(120),
        max_chunk in 2usize..9,
        utf16 in any::<bool>(),
    ) {
        let buffer = ByteBuffer::from_bytes(initial);
        let config = InterpretationConfig::default().with_max_codepoints_per_chunk(max_chunk);
        let interp = Interpretation::new(&buffer, encoding_for(utf16), config).unwrap();

        let mut conv = interp.character_byte_converter(&buffer);
        let mut previous = 0;
        for c in 0..=interp.character_count() {
            let byte = conv.character_to_byte(c);
            prop_assert!(c == 0 || byte > previous);
            prop_assert_eq!(conv.byte_to_character(byte), c);
            previous = byte;
        }
        prop_assert_eq!(previous, buffer.len());
    }

    #[test]
    fn prop_document_edits_stay_consistent(
        text in "[ab\r\n\u{e9}\u{20ac}]{0,40}",
        ops in prop::collection::vec((0u8..3, any::<usize>(), any::<usize>()), 1..20),
    ) {
        let mut doc = Document::from_text(1, &text, Box::new(Utf8)).unwrap();
        for (op, a, b) in ops {
            let len = doc.interpretation().character_count();
            doc.set_carets([Caret::new(a % (len + 1)), Caret::new(b % (len + 1))]).unwrap();
            match op {
                0 => doc.insert_text("x\r\n").unwrap(),
                1 => doc.delete_backward().unwrap(),
                _ => doc.delete_forward().unwrap(),
            }
            let len = doc.interpretation().character_count();
            prop_assert!(doc.carets().iter().all(|c| c.end() <= len));
            assert_matches_fresh(doc.buffer(), &doc.interpretation(), false);
        }
    }
}
