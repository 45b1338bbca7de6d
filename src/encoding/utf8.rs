use super::{Decoded, Encoding};

/// UTF-8. Malformed sequences decode as one invalid byte at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8;

impl Encoding for Utf8 {
    fn name(&self) -> &'static str {
        "UTF-8"
    }

    fn max_codepoint_len(&self) -> usize {
        4
    }

    fn next_codepoint(&self, bytes: &[u8]) -> Decoded {
        let lead = bytes[0];
        let (continuation, min, init) = match lead {
            0x00..=0x7F => return Decoded::valid(1, lead as char),
            0xC2..=0xDF => (1, 0x80, u32::from(lead & 0x1F)),
            0xE0..=0xEF => (2, 0x800, u32::from(lead & 0x0F)),
            0xF0..=0xF4 => (3, 0x1_0000, u32::from(lead & 0x07)),
            _ => return Decoded::invalid(1),
        };
        if bytes.len() <= continuation {
            return Decoded::invalid(1);
        }

        let mut value = init;
        for &b in &bytes[1..=continuation] {
            if b & 0xC0 != 0x80 {
                return Decoded::invalid(1);
            }
            value = (value << 6) | u32::from(b & 0x3F);
        }
        if value < min {
            // Overlong
            return Decoded::invalid(1);
        }
        match char::from_u32(value) {
            Some(c) => Decoded::valid(continuation + 1, c),
            None => Decoded::invalid(1),
        }
    }

    fn encode(&self, c: char, out: &mut Vec<u8>) {
        let mut buf = [0u8; 4];
        out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }
}
