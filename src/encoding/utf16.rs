use super::{Decoded, Encoding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// UTF-16 with a fixed byte order.
///
/// Unpaired surrogates decode as an invalid 2-byte unit; a trailing odd byte
/// decodes as an invalid 1-byte unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf16 {
    endianness: Endianness,
}

impl Utf16 {
    pub const fn new(endianness: Endianness) -> Self {
        Self { endianness }
    }

    fn unit(&self, bytes: &[u8]) -> u16 {
        let pair = [bytes[0], bytes[1]];
        match self.endianness {
            Endianness::Little => u16::from_le_bytes(pair),
            Endianness::Big => u16::from_be_bytes(pair),
        }
    }

    fn push_unit(&self, unit: u16, out: &mut Vec<u8>) {
        match self.endianness {
            Endianness::Little => out.extend_from_slice(&unit.to_le_bytes()),
            Endianness::Big => out.extend_from_slice(&unit.to_be_bytes()),
        }
    }
}

impl Encoding for Utf16 {
    fn name(&self) -> &'static str {
        match self.endianness {
            Endianness::Little => "UTF-16 LE",
            Endianness::Big => "UTF-16 BE",
        }
    }

    fn max_codepoint_len(&self) -> usize {
        4
    }

    fn next_codepoint(&self, bytes: &[u8]) -> Decoded {
        if bytes.len() < 2 {
            return Decoded::invalid(1);
        }
        let high = self.unit(bytes);
        match high {
            0xD800..=0xDBFF => {
                if bytes.len() < 4 {
                    return Decoded::invalid(2);
                }
                let low = self.unit(&bytes[2..]);
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Decoded::invalid(2);
                }
                let value = 0x1_0000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                match char::from_u32(value) {
                    Some(c) => Decoded::valid(4, c),
                    None => Decoded::invalid(2),
                }
            }
            0xDC00..=0xDFFF => Decoded::invalid(2),
            unit => match char::from_u32(u32::from(unit)) {
                Some(c) => Decoded::valid(2, c),
                None => Decoded::invalid(2),
            },
        }
    }

    fn encode(&self, c: char, out: &mut Vec<u8>) {
        let mut units = [0u16; 2];
        for &unit in c.encode_utf16(&mut units).iter() {
            self.push_unit(unit, out);
        }
    }
}
