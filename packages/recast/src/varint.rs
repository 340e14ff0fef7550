//! Variable-length integer decoding for the byte-buffer numeric path.
//!
//! Little-endian base-128 groups with a continuation bit; signed values use
//! the zig-zag mapping. This is the common protobuf wire form.

// 64 bits / 7 bits per group, rounded up.
const MAX_GROUPS: usize = 10;

/// Decode an unsigned varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// buffer is empty, ends mid-value, or overflows 64 bits.
pub(crate) fn decode_unsigned(buf: &[u8]) -> Option<(u64, usize)> {
    let mut out: u64 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_GROUPS {
            return None;
        }
        // The tenth group contributes a single bit.
        if i == MAX_GROUPS - 1 && byte > 0x01 {
            return None;
        }
        out |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((out, i + 1));
        }
    }
    None
}

/// Decode a zig-zag signed varint from the front of `buf`.
pub(crate) fn decode_signed(buf: &[u8]) -> Option<(i64, usize)> {
    let (raw, read) = decode_unsigned(buf)?;
    let value = (raw >> 1) as i64 ^ -((raw & 1) as i64);
    Some((value, read))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_unsigned(mut value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let group = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                out.push(group);
                return out;
            }
            out.push(group | 0x80);
        }
    }

    fn encode_signed(value: i64) -> Vec<u8> {
        encode_unsigned(((value << 1) ^ (value >> 63)) as u64)
    }

    #[test]
    fn known_signed_encoding() {
        // Zig-zag encoding of 12345678, trailing padding ignored.
        let buf = [0x9c, 0x85, 0xe3, 0x0b, 0, 0, 0, 0];
        assert_eq!(decode_signed(&buf), Some((12_345_678, 4)));
        assert_eq!(decode_unsigned(&buf), Some((24_691_356, 4)));
    }

    #[test]
    fn round_trips() {
        for value in [0u64, 1, 127, 128, 300, u64::MAX] {
            let buf = encode_unsigned(value);
            assert_eq!(decode_unsigned(&buf), Some((value, buf.len())));
        }
        for value in [0i64, -1, 1, -64, 64, i64::MIN, i64::MAX] {
            let buf = encode_signed(value);
            assert_eq!(decode_signed(&buf), Some((value, buf.len())));
        }
    }

    #[test]
    fn rejects_empty_and_truncated() {
        assert_eq!(decode_unsigned(&[]), None);
        assert_eq!(decode_unsigned(&[0x80]), None);
        assert_eq!(decode_unsigned(&[0xff; 11]), None);
    }
}
