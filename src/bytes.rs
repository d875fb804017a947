//! Byte-framing and encoding utilities shared by the algorithm engine and
//! the marshaller.
//!
//! These are the small, load-bearing details that make the derivation
//! messages byte-compatible with every other Master Password
//! implementation: big-endian length prefixes and a plain, unpadded
//! base64 alphabet.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use byteorder::{BigEndian, WriteBytesExt};

/// Append a big-endian `u32` length prefix to `buf`.
pub fn push_u32be(n: u32, buf: &mut Vec<u8>) {
    buf.write_u32::<BigEndian>(n)
        .expect("writing to a Vec<u8> cannot fail");
}

/// Append raw bytes to `buf`.
pub fn push_bytes(b: &[u8], buf: &mut Vec<u8>) {
    buf.extend_from_slice(b);
}

/// Standard base64, no line wrapping, no padding removed.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode standard base64 produced by [`base64_encode`].
pub fn base64_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32be_is_big_endian() {
        let mut buf = Vec::new();
        push_u32be(1, &mut buf);
        assert_eq!(buf, vec![0, 0, 0, 1]);
    }

    #[test]
    fn base64_round_trips() {
        let data = b"hello world, this is a test.";
        let encoded = base64_encode(data);
        assert!(!encoded.contains('\n'));
        assert_eq!(base64_decode(&encoded).unwrap(), data);
    }
}
