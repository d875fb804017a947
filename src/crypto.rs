//! Cryptographic primitives used by the Master Password algorithm.
//!
//! Everything here is a thin, well-typed wrapper around RustCrypto crates:
//! scrypt for key-stretching, HMAC-SHA256 for keyed derivation, SHA-256 for
//! fingerprints, and AES-CTR for the stateful `Personal`/`Device` result
//! types. None of this is novel cryptography; the point of this module is
//! to pin down the exact parameters the algorithm requires and to keep
//! secret material zeroized.

use aes::cipher::{KeyIvInit, StreamCipher};
use data_encoding::HEXLOWER;
use hmac::{Hmac, Mac};
use scrypt::Params as ScryptParams;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// scrypt cost parameter (CPU/memory cost), as `log2(N)`.
const SCRYPT_LOG_N: u8 = 15; // N = 32768
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 2;
const SCRYPT_DK_LEN: usize = 64;

lazy_static::lazy_static! {
    static ref SCRYPT_PARAMS: ScryptParams =
        ScryptParams::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_DK_LEN)
            .expect("fixed scrypt parameters are always valid");
}

/// Stretch `password` with `salt` into a `dk_len`-byte key.
///
/// Parameters are fixed by the algorithm (`N=32768, r=8, p=2`); the only
/// variable is the output length, which differs between the 64-byte master
/// key and the raw `Derive` keystream.
pub fn scrypt(password: &[u8], salt: &[u8], dk_len: usize) -> Result<Vec<u8>> {
    let params = if dk_len == SCRYPT_DK_LEN {
        SCRYPT_PARAMS.clone()
    } else {
        ScryptParams::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, dk_len)
            .map_err(|e| CryptoError::Scrypt(e.to_string()))?
    };
    let mut out = vec![0u8; dk_len];
    scrypt::scrypt(password, salt, &params, &mut out)
        .map_err(|e| CryptoError::Scrypt(e.to_string()))?;
    Ok(out)
}

/// HMAC-SHA256(key, message).
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// SHA-256(bytes).
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Lowercase-hex SHA-256, used for `KeyID`.
pub fn hex_sha256(bytes: &[u8]) -> String {
    HEXLOWER.encode(&sha256(bytes))
}

/// Encrypt `plaintext` in place with AES-256-CTR under `key`, IV all-zero.
///
/// The IV is fixed at zero because every (key, plaintext) pair is unique:
/// the key is a one-time SiteKey derived from the full derivation message,
/// never reused across sites, counters, or purposes.
pub fn aes_ctr_encrypt(key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    let mut buf = plaintext.to_vec();
    let mut cipher = Aes256Ctr::new_from_slices(key, &[0u8; 16]).expect("key and IV lengths are fixed");
    cipher.apply_keystream(&mut buf);
    buf
}

/// Decrypt `ciphertext` encrypted by [`aes_ctr_encrypt`]. AES-CTR is
/// symmetric, so this is the same operation.
pub fn aes_ctr_decrypt(key: &[u8; 32], ciphertext: &[u8]) -> Vec<u8> {
    aes_ctr_encrypt(key, ciphertext)
}

/// Constant-time byte equality, for comparing secret-derived values.
pub fn constant_time_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Zero a secret-bearing buffer in place.
pub fn secure_zero(buf: &mut [u8]) {
    buf.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrypt_matches_known_vector() {
        let key = scrypt(b"password", b"salt", 64).unwrap();
        assert_eq!(key.len(), 64);
        // Deterministic: same inputs, same output.
        let key2 = scrypt(b"password", b"salt", 64).unwrap();
        assert_eq!(key, key2);
    }

    #[test]
    fn hmac_is_deterministic() {
        let a = hmac_sha256(b"key", b"message");
        let b = hmac_sha256(b"key", b"message");
        assert_eq!(a, b);
        let c = hmac_sha256(b"key", b"other message");
        assert_ne!(a, c);
    }

    #[test]
    fn aes_ctr_round_trips() {
        let key = [7u8; 32];
        let plaintext = b"a site secret";
        let ciphertext = aes_ctr_encrypt(&key, plaintext);
        assert_ne!(ciphertext, plaintext);
        assert_eq!(aes_ctr_decrypt(&key, &ciphertext), plaintext);
    }

    #[test]
    fn constant_time_equal_rejects_mismatched_length() {
        assert!(!constant_time_equal(b"abc", b"ab"));
        assert!(constant_time_equal(b"abc", b"abc"));
        assert!(!constant_time_equal(b"abc", b"abd"));
    }
}
