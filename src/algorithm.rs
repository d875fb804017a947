//! The Master Password derivation pipeline: master key, site key, and
//! result rendering, parameterized by [`AlgorithmVersion`].
//!
//! See <http://masterpasswordapp.com/algorithm.html>. Version-specific
//! differences (character-length vs. byte-length framing, the V0
//! signed-byte template selector) are dispatched from a single surface
//! here rather than scattered across callers, per the algorithm registry
//! design note.

use zeroize::Zeroizing;

use crate::bytes::{push_bytes, push_u32be};
use crate::crypto;
use crate::error::{AlgorithmError, Result};
use crate::types::{characters_in_class, AlgorithmVersion, Counter, Purpose, Template};

const MASTER_KEY_SCOPE: &str = "com.lyndir.masterpassword";

/// 64-byte master key, derived once per (full name, master password,
/// algorithm version) and zeroized on drop. Never persisted.
pub struct MasterKey(Zeroizing<[u8; 64]>);

impl MasterKey {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Hex SHA-256 of this key, used only to recognize the master secret
    /// against a stored profile.
    pub fn key_id(&self) -> String {
        crypto::hex_sha256(&self.0[..])
    }
}

/// 32-byte HMAC-SHA256 site key, ephemeral and zeroized after use.
pub struct SiteKey(Zeroizing<[u8; 32]>);

impl SiteKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Frame a length as either Unicode scalar count or UTF-8 byte count,
/// per `use_character_length`. The master-key full name and the site-key
/// site name/context switch from character to byte framing at different
/// algorithm versions, so callers pass the boundary that applies to them
/// rather than this function picking one itself.
fn frame_len(s: &str, use_character_length: bool) -> Result<u32> {
    let len = if use_character_length {
        s.chars().count()
    } else {
        s.len()
    };
    u32::try_from(len).map_err(|_| AlgorithmError::SiteNameTooLong.into())
}

/// Derive the 64-byte master key from the user's full name and master
/// password.
pub fn master_key(
    full_name: &str,
    master_password: &str,
    version: AlgorithmVersion,
) -> Result<MasterKey> {
    let mut salt = Vec::new();
    push_bytes(MASTER_KEY_SCOPE.as_bytes(), &mut salt);
    let name_len = frame_len(full_name, version.master_key_uses_character_length())
        .map_err(|_| AlgorithmError::FullNameTooLong)?;
    push_u32be(name_len, &mut salt);
    push_bytes(full_name.as_bytes(), &mut salt);

    let stretched = crypto::scrypt(master_password.as_bytes(), &salt, 64)?;
    let mut key = [0u8; 64];
    key.copy_from_slice(&stretched);
    Ok(MasterKey(Zeroizing::new(key)))
}

/// Derive the site key for one (site, counter, purpose, context) request.
pub fn site_key(
    master_key: &MasterKey,
    site_name: &str,
    counter: Counter,
    purpose: Purpose,
    context: Option<&str>,
    version: AlgorithmVersion,
) -> Result<SiteKey> {
    let mut msg = Vec::new();
    push_bytes(purpose.scope().as_bytes(), &mut msg);

    let site_name_len = frame_len(site_name, version.site_name_uses_character_length())?;
    push_u32be(site_name_len, &mut msg);
    push_bytes(site_name.as_bytes(), &mut msg);
    push_u32be(counter.0, &mut msg);

    if let Some(ctx) = context {
        if !ctx.is_empty() {
            let ctx_len = frame_len(ctx, version.site_name_uses_character_length())?;
            push_u32be(ctx_len, &mut msg);
            push_bytes(ctx.as_bytes(), &mut msg);
        }
    }

    let digest = crypto::hmac_sha256(&master_key.0[..], &msg);
    Ok(SiteKey(Zeroizing::new(digest)))
}

/// Render a [`Template`] result from a site key.
pub fn render_template(site_key: &SiteKey, template: Template, version: AlgorithmVersion) -> String {
    let seed = site_key.as_bytes();
    let patterns = template.patterns();
    let pattern = patterns[select_index(seed[0], patterns.len(), version)];

    let mut out = String::with_capacity(pattern.len());
    for (i, class) in pattern.chars().enumerate() {
        let alphabet = characters_in_class(class).expect("template patterns only use known classes");
        let idx = select_index(seed[i + 1], alphabet.len(), version);
        out.push(alphabet.as_bytes()[idx] as char);
    }
    out
}

/// Reduce a raw seed byte modulo `count` to select a pattern or alphabet
/// entry.
///
/// V0 is a preserved quirk: it reinterprets the byte as signed 8-bit
/// before reducing, taking the modulo with "positive wraparound" (adding
/// `count` back when the signed remainder is negative). Every later
/// version reduces the byte as a plain unsigned value. The two agree for
/// seed bytes below 128 and differ above it, so this must not be
/// "simplified" away.
fn select_index(byte: u8, count: usize, version: AlgorithmVersion) -> usize {
    let count = count as i32;
    if version == AlgorithmVersion::V0 {
        let signed = byte as i8 as i32;
        let rem = signed % count;
        (if rem < 0 { rem + count } else { rem }) as usize
    } else {
        (byte as i32 % count) as usize
    }
}

/// Encrypt a stateful (`Personal`/`Device`) result under the site key.
pub fn encrypt_stateful(site_key: &SiteKey, plaintext: &[u8]) -> Vec<u8> {
    crypto::aes_ctr_encrypt(site_key.as_bytes(), plaintext)
}

/// Decrypt a stateful result produced by [`encrypt_stateful`].
pub fn decrypt_stateful(site_key: &SiteKey, ciphertext: &[u8]) -> Vec<u8> {
    crypto::aes_ctr_decrypt(site_key.as_bytes(), ciphertext)
}

/// Derive a raw keystream of `bits` length (128, 256, or 512), hex-encoded.
pub fn derive_key(
    master_key: &MasterKey,
    site_name: &str,
    counter: Counter,
    context: Option<&str>,
    version: AlgorithmVersion,
    bits: u32,
) -> Result<String> {
    let bytes = match bits {
        128 | 256 => {
            let key = site_key(master_key, site_name, counter, Purpose::Authentication, context, version)?;
            key.as_bytes()[..(bits / 8) as usize].to_vec()
        }
        512 => {
            let first = site_key(master_key, site_name, counter, Purpose::Authentication, context, version)?;
            let next_counter = Counter(counter.0.wrapping_add(1));
            let second = site_key(master_key, site_name, next_counter, Purpose::Authentication, context, version)?;
            let mut combined = Vec::with_capacity(64);
            combined.extend_from_slice(first.as_bytes());
            combined.extend_from_slice(second.as_bytes());
            combined
        }
        other => return Err(AlgorithmError::UnsupportedKeySize(other).into()),
    };
    Ok(data_encoding::HEXLOWER.encode(&bytes))
}
