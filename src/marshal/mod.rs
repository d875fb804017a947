//! Marshaller: serialize/deserialize a [`User`] profile in the two
//! on-disk formats, with redacted/unredacted variants.
//!
//! `read_info` answers format/metadata questions without the master
//! password; `read` fully decodes a profile and authenticates the master
//! password against the stored `KeyID`; `write` re-encodes a profile.

pub mod flat;
pub mod json;
pub mod user;

pub use user::{Question, Site, User};

use chrono::{DateTime, Utc};

use crate::crypto;
use crate::error::{Error, FormatError, Result};
use crate::types::{AlgorithmVersion, Format};

/// The subset of a profile's envelope `read_info` can answer without the
/// master password.
#[derive(Debug, Clone)]
pub struct ProfileInfo {
    pub format: Format,
    pub algorithm: AlgorithmVersion,
    pub key_id: String,
    pub date: DateTime<Utc>,
    pub redacted: bool,
}

/// Detect the format of `bytes` and extract its envelope metadata without
/// requiring the master password.
pub fn read_info(bytes: &[u8]) -> Result<ProfileInfo> {
    if json::detect(bytes) {
        Ok(json::read_info(bytes)?)
    } else if flat::detect(bytes) {
        Ok(flat::read_info(bytes)?)
    } else {
        Err(FormatError::UnknownFormat.into())
    }
}

/// Fully decode a profile and authenticate `master_password` against its
/// stored `KeyID`.
///
/// On success, every site's stateful `content` has been decrypted in
/// place and the returned `User` retains `master_password` for the
/// session.
pub fn read(bytes: &[u8], master_password: &str) -> Result<User> {
    let mut user = if json::detect(bytes) {
        json::decode(bytes, master_password)?
    } else if flat::detect(bytes) {
        flat::decode(bytes, master_password)?
    } else {
        return Err(FormatError::UnknownFormat.into());
    };

    let master_key = crate::algorithm::master_key(&user.full_name, master_password, user.algorithm)?;
    let expected = crypto::hex_sha256(master_key.as_bytes());
    if !crypto::constant_time_equal(expected.as_bytes(), user.key_id.as_bytes()) {
        return Err(Error::MasterPassword);
    }

    for site in &mut user.sites {
        site.content = site.decrypt_content(&master_key)?;
        let decrypted_questions = site.decrypt_questions(&master_key)?;
        for (question, content) in site.questions.iter_mut().zip(decrypted_questions) {
            question.content = content;
        }
    }

    Ok(user)
}

/// Re-encode `user` in the given format, honoring `user.redacted`.
///
/// The caller is responsible for updating `last_used`/`uses` on the
/// touched user and site before writing.
pub fn write(user: &User, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Flat => Ok(flat::encode(user)?),
        Format::Json => Ok(json::encode(user)?),
    }
}

/// Choose the format to write with: the CLI's fixed format if given,
/// else the format the profile was read in, else the default.
pub fn select_write_format(cli_fixed: Option<Format>, read_from: Option<Format>) -> Format {
    cli_fixed.or(read_from).unwrap_or(Format::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlgorithmVersion;

    #[test]
    fn read_rejects_wrong_master_password() {
        let user = User::new("John Doe", "correct horse", AlgorithmVersion::V3).unwrap();
        let bytes = write(&user, Format::Json).unwrap();
        let result = read(&bytes, "wrong horse");
        assert!(matches!(result, Err(Error::MasterPassword)));
    }

    #[test]
    fn read_accepts_correct_master_password() {
        let user = User::new("John Doe", "correct horse", AlgorithmVersion::V3).unwrap();
        let bytes = write(&user, Format::Json).unwrap();
        let decoded = read(&bytes, "correct horse").unwrap();
        assert_eq!(decoded.full_name, "John Doe");
    }

    #[test]
    fn select_write_format_prefers_cli_then_source_then_default() {
        assert_eq!(select_write_format(Some(Format::Flat), Some(Format::Json)), Format::Flat);
        assert_eq!(select_write_format(None, Some(Format::Flat)), Format::Flat);
        assert_eq!(select_write_format(None, None), Format::Json);
    }
}
