//! Error hierarchy for the mpw crate.
//!
//! One variant family per failure category from the algorithm's point of
//! view (crypto, marshalling) plus the top-level [`Error`] the CLI adapter
//! maps to an exit code. The categories and exit codes mirror the
//! usage/data/software distinction mpw's C implementation makes.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures from the crypto primitives layer.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("scrypt failed: {0}")]
    Scrypt(String),
}

/// Failures from the algorithm engine.
#[derive(Debug, thiserror::Error)]
pub enum AlgorithmError {
    #[error("full name is too long to encode its byte length in 32 bits")]
    FullNameTooLong,
    #[error("site name is too long to encode its byte length in 32 bits")]
    SiteNameTooLong,
    #[error("site context is too long to encode its byte length in 32 bits")]
    SiteContextTooLong,
    #[error("counter {0} is out of range")]
    CounterOutOfRange(u64),
    #[error("unknown template name {0:?}")]
    UnknownTemplate(String),
    #[error("unknown purpose name {0:?}")]
    UnknownPurpose(String),
    #[error("unknown algorithm version {0:?}")]
    UnknownAlgorithm(String),
    #[error("unsupported key size {0} bits; expected 128, 256 or 512")]
    UnsupportedKeySize(u32),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Failures from the marshaller.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("could not detect profile format: file is neither flat nor JSON")]
    UnknownFormat,
    #[error("malformed flat-format line: {0:?}")]
    MalformedLine(String),
    #[error("malformed flat-format header line: {0:?}")]
    MalformedHeader(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unknown site type {0:?}")]
    UnknownSiteType(String),
    #[error("unknown purpose {0:?}")]
    UnknownPurpose(String),
    #[error("unknown result format {0:?}")]
    UnknownResultFormat(String),
    #[error("invalid base64 in stored content: {0}")]
    Base64(String),
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
}

/// Top-level error returned by any public entry point in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad input from the caller: unknown enum names, out-of-range values.
    #[error("usage error: {0}")]
    Usage(String),
    /// A required value had no source (no flag, no env var, no prompt).
    #[error("missing input: {0}")]
    MissingInput(String),
    /// The derived KeyID did not match the profile's stored KeyID.
    #[error("wrong master password for this profile")]
    MasterPassword,
    /// The profile file was malformed or used an unrecognized format.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A cryptographic primitive failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// An I/O failure while reading or writing a profile.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AlgorithmError> for Error {
    fn from(e: AlgorithmError) -> Error {
        match e {
            AlgorithmError::CounterOutOfRange(_)
            | AlgorithmError::UnknownTemplate(_)
            | AlgorithmError::UnknownPurpose(_)
            | AlgorithmError::UnknownAlgorithm(_)
            | AlgorithmError::UnsupportedKeySize(_)
            | AlgorithmError::FullNameTooLong
            | AlgorithmError::SiteNameTooLong
            | AlgorithmError::SiteContextTooLong => Error::Usage(e.to_string()),
            AlgorithmError::Crypto(c) => Error::Crypto(c),
        }
    }
}

/// Standard Unix exit-code categories (`sysexits.h`), as mpw uses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Usage = 64,
    DataErr = 65,
    Software = 70,
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

impl Error {
    /// Map this error to the exit-code category the CLI adapter should use.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::Usage(_) => ExitCode::Usage,
            Error::MissingInput(_) => ExitCode::DataErr,
            Error::MasterPassword => ExitCode::DataErr,
            Error::Format(_) => ExitCode::DataErr,
            Error::Crypto(_) => ExitCode::Software,
            Error::Io(_) => ExitCode::Software,
        }
    }
}
