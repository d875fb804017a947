//! A stateless, deterministic password generator implementing the Master
//! Password algorithm: derive a reproducible site credential from a full
//! name, a master secret, and a handful of per-site parameters, without
//! ever storing the master secret.
//!
//! See <http://masterpasswordapp.com/algorithm.html>.
//!
//! # Layout
//!
//! - [`crypto`] — scrypt, HMAC-SHA256, SHA-256, AES-CTR primitives.
//! - [`bytes`] — length-framing and base64 helpers.
//! - [`types`] — templates, purposes, algorithm versions, result types.
//! - [`algorithm`] — the derivation pipeline itself.
//! - [`marshal`] — profile (de)serialization in the flat and JSON formats.
//! - [`identicon`] — the visual fingerprint of a (full name, secret) pair.
//! - [`cli`] — the command-line argument grammar (non-core boundary).
//! - [`error`] — the crate's error hierarchy and exit-code mapping.

pub mod algorithm;
pub mod bytes;
pub mod cli;
pub mod crypto;
pub mod error;
pub mod identicon;
pub mod marshal;
pub mod types;

pub use algorithm::{master_key, site_key, MasterKey, SiteKey};
pub use error::{Error, Result};
pub use marshal::{read, read_info, write, User};
