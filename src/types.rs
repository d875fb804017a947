//! Static tables: templates, character classes, purposes, algorithm
//! versions, and result types.
//!
//! This module is the externally-visible compatibility surface of the
//! algorithm: every table here must match the published Master Password
//! algorithm byte-for-byte, because changing a single character class
//! or pattern string would silently change every password ever generated
//! from it.

use std::fmt;

use crate::error::AlgorithmError;

/// A name/short-name/description triple, the shape every enum in this
/// module is looked up by.
pub trait Named: Sized + Copy + 'static {
    const ALL: &'static [Self];
    fn short_name(&self) -> &'static str;
    fn long_name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    fn from_name(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.short_name() == s || v.long_name() == s)
    }
}

/// Which family of result this site produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Template {
    Maximum,
    Long,
    Medium,
    Short,
    Basic,
    Pin,
    Name,
    Phrase,
}

impl Named for Template {
    const ALL: &'static [Template] = &[
        Template::Maximum,
        Template::Long,
        Template::Medium,
        Template::Short,
        Template::Basic,
        Template::Pin,
        Template::Name,
        Template::Phrase,
    ];

    fn short_name(&self) -> &'static str {
        match self {
            Template::Maximum => "x",
            Template::Long => "l",
            Template::Medium => "m",
            Template::Short => "s",
            Template::Basic => "b",
            Template::Pin => "i",
            Template::Name => "n",
            Template::Phrase => "p",
        }
    }

    fn long_name(&self) -> &'static str {
        match self {
            Template::Maximum => "maximum",
            Template::Long => "long",
            Template::Medium => "medium",
            Template::Short => "short",
            Template::Basic => "basic",
            Template::Pin => "pin",
            Template::Name => "name",
            Template::Phrase => "phrase",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Template::Maximum => "20 characters, contains symbols",
            Template::Long => "copy-friendly, 14 characters, contains symbols",
            Template::Medium => "copy-friendly, 8 characters, contains symbols",
            Template::Short => "copy-friendly, 4 characters, no symbols",
            Template::Basic => "8 characters, no symbols",
            Template::Pin => "4 numbers",
            Template::Name => "9 letter name",
            Template::Phrase => "20 character sentence",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.long_name())
    }
}

impl Template {
    /// Candidate pattern strings for this template; the site key's first
    /// byte selects one of them.
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            Template::Maximum => &["anoxxxxxxxxxxxxxxxxx", "axxxxxxxxxxxxxxxxxno"],
            Template::Long => &[
                "CvcvnoCvcvCvcv",
                "CvcvCvcvnoCvcv",
                "CvcvCvcvCvcvno",
                "CvccnoCvcvCvcv",
                "CvccCvcvnoCvcv",
                "CvccCvcvCvcvno",
                "CvcvnoCvccCvcv",
                "CvcvCvccnoCvcv",
                "CvcvCvccCvcvno",
                "CvcvnoCvcvCvcc",
                "CvcvCvcvnoCvcc",
                "CvcvCvcvCvccno",
                "CvccnoCvccCvcv",
                "CvccCvccnoCvcv",
                "CvccCvccCvcvno",
                "CvcvnoCvccCvcc",
                "CvcvCvccnoCvcc",
                "CvcvCvccCvccno",
                "CvccnoCvcvCvcc",
                "CvccCvcvnoCvcc",
                "CvccCvcvCvccno",
            ],
            Template::Medium => &["CvcnoCvc", "CvcCvcno"],
            Template::Short => &["Cvcn"],
            Template::Basic => &["aaanaaan", "aannaaan", "aaannaaa"],
            Template::Pin => &["nnnn"],
            Template::Name => &["cvccvcvcv"],
            Template::Phrase => &[
                "cvcc cvc cvccvcv cvc",
                "cvc cvccvcvcv cvcv",
                "cv cvccv cvc cvcvccv",
            ],
        }
    }
}

/// Character classes a template pattern character can reference.
///
/// - `V` uppercase vowel, `C` uppercase consonant
/// - `v` lowercase vowel, `c` lowercase consonant
/// - `A` uppercase letter, `a` letter (any case)
/// - `n` digit, `o` special symbol
/// - `x` letter, digit, or special symbol
/// - `' '` literal space (used by the `Phrase` template)
pub fn characters_in_class(class: char) -> Result<&'static str, AlgorithmError> {
    Ok(match class {
        'V' => "AEIOU",
        'C' => "BCDFGHJKLMNPQRSTVWXYZ",
        'v' => "aeiou",
        'c' => "bcdfghjklmnpqrstvwxyz",
        'A' => "AEIOUBCDFGHJKLMNPQRSTVWXYZ",
        'a' => "AEIOUaeiouBCDFGHJKLMNPQRSTVWXYZbcdfghjklmnpqrstvwxyz",
        'n' => "0123456789",
        'o' => "@&%?,=[]_:-+*$#!'^~;()/.",
        'x' => "AEIOUaeiouBCDFGHJKLMNPQRSTVWXYZbcdfghjklmnpqrstvwxyz0123456789!@#$%^&*()",
        ' ' => " ",
        other => {
            return Err(AlgorithmError::UnknownTemplate(format!(
                "unknown character class {other:?}"
            )))
        }
    })
}

/// What kind of value is being derived for a site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultType {
    /// A templated credential: deterministic, stateless.
    Template(Template),
    /// A user-encrypted secret stored in the profile.
    Personal,
    /// A per-device secret stored in the profile.
    Device,
    /// A raw derived key of the given bit length (128, 256, or 512).
    Key,
}

impl ResultType {
    pub fn from_name(s: &str) -> Option<ResultType> {
        match s {
            "stored" | "personal" => Some(ResultType::Personal),
            "device" => Some(ResultType::Device),
            "key" | "derive" => Some(ResultType::Key),
            _ => Template::from_name(s).map(ResultType::Template),
        }
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            ResultType::Template(t) => t.long_name(),
            ResultType::Personal => "personal",
            ResultType::Device => "device",
            ResultType::Key => "key",
        }
    }

    /// Whether this type's content is stored encrypted on disk rather than
    /// recomputed from parameters alone.
    pub fn is_stateful(&self) -> bool {
        matches!(self, ResultType::Personal | ResultType::Device)
    }
}

/// Scope label governing the derivation message and default template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purpose {
    Authentication,
    Identification,
    Recovery,
}

impl Named for Purpose {
    const ALL: &'static [Purpose] = &[
        Purpose::Authentication,
        Purpose::Identification,
        Purpose::Recovery,
    ];

    fn short_name(&self) -> &'static str {
        match self {
            Purpose::Authentication => "a",
            Purpose::Identification => "i",
            Purpose::Recovery => "r",
        }
    }

    fn long_name(&self) -> &'static str {
        match self {
            Purpose::Authentication => "authentication",
            Purpose::Identification => "identification",
            Purpose::Recovery => "recovery",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Purpose::Authentication => "log in with a site password",
            Purpose::Identification => "log in with a site login name",
            Purpose::Recovery => "answer a security question",
        }
    }
}

impl Purpose {
    /// Scope string mixed into the derivation message's key/message.
    pub fn scope(&self) -> &'static str {
        match self {
            Purpose::Authentication => "com.lyndir.masterpassword",
            Purpose::Identification => "com.lyndir.masterpassword.login",
            Purpose::Recovery => "com.lyndir.masterpassword.answer",
        }
    }

    /// The template a site of this purpose uses when none is specified.
    pub fn default_template(&self) -> Template {
        match self {
            Purpose::Authentication => Template::Long,
            Purpose::Identification => Template::Name,
            Purpose::Recovery => Template::Phrase,
        }
    }
}

/// Site counter. `0` means "use the stored default login"
/// under `Purpose::Identification`; any other value is a literal ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Counter(pub u32);

impl Counter {
    pub const DEFAULT_LOGIN: Counter = Counter(0);
    pub const INITIAL: Counter = Counter(1);

    pub fn is_default_login(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Algorithm version. Controls wire-level encoding
/// details only; the cryptographic primitives themselves never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlgorithmVersion {
    V0,
    V1,
    V2,
    V3,
}

impl AlgorithmVersion {
    pub const FIRST: AlgorithmVersion = AlgorithmVersion::V0;
    pub const LAST: AlgorithmVersion = AlgorithmVersion::V3;
    pub const DEFAULT: AlgorithmVersion = AlgorithmVersion::V3;

    pub fn from_u32(v: u32) -> Option<AlgorithmVersion> {
        match v {
            0 => Some(AlgorithmVersion::V0),
            1 => Some(AlgorithmVersion::V1),
            2 => Some(AlgorithmVersion::V2),
            3 => Some(AlgorithmVersion::V3),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            AlgorithmVersion::V0 => 0,
            AlgorithmVersion::V1 => 1,
            AlgorithmVersion::V2 => 2,
            AlgorithmVersion::V3 => 3,
        }
    }

    /// `true` for versions that frame the site name (and purpose context)
    /// length by Unicode scalar count rather than UTF-8 byte count, in the
    /// site-key derivation message.
    pub fn site_name_uses_character_length(&self) -> bool {
        matches!(self, AlgorithmVersion::V0 | AlgorithmVersion::V1)
    }

    /// `true` for versions that frame the full name length by Unicode
    /// scalar count rather than UTF-8 byte count, in the master-key salt.
    ///
    /// This boundary sits one version later than
    /// [`site_name_uses_character_length`](Self::site_name_uses_character_length):
    /// upstream keeps character-length framing for the master key through
    /// V2 and switches to byte-length only at V3, while the site name (and
    /// context) switch at V2. The two must not be collapsed into one
    /// flag, or V2 and V3 become byte-identical.
    pub fn master_key_uses_character_length(&self) -> bool {
        matches!(
            self,
            AlgorithmVersion::V0 | AlgorithmVersion::V1 | AlgorithmVersion::V2
        )
    }
}

impl Default for AlgorithmVersion {
    fn default() -> Self {
        AlgorithmVersion::DEFAULT
    }
}

impl fmt::Display for AlgorithmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// On-disk marshalling format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Flat,
    Json,
}

impl Format {
    pub fn from_name(s: &str) -> Option<Format> {
        match s {
            "f" | "flat" => Some(Format::Flat),
            "j" | "json" => Some(Format::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Flat => "mpsites",
            Format::Json => "mpsites.json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_lookup_by_short_and_long_name() {
        assert_eq!(Template::from_name("x"), Some(Template::Maximum));
        assert_eq!(Template::from_name("maximum"), Some(Template::Maximum));
        assert_eq!(Template::from_name("nonsense"), None);
    }

    #[test]
    fn every_pattern_character_has_a_class() {
        for template in Template::ALL {
            for pattern in template.patterns() {
                for c in pattern.chars() {
                    characters_in_class(c).unwrap_or_else(|_| {
                        panic!("template {template:?} pattern {pattern:?} has unknown class {c:?}")
                    });
                }
            }
        }
    }

    #[test]
    fn purpose_scopes_are_distinct() {
        assert_ne!(
            Purpose::Authentication.scope(),
            Purpose::Identification.scope()
        );
        assert_ne!(Purpose::Identification.scope(), Purpose::Recovery.scope());
    }

    #[test]
    fn algorithm_version_round_trips_through_u32() {
        for v in [0, 1, 2, 3] {
            let version = AlgorithmVersion::from_u32(v).unwrap();
            assert_eq!(version.as_u32(), v);
        }
        assert_eq!(AlgorithmVersion::from_u32(4), None);
    }
}
