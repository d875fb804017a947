//! Acceptance vectors for the Master Password algorithm, exercised through
//! the crate's public API rather than its internals.

use mpw::algorithm::{derive_key, master_key, render_template, site_key};
use mpw::types::{AlgorithmVersion, Counter, Purpose, Template};

const FULL_NAME: &str = "Robert Lee Mitchell";
const MASTER_PASSWORD: &str = "banana colored duckling";
const SITE_NAME: &str = "masterpasswordapp.com";

#[test]
fn long_password_for_reference_user() {
    let mk = master_key(FULL_NAME, MASTER_PASSWORD, AlgorithmVersion::V3).unwrap();
    let key = site_key(&mk, SITE_NAME, Counter(1), Purpose::Authentication, None, AlgorithmVersion::V3).unwrap();
    assert_eq!(render_template(&key, Template::Long, AlgorithmVersion::V3), "Jejr5[RepuSosp");
}

#[test]
fn maximum_password_for_reference_user() {
    let mk = master_key(FULL_NAME, MASTER_PASSWORD, AlgorithmVersion::V3).unwrap();
    let key = site_key(&mk, SITE_NAME, Counter(1), Purpose::Authentication, None, AlgorithmVersion::V3).unwrap();
    assert_eq!(
        render_template(&key, Template::Maximum, AlgorithmVersion::V3),
        "W6@692^B1#&@gVdSdLZ@"
    );
}

#[test]
fn pin_for_reference_user() {
    let mk = master_key(FULL_NAME, MASTER_PASSWORD, AlgorithmVersion::V3).unwrap();
    let key = site_key(&mk, SITE_NAME, Counter(1), Purpose::Authentication, None, AlgorithmVersion::V3).unwrap();
    assert_eq!(render_template(&key, Template::Pin, AlgorithmVersion::V3), "7044");
}

#[test]
fn counter_changes_the_derived_password() {
    let mk = master_key(FULL_NAME, MASTER_PASSWORD, AlgorithmVersion::V3).unwrap();
    let key1 = site_key(&mk, SITE_NAME, Counter(1), Purpose::Authentication, None, AlgorithmVersion::V3).unwrap();
    let key2 = site_key(&mk, SITE_NAME, Counter(2), Purpose::Authentication, None, AlgorithmVersion::V3).unwrap();
    assert_ne!(
        render_template(&key1, Template::Long, AlgorithmVersion::V3),
        render_template(&key2, Template::Long, AlgorithmVersion::V3),
    );
}

#[test]
fn identification_login_name_is_deterministic() {
    let mk = master_key(FULL_NAME, MASTER_PASSWORD, AlgorithmVersion::V3).unwrap();
    let a = site_key(&mk, SITE_NAME, Counter(1), Purpose::Identification, None, AlgorithmVersion::V3).unwrap();
    let b = site_key(&mk, SITE_NAME, Counter(1), Purpose::Identification, None, AlgorithmVersion::V3).unwrap();
    assert_eq!(
        render_template(&a, Template::Name, AlgorithmVersion::V3),
        render_template(&b, Template::Name, AlgorithmVersion::V3),
    );
}

#[test]
fn recovery_phrase_is_deterministic_given_a_context() {
    let mk = master_key(FULL_NAME, MASTER_PASSWORD, AlgorithmVersion::V3).unwrap();
    let a = site_key(&mk, SITE_NAME, Counter(1), Purpose::Recovery, Some("question"), AlgorithmVersion::V3).unwrap();
    let b = site_key(&mk, SITE_NAME, Counter(1), Purpose::Recovery, Some("question"), AlgorithmVersion::V3).unwrap();
    assert_eq!(
        render_template(&a, Template::Phrase, AlgorithmVersion::V3),
        render_template(&b, Template::Phrase, AlgorithmVersion::V3),
    );
}

#[test]
fn different_users_never_collide_on_the_same_site() {
    let mk1 = master_key("Jane Doe", "hunter2 hunter2", AlgorithmVersion::V3).unwrap();
    let mk2 = master_key("John Doe", "hunter2 hunter2", AlgorithmVersion::V3).unwrap();
    let k1 = site_key(&mk1, "example.com", Counter(1), Purpose::Authentication, None, AlgorithmVersion::V3).unwrap();
    let k2 = site_key(&mk2, "example.com", Counter(1), Purpose::Authentication, None, AlgorithmVersion::V3).unwrap();
    assert_ne!(
        render_template(&k1, Template::Long, AlgorithmVersion::V3),
        render_template(&k2, Template::Long, AlgorithmVersion::V3),
    );
}

#[test]
fn derive_produces_the_requested_byte_length_in_hex() {
    let mk = master_key("Jane Doe", "hunter2 hunter2", AlgorithmVersion::V3).unwrap();
    let k128 = derive_key(&mk, "example.com", Counter(1), None, AlgorithmVersion::V3, 128).unwrap();
    let k256 = derive_key(&mk, "example.com", Counter(1), None, AlgorithmVersion::V3, 256).unwrap();
    let k512 = derive_key(&mk, "example.com", Counter(1), None, AlgorithmVersion::V3, 512).unwrap();
    assert_eq!(k128.len(), 32);
    assert_eq!(k256.len(), 64);
    assert_eq!(k512.len(), 128);
    assert!(k128.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn every_algorithm_version_produces_a_distinct_password() {
    // The reference user's name and site are pure ASCII, where character
    // count and byte count always agree, so they can't exercise either
    // framing boundary in §4.D (master-key full-name framing switches at
    // V3; site-key site-name framing switches at V2). Use names with
    // non-ASCII characters so the two framings genuinely diverge.
    let full_name = "Ren\u{e9}e M\u{fc}ller";
    let site_name = "caf\u{e9}-m\u{fc}nchen.example";

    let mut master_keys = Vec::new();
    let mut site_keys = Vec::new();
    let mut rendered = Vec::new();
    for version in [
        AlgorithmVersion::V0,
        AlgorithmVersion::V1,
        AlgorithmVersion::V2,
        AlgorithmVersion::V3,
    ] {
        let mk = master_key(full_name, "hunter2 hunter2", version).unwrap();
        let key = site_key(&mk, site_name, Counter(1), Purpose::Authentication, None, version).unwrap();
        rendered.push(render_template(&key, Template::Long, version));
        master_keys.push(mk.as_bytes().to_vec());
        site_keys.push(key.as_bytes().to_vec());
    }

    // V0..V2 share character-length master-key framing; only V3 switches
    // to byte length.
    assert_eq!(master_keys[0], master_keys[1]);
    assert_eq!(master_keys[1], master_keys[2]);
    assert_ne!(master_keys[2], master_keys[3]);

    // V0/V1 share character-length site-name framing and the same master
    // key, so their site keys are byte-identical. V2 switches site-name
    // framing to byte length; V3 shares that framing with V2 but has its
    // own master key, so it differs from V2 too.
    assert_eq!(site_keys[0], site_keys[1]);
    assert_ne!(site_keys[1], site_keys[2]);
    assert_ne!(site_keys[2], site_keys[3]);

    let distinct_site_keys: std::collections::HashSet<_> = site_keys.iter().collect();
    assert_eq!(distinct_site_keys.len(), 3);

    // V0 and V1 derive the same site key; only the V0 signed-byte selector
    // quirk could still separate their rendered passwords, so this only
    // asserts what the framing rules themselves guarantee.
    let distinct_rendered: std::collections::HashSet<_> = rendered.iter().collect();
    assert!(distinct_rendered.len() >= 3);
}
