//! In-memory profile model: [`User`], [`Site`], and [`Question`].
//!
//! These are the structures the flat and JSON codecs both read into and
//! write from. The tree is strictly hierarchical: a user owns an ordered
//! list of sites, each site owns an ordered list of questions.

use chrono::{DateTime, Utc};

use crate::algorithm;
use crate::error::Result;
use crate::types::{AlgorithmVersion, Counter, Purpose, ResultType};

/// A security question attached to a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Empty means "the default question" rather than a specific one.
    pub keyword: String,
    pub type_: ResultType,
    /// Ciphertext on disk, cleartext once decrypted for this session.
    pub content: Option<Vec<u8>>,
}

impl Question {
    pub fn new(keyword: impl Into<String>) -> Question {
        Question {
            keyword: keyword.into(),
            type_: ResultType::Template(crate::types::Template::Phrase),
            content: None,
        }
    }

    fn context(&self) -> Option<&str> {
        if self.keyword.is_empty() {
            None
        } else {
            Some(&self.keyword)
        }
    }
}

/// A site entry with all default values plugged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub name: String,
    pub type_: ResultType,
    pub counter: Counter,
    pub algorithm: AlgorithmVersion,
    pub login_name: Option<String>,
    pub login_generated: bool,
    /// Ciphertext on disk for stateful types; cleartext once decrypted.
    pub content: Option<Vec<u8>>,
    pub url: Option<String>,
    pub uses: u32,
    pub last_used: DateTime<Utc>,
    pub questions: Vec<Question>,
}

impl Site {
    pub fn new(name: impl Into<String>, algorithm: AlgorithmVersion) -> Site {
        Site {
            name: name.into(),
            type_: ResultType::Template(Purpose::Authentication.default_template()),
            counter: Counter::INITIAL,
            algorithm,
            login_name: None,
            login_generated: false,
            content: None,
            url: None,
            uses: 0,
            last_used: Utc::now(),
            questions: Vec::new(),
        }
    }

    /// Record a use of this site, bumping `uses` and `last_used`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.uses += 1;
        self.last_used = now;
    }

    /// Decrypt this site's stateful `content` under the given master key.
    /// No-op (returns the stored bytes as-is) for template types, whose
    /// content is never stored ciphertext.
    pub fn decrypt_content(&self, master_key: &algorithm::MasterKey) -> Result<Option<Vec<u8>>> {
        match (&self.content, self.type_.is_stateful()) {
            (Some(ciphertext), true) => {
                let site_key = algorithm::site_key(
                    master_key,
                    &self.name,
                    self.counter,
                    Purpose::Authentication,
                    None,
                    self.algorithm,
                )?;
                Ok(Some(algorithm::decrypt_stateful(&site_key, ciphertext)))
            }
            (content, _) => Ok(content.clone()),
        }
    }

    /// Encrypt `plaintext` for storage as this site's stateful `content`.
    pub fn encrypt_content(
        &self,
        master_key: &algorithm::MasterKey,
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        let site_key = algorithm::site_key(
            master_key,
            &self.name,
            self.counter,
            Purpose::Authentication,
            None,
            self.algorithm,
        )?;
        Ok(algorithm::encrypt_stateful(&site_key, plaintext))
    }

    /// Decrypt every question's stored answer under the given master key.
    pub fn decrypt_questions(&self, master_key: &algorithm::MasterKey) -> Result<Vec<Option<Vec<u8>>>> {
        self.questions
            .iter()
            .map(|q| match &q.content {
                Some(ciphertext) => {
                    let site_key = algorithm::site_key(
                        master_key,
                        &self.name,
                        self.counter,
                        Purpose::Recovery,
                        q.context(),
                        self.algorithm,
                    )?;
                    Ok(Some(algorithm::decrypt_stateful(&site_key, ciphertext)))
                }
                None => Ok(None),
            })
            .collect()
    }
}

/// A user profile: default parameters, sites, and (transitively) their
/// questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub full_name: String,
    /// Kept in memory for this run only; never serialized.
    pub master_password: String,
    pub key_id: String,
    pub default_type: ResultType,
    pub algorithm: AlgorithmVersion,
    pub redacted: bool,
    pub last_used: DateTime<Utc>,
    pub sites: Vec<Site>,
}

impl User {
    pub fn new(full_name: impl Into<String>, master_password: impl Into<String>, algorithm: AlgorithmVersion) -> Result<User> {
        let full_name = full_name.into();
        let master_password = master_password.into();
        let master_key = algorithm::master_key(&full_name, &master_password, algorithm)?;
        Ok(User {
            full_name,
            key_id: master_key.key_id(),
            master_password,
            default_type: ResultType::Template(Purpose::Authentication.default_template()),
            algorithm,
            redacted: true,
            last_used: Utc::now(),
            sites: Vec::new(),
        })
    }

    /// Derive this user's master key. Cheap to call repeatedly; the
    /// stretch only needs to happen once per session in practice, but the
    /// type itself is not cached here to keep the in-memory model free of
    /// secret-shaped fields beyond `master_password`.
    pub fn master_key(&self) -> Result<algorithm::MasterKey> {
        algorithm::master_key(&self.full_name, &self.master_password, self.algorithm)
    }

    /// Find a site by name.
    pub fn site(&self, name: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.name == name)
    }

    pub fn site_mut(&mut self, name: &str) -> Option<&mut Site> {
        self.sites.iter_mut().find(|s| s.name == name)
    }

    /// Insert or return the existing site for `name`, preserving
    /// insertion order.
    pub fn site_or_insert(&mut self, name: &str) -> &mut Site {
        if self.site(name).is_none() {
            self.sites.push(Site::new(name, self.algorithm));
        }
        self.site_mut(name).expect("just inserted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_key_id_matches_master_key() {
        let user = User::new("John Doe", "password", AlgorithmVersion::V3).unwrap();
        let master_key = user.master_key().unwrap();
        assert_eq!(user.key_id, master_key.key_id());
    }

    #[test]
    fn site_stateful_round_trips() {
        let user = User::new("John Doe", "password", AlgorithmVersion::V3).unwrap();
        let master_key = user.master_key().unwrap();
        let mut site = Site::new("example.com", AlgorithmVersion::V3);
        site.type_ = ResultType::Personal;
        let ciphertext = site.encrypt_content(&master_key, b"my secret").unwrap();
        site.content = Some(ciphertext);
        let decrypted = site.decrypt_content(&master_key).unwrap();
        assert_eq!(decrypted, Some(b"my secret".to_vec()));
    }
}
