//! JSON profile codec.
//!
//! Root object: `export` (format metadata), `user` (envelope fields),
//! `sites` (object keyed by site name, insertion order preserved on
//! write via `serde_json`'s `preserve_order` feature).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::{Question, Site, User};
use crate::error::FormatError;
use crate::types::{AlgorithmVersion, Counter, ResultType};

#[derive(Serialize, Deserialize)]
struct ExportSection {
    format: u32,
    redacted: bool,
    date: String,
}

#[derive(Serialize, Deserialize)]
struct UserSection {
    full_name: String,
    key_id: String,
    algorithm: u32,
    default_type: String,
    last_used: String,
    redacted: bool,
}

#[derive(Serialize, Deserialize)]
struct QuestionSection {
    #[serde(default)]
    keyword: String,
    #[serde(rename = "type")]
    type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct SiteSection {
    #[serde(rename = "type")]
    type_: String,
    counter: u32,
    algorithm: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    login_name: Option<String>,
    #[serde(default)]
    login_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    uses: u32,
    last_used: String,
    #[serde(default)]
    questions: Vec<QuestionSection>,
}

fn parse_result_type(s: &str) -> Result<ResultType, FormatError> {
    ResultType::from_name(s).ok_or_else(|| FormatError::UnknownSiteType(s.to_string()))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, FormatError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| FormatError::InvalidTimestamp(s.to_string()))
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `true` if `bytes` looks like the JSON dialect (leading `{`).
pub fn detect(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|b| *b == b'{')
        .unwrap_or(false)
}

/// Parse just enough of the JSON envelope to answer `read_info` without
/// the master password.
pub fn read_info(bytes: &[u8]) -> Result<super::ProfileInfo, FormatError> {
    let root: Value = serde_json::from_slice(bytes)?;
    let export: ExportSection = serde_json::from_value(root["export"].clone())?;
    let user: UserSection = serde_json::from_value(root["user"].clone())?;
    Ok(super::ProfileInfo {
        format: crate::types::Format::Json,
        algorithm: AlgorithmVersion::from_u32(user.algorithm)
            .ok_or_else(|| FormatError::UnknownResultFormat(user.algorithm.to_string()))?,
        key_id: user.key_id,
        date: parse_timestamp(&export.date)?,
        redacted: export.redacted,
    })
}

/// Parse a full user profile (envelope + sites + questions) from JSON,
/// without deriving or verifying the master key — that's `read`'s job,
/// one layer up.
pub fn decode(bytes: &[u8], master_password: &str) -> Result<User, FormatError> {
    let root: Value = serde_json::from_slice(bytes)?;
    let export: ExportSection = serde_json::from_value(root["export"].clone())?;
    let user_section: UserSection = serde_json::from_value(root["user"].clone())?;
    let algorithm = AlgorithmVersion::from_u32(user_section.algorithm)
        .ok_or_else(|| FormatError::UnknownResultFormat(user_section.algorithm.to_string()))?;
    let default_type = parse_result_type(&user_section.default_type)?;

    let mut sites = Vec::new();
    if let Some(sites_obj) = root.get("sites").and_then(Value::as_object) {
        for (name, value) in sites_obj.iter() {
            let section: SiteSection = serde_json::from_value(value.clone())?;
            let type_ = parse_result_type(&section.type_)?;
            let content = if type_.is_stateful() {
                section
                    .content
                    .as_deref()
                    .map(crate::bytes::base64_decode)
                    .transpose()
                    .map_err(|e| FormatError::Base64(e.to_string()))?
            } else {
                section.content.as_ref().map(|s| s.as_bytes().to_vec())
            };
            let mut questions = Vec::with_capacity(section.questions.len());
            for q in section.questions {
                let q_content = q
                    .content
                    .as_deref()
                    .map(crate::bytes::base64_decode)
                    .transpose()
                    .map_err(|e| FormatError::Base64(e.to_string()))?;
                questions.push(Question {
                    keyword: q.keyword,
                    type_: parse_result_type(&q.type_)?,
                    content: q_content,
                });
            }
            sites.push(Site {
                name: name.clone(),
                type_,
                counter: Counter(section.counter),
                algorithm: AlgorithmVersion::from_u32(section.algorithm).unwrap_or(algorithm),
                login_name: section.login_name,
                login_generated: section.login_generated,
                content,
                url: section.url,
                uses: section.uses,
                last_used: parse_timestamp(&section.last_used)?,
                questions,
            });
        }
    }

    Ok(User {
        full_name: user_section.full_name,
        master_password: master_password.to_string(),
        key_id: user_section.key_id,
        default_type,
        algorithm,
        redacted: export.redacted,
        last_used: parse_timestamp(&user_section.last_used)?,
        sites,
    })
}

/// Serialize a user profile to JSON, honoring `user.redacted`.
pub fn encode(user: &User) -> Result<Vec<u8>, FormatError> {
    let export = ExportSection {
        format: 1,
        redacted: user.redacted,
        date: format_timestamp(&Utc::now()),
    };
    let user_section = UserSection {
        full_name: user.full_name.clone(),
        key_id: user.key_id.clone(),
        algorithm: user.algorithm.as_u32(),
        default_type: user.default_type.long_name().to_string(),
        last_used: format_timestamp(&user.last_used),
        redacted: user.redacted,
    };

    let mut sites_map = serde_json::Map::new();
    for site in &user.sites {
        let content = if site.type_.is_stateful() {
            // Stateful content is always stored as encrypted base64,
            // regardless of redaction.
            site.content.as_deref().map(crate::bytes::base64_encode)
        } else if user.redacted {
            // Redacted template content is recomputable and never stored.
            None
        } else {
            // Unredacted template content is a plaintext convenience copy
            // of the last rendered credential.
            site.content
                .as_deref()
                .map(|c| String::from_utf8_lossy(c).into_owned())
        };

        let questions = site
            .questions
            .iter()
            .map(|q| QuestionSection {
                keyword: q.keyword.clone(),
                type_: q.type_.long_name().to_string(),
                content: q.content.as_deref().map(crate::bytes::base64_encode),
            })
            .collect();

        let section = SiteSection {
            type_: site.type_.long_name().to_string(),
            counter: site.counter.0,
            algorithm: site.algorithm.as_u32(),
            login_name: site.login_name.clone(),
            login_generated: site.login_generated,
            content,
            url: site.url.clone(),
            uses: site.uses,
            last_used: format_timestamp(&site.last_used),
            questions,
        };
        sites_map.insert(site.name.clone(), serde_json::to_value(section)?);
    }

    let root = serde_json::json!({
        "export": export,
        "user": user_section,
        "sites": Value::Object(sites_map),
    });
    Ok(serde_json::to_vec_pretty(&root)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Template;

    fn sample_user() -> User {
        let mut user = User::new("John Doe", "password", AlgorithmVersion::V3).unwrap();
        let mut site = Site::new("example.com", AlgorithmVersion::V3);
        site.type_ = ResultType::Template(Template::Long);
        user.sites.push(site);
        user
    }

    #[test]
    fn detects_json_by_leading_brace() {
        assert!(detect(b"  \n{\"a\":1}"));
        assert!(!detect(b"# not json"));
    }

    #[test]
    fn round_trips_template_site() {
        let user = sample_user();
        let bytes = encode(&user).unwrap();
        let decoded = decode(&bytes, "password").unwrap();
        assert_eq!(decoded.full_name, user.full_name);
        assert_eq!(decoded.key_id, user.key_id);
        assert_eq!(decoded.sites.len(), 1);
        assert_eq!(decoded.sites[0].name, "example.com");
    }

    #[test]
    fn redacted_profile_omits_template_content() {
        let mut user = sample_user();
        user.redacted = true;
        user.sites[0].content = Some(b"should not appear".to_vec());
        let bytes = encode(&user).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("should not appear"));
    }
}
