//! Flat-format profile codec.
//!
//! ASCII, line-oriented: a header block of `# Key: value` lines followed
//! by one record per site:
//!
//! ```text
//! <lastUsed>  <uses>  <type>:<algorithm>:<counter>  <loginName>  <name>  <content>
//! ```
//!
//! The decoder accepts both the current header dialect and the older one
//! that lacks `Algorithm:`/`Default Type:` lines, in which case the whole
//! file is assumed to be `AlgorithmVersion::V0` (the V0 dialect predates
//! per-file algorithm versioning). Questions are not representable in
//! this format; only the JSON codec carries them, matching the flat
//! export's historical role as a simple site/password listing.

use chrono::{DateTime, SecondsFormat, Utc};

use super::user::{Site, User};
use crate::error::FormatError;
use crate::types::{AlgorithmVersion, Counter, Format, ResultType};

const MAGIC: &str = "# Master Password site export";
/// Placeholder for an empty optional field so column positions survive a
/// run of whitespace being used as the separator.
const EMPTY: &str = "-";

/// `true` if `bytes` looks like the flat dialect (leading `#`).
pub fn detect(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|b| *b == b'#')
        .unwrap_or(false)
}

struct Header {
    full_name: String,
    key_id: String,
    date: DateTime<Utc>,
    redacted: bool,
    algorithm: AlgorithmVersion,
    default_type: ResultType,
}

fn header_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let line = line.trim_start_matches('#').trim();
    line.strip_prefix(key)
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::trim)
}

fn parse_header(text: &str) -> Result<Header, FormatError> {
    let mut full_name = None;
    let mut key_id = None;
    let mut date = None;
    let mut redacted = true;
    let mut algorithm = None;
    let mut default_type = None;

    for line in text.lines() {
        if !line.trim_start().starts_with('#') {
            break;
        }
        if let Some(v) = header_value(line, "Full Name") {
            full_name = Some(v.to_string());
        } else if let Some(v) = header_value(line, "Key ID") {
            key_id = Some(v.to_string());
        } else if let Some(v) = header_value(line, "Date") {
            date = Some(
                DateTime::parse_from_rfc3339(v)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|_| FormatError::InvalidTimestamp(v.to_string()))?,
            );
        } else if let Some(v) = header_value(line, "Redacted") {
            redacted = v == "true";
        } else if let Some(v) = header_value(line, "Algorithm") {
            let version: u32 = v
                .parse()
                .map_err(|_| FormatError::MalformedHeader(line.to_string()))?;
            algorithm = AlgorithmVersion::from_u32(version);
        } else if let Some(v) = header_value(line, "Default Type") {
            default_type = ResultType::from_name(v);
        }
    }

    // The V0 dialect never wrote Algorithm:/Default Type: lines.
    let algorithm = algorithm.unwrap_or(AlgorithmVersion::V0);
    let default_type = default_type
        .unwrap_or(ResultType::Template(crate::types::Purpose::Authentication.default_template()));

    Ok(Header {
        full_name: full_name.ok_or_else(|| FormatError::MalformedHeader("missing Full Name".into()))?,
        key_id: key_id.ok_or_else(|| FormatError::MalformedHeader("missing Key ID".into()))?,
        date: date.ok_or_else(|| FormatError::MalformedHeader("missing Date".into()))?,
        redacted,
        algorithm,
        default_type,
    })
}

/// Read just the envelope metadata, without parsing site records.
pub fn read_info(bytes: &[u8]) -> Result<super::ProfileInfo, FormatError> {
    let text = std::str::from_utf8(bytes).map_err(|_| FormatError::UnknownFormat)?;
    if !text.starts_with(MAGIC) {
        return Err(FormatError::UnknownFormat);
    }
    let header = parse_header(text)?;
    Ok(super::ProfileInfo {
        format: Format::Flat,
        algorithm: header.algorithm,
        key_id: header.key_id,
        date: header.date,
        redacted: header.redacted,
    })
}

fn parse_type_field(field: &str) -> Result<(ResultType, AlgorithmVersion, Counter), FormatError> {
    let mut parts = field.splitn(3, ':');
    let type_name = parts
        .next()
        .ok_or_else(|| FormatError::MalformedLine(field.to_string()))?;
    let algorithm: u32 = parts
        .next()
        .ok_or_else(|| FormatError::MalformedLine(field.to_string()))?
        .parse()
        .map_err(|_| FormatError::MalformedLine(field.to_string()))?;
    let counter: u32 = parts
        .next()
        .ok_or_else(|| FormatError::MalformedLine(field.to_string()))?
        .parse()
        .map_err(|_| FormatError::MalformedLine(field.to_string()))?;

    let type_ = ResultType::from_name(type_name).ok_or_else(|| FormatError::UnknownSiteType(type_name.to_string()))?;
    let algorithm = AlgorithmVersion::from_u32(algorithm)
        .ok_or_else(|| FormatError::MalformedLine(field.to_string()))?;
    Ok((type_, algorithm, Counter(counter)))
}

fn parse_site_line(line: &str) -> Result<Site, FormatError> {
    let mut tokens = line.split_whitespace();
    let last_used = tokens
        .next()
        .ok_or_else(|| FormatError::MalformedLine(line.to_string()))?;
    let uses = tokens
        .next()
        .ok_or_else(|| FormatError::MalformedLine(line.to_string()))?;
    let type_field = tokens
        .next()
        .ok_or_else(|| FormatError::MalformedLine(line.to_string()))?;
    let login_name = tokens
        .next()
        .ok_or_else(|| FormatError::MalformedLine(line.to_string()))?;
    let name = tokens
        .next()
        .ok_or_else(|| FormatError::MalformedLine(line.to_string()))?;
    let content: String = tokens.collect::<Vec<_>>().join(" ");

    let last_used = DateTime::parse_from_rfc3339(last_used)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| FormatError::InvalidTimestamp(last_used.to_string()))?;
    let uses: u32 = uses
        .parse()
        .map_err(|_| FormatError::MalformedLine(line.to_string()))?;
    let (type_, algorithm, counter) = parse_type_field(type_field)?;

    Ok(Site {
        name: name.to_string(),
        type_,
        counter,
        algorithm,
        login_name: if login_name == EMPTY {
            None
        } else {
            Some(login_name.to_string())
        },
        login_generated: false,
        content: if type_.is_stateful() {
            if content.is_empty() || content == EMPTY {
                None
            } else {
                Some(
                    crate::bytes::base64_decode(&content)
                        .map_err(|e| FormatError::Base64(e.to_string()))?,
                )
            }
        } else if content.is_empty() || content == EMPTY {
            None
        } else {
            Some(content.into_bytes())
        },
        url: None,
        uses,
        last_used,
        questions: Vec::new(),
    })
}

/// Parse a full user profile from the flat format.
pub fn decode(bytes: &[u8], master_password: &str) -> Result<User, FormatError> {
    let text = std::str::from_utf8(bytes).map_err(|_| FormatError::UnknownFormat)?;
    if !text.starts_with(MAGIC) {
        return Err(FormatError::UnknownFormat);
    }
    let header = parse_header(text)?;

    let mut sites = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        sites.push(parse_site_line(line)?);
    }

    Ok(User {
        full_name: header.full_name,
        master_password: master_password.to_string(),
        key_id: header.key_id,
        default_type: header.default_type,
        algorithm: header.algorithm,
        redacted: header.redacted,
        last_used: header.date,
        sites,
    })
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Serialize a user profile to the flat format, honoring `redacted`.
pub fn encode(user: &User) -> Result<Vec<u8>, FormatError> {
    let mut out = String::new();
    out.push_str(MAGIC);
    out.push('\n');
    out.push_str("#     Export of site names and passwords in clear-text.\n");
    out.push_str("#\n");
    out.push_str(&format!("# Full Name: {}\n", user.full_name));
    out.push_str(&format!("# Key ID: {}\n", user.key_id));
    out.push_str(&format!("# Date: {}\n", format_timestamp(&Utc::now())));
    out.push_str(&format!("# Redacted: {}\n", user.redacted));
    out.push_str(&format!("# Algorithm: {}\n", user.algorithm));
    out.push_str(&format!("# Default Type: {}\n", user.default_type.long_name()));
    out.push_str("#\n");

    for site in &user.sites {
        let login_name = site.login_name.as_deref().unwrap_or(EMPTY);
        let content = if site.type_.is_stateful() {
            site.content
                .as_deref()
                .map(crate::bytes::base64_encode)
                .unwrap_or_else(|| EMPTY.to_string())
        } else if user.redacted {
            EMPTY.to_string()
        } else {
            site.content
                .as_deref()
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .unwrap_or_else(|| EMPTY.to_string())
        };
        out.push_str(&format!(
            "{}  {}  {}:{}:{}  {}  {}  {}\n",
            format_timestamp(&site.last_used),
            site.uses,
            site.type_.long_name(),
            site.algorithm.as_u32(),
            site.counter,
            login_name,
            site.name,
            content,
        ));
    }

    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlgorithmVersion;

    fn sample_user() -> User {
        let mut user = User::new("John Doe", "password", AlgorithmVersion::V3).unwrap();
        user.redacted = false;
        let mut site = Site::new("example.com", AlgorithmVersion::V3);
        site.type_ = ResultType::Template(crate::types::Template::Long);
        site.content = Some(b"Jejr5[RepuSosp".to_vec());
        user.sites.push(site);
        user
    }

    #[test]
    fn detects_flat_by_leading_hash() {
        assert!(detect(MAGIC.as_bytes()));
        assert!(!detect(b"{\"a\":1}"));
    }

    #[test]
    fn round_trips_one_site() {
        let user = sample_user();
        let bytes = encode(&user).unwrap();
        let decoded = decode(&bytes, "password").unwrap();
        assert_eq!(decoded.full_name, "John Doe");
        assert_eq!(decoded.sites.len(), 1);
        assert_eq!(decoded.sites[0].name, "example.com");
        assert_eq!(
            decoded.sites[0].content.as_deref(),
            Some(&b"Jejr5[RepuSosp"[..])
        );
    }

    #[test]
    fn v0_dialect_without_algorithm_line_assumes_v0() {
        let text = format!(
            "{}\n# Full Name: Jane Doe\n# Key ID: deadbeef\n# Date: 2020-01-01T00:00:00Z\n#\n",
            MAGIC
        );
        let info = read_info(text.as_bytes()).unwrap();
        assert_eq!(info.algorithm, AlgorithmVersion::V0);
    }

    #[test]
    fn redacted_omits_template_content() {
        let mut user = sample_user();
        user.redacted = true;
        let bytes = encode(&user).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("Jejr5"));
    }
}
