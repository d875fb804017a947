//! Command-line surface.
//!
//! This module only defines the argument grammar and a thin layer that
//! resolves flags/environment/profile defaults into the inputs the
//! algorithm and marshaller need. It is explicitly non-core: terminal
//! prompting, file discovery under `$HOME`, and exit-code plumbing live
//! in the `mpw` binary, not in the library's derivation logic.

use clap::Parser;

use crate::types::{AlgorithmVersion, Format, Named, Purpose, ResultType};

/// A stateless password management solution.
#[derive(Parser, Debug)]
#[command(name = "mpw", about = "A stateless password management solution.")]
pub struct Cli {
    /// The full name of the user. Use `-U` instead to allow changing the
    /// master password associated with an existing profile.
    #[arg(short = 'u', long = "user", value_name = "NAME")]
    pub full_name: Option<String>,

    /// Like `-u`, but permits re-keying the profile under a new master
    /// secret after re-prompting with the old one.
    #[arg(short = 'U', long = "user-change", value_name = "NAME")]
    pub full_name_allow_change: Option<String>,

    /// The master secret, given inline. Insecure: only meant for testing.
    #[arg(short = 'M', long = "master-password", value_name = "SECRET")]
    pub master_password: Option<String>,

    /// The result template or type's short or long name.
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub type_: Option<String>,

    /// The result parameter: a stored secret value, or a `Derive` key
    /// size in bits.
    #[arg(short = 'P', long = "param", value_name = "PARAM")]
    pub param: Option<String>,

    /// The site counter.
    #[arg(short = 'c', long = "counter", value_name = "N")]
    pub counter: Option<u32>,

    /// The algorithm version, 0..3.
    #[arg(short = 'a', long = "algorithm", value_name = "VERSION")]
    pub algorithm: Option<u32>,

    /// The derivation purpose: `a` authentication, `i` identification,
    /// `r` recovery.
    #[arg(short = 'p', long = "purpose", value_name = "PURPOSE")]
    pub purpose: Option<String>,

    /// The purpose context, e.g. a recovery question.
    #[arg(short = 'C', long = "context", value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Migrate to this format on write, or read-and-write strictly this
    /// format if given as `-F`.
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<String>,

    /// Read and write strictly this format.
    #[arg(short = 'F', long = "format-fixed", value_name = "FORMAT")]
    pub format_fixed: Option<String>,

    /// Whether the written profile should be redacted (omit recoverable
    /// state): `0` or `1`.
    #[arg(short = 'R', long = "redacted", value_name = "0|1")]
    pub redacted: Option<u8>,

    /// Increase verbosity. Repeatable.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Decrease verbosity. Repeatable.
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// The site name to generate a credential for.
    pub site_name: Option<String>,
}

impl Cli {
    pub fn resolved_format(&self) -> Option<Format> {
        self.format_fixed
            .as_deref()
            .or(self.format.as_deref())
            .and_then(Format::from_name)
    }

    pub fn resolved_algorithm(&self, env_default: Option<AlgorithmVersion>) -> Option<AlgorithmVersion> {
        self.algorithm
            .and_then(AlgorithmVersion::from_u32)
            .or(env_default)
    }

    pub fn resolved_purpose(&self) -> Option<Purpose> {
        self.purpose.as_deref().and_then(Purpose::from_name)
    }

    pub fn resolved_type(&self) -> Option<ResultType> {
        self.type_.as_deref().and_then(ResultType::from_name)
    }

    /// Full name from whichever of `-u`/`-U` was given, preferring `-U`
    /// since it's the more specific override.
    pub fn full_name(&self) -> Option<&str> {
        self.full_name_allow_change
            .as_deref()
            .or(self.full_name.as_deref())
    }

    /// `-U` was used: the caller may re-key the profile.
    pub fn allow_master_password_change(&self) -> bool {
        self.full_name_allow_change.is_some()
    }

    /// Net verbosity: `-v` minus `-q`, clamped at zero.
    pub fn verbosity(&self) -> i32 {
        i32::from(self.verbose) - i32::from(self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let cli = Cli::parse_from(["mpw", "example.com"]);
        assert_eq!(cli.site_name.as_deref(), Some("example.com"));
        assert_eq!(cli.verbosity(), 0);
    }

    #[test]
    fn verbosity_nets_v_and_q() {
        let cli = Cli::parse_from(["mpw", "-v", "-v", "-q", "example.com"]);
        assert_eq!(cli.verbosity(), 1);
    }

    #[test]
    fn u_upper_allows_master_password_change() {
        let cli = Cli::parse_from(["mpw", "-U", "Jane Doe", "example.com"]);
        assert!(cli.allow_master_password_change());
        assert_eq!(cli.full_name(), Some("Jane Doe"));
    }
}
