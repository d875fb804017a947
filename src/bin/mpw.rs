//! The `mpw` command-line adapter.
//!
//! Everything algorithmic lives in the `mpw` library; this binary only
//! gathers inputs (flags, environment, prompts), loads/stores the
//! profile file under `$HOME/.mpw.d/`, and prints the result.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use mpw::cli::Cli;
use mpw::error::Error;
use mpw::marshal::{self, User};
use mpw::types::{AlgorithmVersion, Counter, Format, Purpose, ResultType};

fn init_logging(verbosity: i32) {
    let level = match verbosity {
        i32::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn profile_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".mpw.d"))
}

fn profile_path(full_name: &str, format: Format) -> Option<PathBuf> {
    profile_dir().map(|dir| dir.join(format!("{}.{}", full_name, format.extension())))
}

/// Find whichever on-disk profile (flat or JSON) exists for `full_name`.
fn find_existing_profile(full_name: &str) -> Option<(PathBuf, Vec<u8>)> {
    for format in [Format::Json, Format::Flat] {
        if let Some(path) = profile_path(full_name, format) {
            if let Ok(bytes) = std::fs::read(&path) {
                return Some((path, bytes));
            }
        }
    }
    None
}

fn prompt_line(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    let env_full_name = std::env::var("MP_FULLNAME").ok();
    let env_algorithm = std::env::var("MP_ALGORITHM")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .and_then(AlgorithmVersion::from_u32);
    let env_format = std::env::var("MP_FORMAT").ok().and_then(|s| Format::from_name(&s));

    let full_name = cli
        .full_name()
        .map(str::to_string)
        .or(env_full_name)
        .ok_or(())
        .or_else(|_| prompt_line("Your full name"))
        .map_err(|_: io::Error| Error::MissingInput("full name".into()))?;
    if full_name.is_empty() {
        return Err(Error::MissingInput("full name".into()));
    }

    let site_name = cli
        .site_name
        .clone()
        .ok_or_else(|| Error::MissingInput("site name".into()))?;

    let existing = find_existing_profile(&full_name);

    let master_password = cli
        .master_password
        .clone()
        .ok_or(())
        .or_else(|_| rpassword::prompt_password("Master password: "))
        .map_err(|_: io::Error| Error::MissingInput("master password".into()))?;

    let read_format = existing.as_ref().map(|(path, _)| {
        if path.to_string_lossy().ends_with(".json") {
            Format::Json
        } else {
            Format::Flat
        }
    });

    let mut user = match existing {
        Some((_, bytes)) => match marshal::read(&bytes, &master_password) {
            Ok(user) => user,
            Err(Error::MasterPassword) if cli.allow_master_password_change() => {
                warn!("master password did not match stored profile; re-keying under the new one");
                let info = marshal::read_info(&bytes)?;
                User::new(
                    &full_name,
                    &master_password,
                    cli.resolved_algorithm(env_algorithm).unwrap_or(info.algorithm),
                )?
            }
            Err(e) => return Err(e),
        },
        None => {
            let algorithm = cli
                .resolved_algorithm(env_algorithm)
                .unwrap_or(AlgorithmVersion::DEFAULT);
            User::new(&full_name, &master_password, algorithm)?
        }
    };

    if let Some(redacted) = cli.redacted {
        user.redacted = redacted != 0;
    }

    let purpose = cli.resolved_purpose().unwrap_or(Purpose::Authentication);
    let counter = Counter(cli.counter.unwrap_or(1));
    let result_type = cli.resolved_type().unwrap_or(user.default_type);

    let master_key = user.master_key()?;
    let identicon = mpw::identicon::identicon(&user.full_name, &user.master_password);
    eprintln!(
        "\x1b[{}m{}\x1b[0m",
        identicon.color.ansi_code(),
        identicon.glyphs
    );

    let result = match result_type {
        ResultType::Template(template) => {
            let key = mpw::algorithm::site_key(
                &master_key,
                &site_name,
                counter,
                purpose,
                cli.context.as_deref(),
                user.algorithm,
            )?;
            mpw::algorithm::render_template(&key, template, user.algorithm)
        }
        ResultType::Key => {
            let bits: u32 = cli
                .param
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256);
            mpw::algorithm::derive_key(
                &master_key,
                &site_name,
                counter,
                cli.context.as_deref(),
                user.algorithm,
                bits,
            )?
        }
        ResultType::Personal | ResultType::Device => {
            let site = user.site_or_insert(&site_name);
            site.type_ = result_type;
            site.counter = counter;
            match &cli.param {
                Some(param) => {
                    site.content = Some(site.encrypt_content(&master_key, param.as_bytes())?);
                    param.clone()
                }
                None => match site.decrypt_content(&master_key)? {
                    Some(plaintext) => String::from_utf8_lossy(&plaintext).into_owned(),
                    None => return Err(Error::MissingInput("stored secret (-P)".into())),
                },
            }
        }
    };

    println!("{result}");

    let now = chrono::Utc::now();
    {
        let site = user.site_or_insert(&site_name);
        site.type_ = result_type;
        site.counter = counter;
        site.touch(now);
    }
    user.last_used = now;

    let format = marshal::select_write_format(
        cli.resolved_format().or(env_format),
        read_format,
    );
    let bytes = marshal::write(&user, format)?;
    if let Some(dir) = profile_dir() {
        std::fs::create_dir_all(&dir)?;
        let path = profile_path(&user.full_name, format).expect("dir resolved above");
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), "wrote profile");
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mpw: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
