use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use clap::Parser;
use jkskit::builder::{EntryOrder, KeystoreBuilder, KeystoreOptions};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jkskit",
    version,
    about = "Build a JKS keystore from PEM certificates and private keys"
)]
struct Cli {
    /// Certificate and key under an alias (alias:cert.pem:key.pem)
    #[arg(short = 'e', long = "entry", value_name = "ENTRY", required = true)]
    entries: Vec<EntryArg>,

    /// Intermediate CA certificate for an alias (alias:ca.pem), repeat in chain order
    #[arg(short = 'i', long = "intermediate", value_name = "CA")]
    intermediates: Vec<IntermediateArg>,

    /// Keystore password
    #[arg(short = 'p', long = "password")]
    password: Option<String>,

    /// File containing the keystore password
    #[arg(long = "password-file")]
    password_file: Option<PathBuf>,

    /// Output file path
    #[arg(short = 'o', long = "output", default_value = "keystore.jks")]
    output: PathBuf,

    /// Print the keystore base64-encoded to stdout instead of writing a file
    #[arg(long = "base64")]
    base64: bool,

    /// Write entries sorted by alias instead of in command-line order
    #[arg(long = "sort-aliases")]
    sort_aliases: bool,
}

#[derive(Clone, Debug)]
struct EntryArg {
    alias: String,
    cert: PathBuf,
    key: PathBuf,
}

impl FromStr for EntryArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(alias), Some(cert), Some(key)) if !cert.is_empty() && !key.is_empty() => Ok(Self {
                alias: alias.to_string(),
                cert: cert.into(),
                key: key.into(),
            }),
            _ => Err(format!("expected alias:cert.pem:key.pem, got '{s}'")),
        }
    }
}

#[derive(Clone, Debug)]
struct IntermediateArg {
    alias: String,
    cert: PathBuf,
}

impl FromStr for IntermediateArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((alias, cert)) if !cert.is_empty() => Ok(Self {
                alias: alias.to_string(),
                cert: cert.into(),
            }),
            _ => Err(format!("expected alias:ca.pem, got '{s}'")),
        }
    }
}

fn resolve_password(cli: &Cli) -> Result<String> {
    if let Some(pw) = &cli.password {
        return Ok(pw.clone());
    }
    if let Some(path) = &cli.password_file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read password file '{}'", path.display()))?;
        return Ok(content.trim_end_matches(['\r', '\n']).to_string());
    }
    if let Ok(pw) = std::env::var("KEYSTORE_PASSWORD") {
        return Ok(pw);
    }
    bail!("no password provided: use --password, --password-file, or KEYSTORE_PASSWORD env")
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn run(cli: Cli) -> Result<()> {
    let password = resolve_password(&cli)?;

    for ca in &cli.intermediates {
        if !cli.entries.iter().any(|entry| entry.alias == ca.alias) {
            bail!(
                "intermediate certificate '{}' names unknown alias '{}'",
                ca.cert.display(),
                ca.alias
            );
        }
    }

    let entry_order = if cli.sort_aliases {
        EntryOrder::Alphabetical
    } else {
        EntryOrder::Insertion
    };
    let mut builder = KeystoreBuilder::with_options(
        KeystoreOptions::builder().entry_order(entry_order).build(),
    );
    builder.set_password(password);

    for entry in &cli.entries {
        let ca_certs = cli
            .intermediates
            .iter()
            .filter(|ca| ca.alias == entry.alias)
            .map(|ca| read_pem(&ca.cert))
            .collect::<Result<Vec<_>>>()?;
        debug!(alias = %entry.alias, intermediates = ca_certs.len(), "adding key pair");
        builder.add_cert(
            entry.alias.as_str(),
            read_pem(&entry.cert)?,
            read_pem(&entry.key)?,
            ca_certs,
        );
    }

    let jks = builder.build().context("error creating JKS keystore")?;

    if cli.base64 {
        println!("{}", STANDARD.encode(&jks));
    } else {
        fs::write(&cli.output, &jks)
            .with_context(|| format!("failed to write '{}'", cli.output.display()))?;
        info!(
            path = %cli.output.display(),
            bytes = jks.len(),
            entries = builder.len(),
            "wrote keystore"
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
