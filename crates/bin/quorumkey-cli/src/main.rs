//! quorumkey CLI
//!
//! Splits a CA passphrase into custodian share files and brings it back
//! from a quorum of them.
//!
//! ## Usage
//!
//! ```bash
//! # Generate a passphrase for a new CA
//! quorumkey genpass --out ca.pass
//!
//! # Split it 3-of-5 into ./shares/rootca-{1..5}.share plus manifest.json
//! quorumkey split --passphrase-file ca.pass --out-dir shares --prefix rootca -q 3 -n 5
//!
//! # Recover from any three custodians
//! quorumkey reconstruct shares/rootca-1.share shares/rootca-4.share shares/rootca-5.share
//!
//! # Identify a share without revealing it
//! quorumkey fingerprint shares/rootca-2.share --short 16
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use quorumkey::config::{DEFAULT_QUORUM, DEFAULT_SHARE_COUNT};
use quorumkey::manifest::MANIFEST_FILE;
use quorumkey::{
    load_share, reconstruct_passphrase, save_shares, split_passphrase, Config, Engine, Manifest,
    Passphrase, ShareRecord,
};

#[derive(Parser)]
#[command(name = "quorumkey")]
#[command(about = "Threshold sharing of CA passphrases")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random passphrase
    Genpass {
        /// Write to this file (mode 0600) instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Split a passphrase into share files
    Split {
        /// File holding the base64 passphrase
        #[arg(short, long)]
        passphrase_file: PathBuf,

        /// Directory for share files and manifest
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Share file name prefix
        #[arg(long, default_value = "share")]
        prefix: String,

        /// Shares needed to reconstruct
        #[arg(short, long, default_value_t = DEFAULT_QUORUM)]
        quorum: usize,

        /// Shares to produce
        #[arg(short = 'n', long, default_value_t = DEFAULT_SHARE_COUNT)]
        shares: usize,

        /// Engine config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Reconstruct the passphrase from share files
    Reconstruct {
        /// Share files, at least a quorum
        #[arg(required = true)]
        shares: Vec<PathBuf>,

        /// Check shares against a split manifest first
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Print share fingerprints
    Fingerprint {
        /// Share files
        #[arg(required = true)]
        shares: Vec<PathBuf>,

        /// Print only the first N hex digits
        #[arg(short, long)]
        short: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("quorumkey={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Genpass { out } => genpass(out.as_deref()),
        Commands::Split {
            passphrase_file,
            out_dir,
            prefix,
            quorum,
            shares,
            config,
        } => split(
            &passphrase_file,
            &out_dir,
            &prefix,
            quorum,
            shares,
            config.as_deref(),
        ),
        Commands::Reconstruct { shares, manifest } => reconstruct(&shares, manifest.as_deref()),
        Commands::Fingerprint { shares, short } => fingerprint(&shares, short),
    }
}

fn genpass(out: Option<&Path>) -> Result<()> {
    let passphrase = Passphrase::generate(&mut OsRng);
    match out {
        Some(path) => {
            write_private(path, passphrase.as_str())?;
            info!(path = %path.display(), "passphrase written");
        }
        None => println!("{}", passphrase.as_str()),
    }
    Ok(())
}

fn split(
    passphrase_file: &Path,
    out_dir: &Path,
    prefix: &str,
    quorum: usize,
    share_count: usize,
    config: Option<&Path>,
) -> Result<()> {
    let config = match config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let engine = Engine::new(config)?;
    let params = engine.params(quorum, share_count)?;

    let text = Zeroizing::new(
        fs::read_to_string(passphrase_file)
            .with_context(|| format!("reading {}", passphrase_file.display()))?,
    );
    let passphrase = Passphrase::from_text(&text)?;

    let records = split_passphrase(&engine, &mut OsRng, &passphrase, params)
        .context("splitting passphrase")?;
    let paths = save_shares(out_dir, prefix, &records)?;

    let manifest = Manifest::new(params, &records)?;
    manifest.save(out_dir.join(MANIFEST_FILE))?;

    println!(
        "{}-of-{} split, {}-bit prime",
        params.quorum, params.share_count, manifest.prime_bits
    );
    for (path, fingerprint) in paths.iter().zip(&manifest.fingerprints) {
        println!("{}  {}", &fingerprint[..16], path.display());
    }
    Ok(())
}

fn reconstruct(paths: &[PathBuf], manifest: Option<&Path>) -> Result<()> {
    let records = load_all(paths)?;

    if let Some(path) = manifest {
        let manifest = Manifest::load(path)
            .with_context(|| format!("loading manifest {}", path.display()))?;
        for (record, path) in records.iter().zip(paths) {
            match manifest.check(record) {
                Some(position) => info!(position, path = %path.display(), "share matches manifest"),
                None => bail!("{} is not part of this split", path.display()),
            }
        }
        if records.len() < manifest.quorum {
            warn!(
                have = records.len(),
                need = manifest.quorum,
                "fewer shares than the quorum, result will be wrong"
            );
        }
    }

    let passphrase = reconstruct_passphrase(&Engine::default(), &records)
        .context("reconstructing passphrase")?;
    println!("{}", passphrase.as_str());
    Ok(())
}

fn fingerprint(paths: &[PathBuf], short: Option<usize>) -> Result<()> {
    for (record, path) in load_all(paths)?.iter().zip(paths) {
        let fingerprint = match short {
            Some(len) => record.fingerprint_prefix(len),
            None => record.fingerprint(),
        };
        println!("{}  {}", fingerprint, path.display());
    }
    Ok(())
}

fn load_all(paths: &[PathBuf]) -> Result<Vec<ShareRecord>> {
    paths
        .iter()
        .map(|path| load_share(path).with_context(|| format!("loading {}", path.display())))
        .collect()
}

fn write_private(path: &Path, text: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "{}", text)?;
    Ok(())
}
