use anyhow::{anyhow, bail, Context, Result};
use bloom_core::{fnv1a_32, fnv1a_64, HashVariant};
use bloom_index::{ArrayStore, IndexConfig, Indexer};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "bloom", version, about = "Bloom-filter file index (shingled FNV-1a fingerprints)")]
struct Cli {
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Array cache directory [default: ~/.cache/bloom/db]
    #[arg(long, env = "BLOOM_DB", global = true)]
    db: Option<PathBuf>,

    /// JSON file with index settings; flags below override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Size in bytes of newly built file arrays
    #[arg(long, global = true)]
    array_bytes: Option<usize>,

    /// Window length; repeat or comma-separate for several
    #[arg(long = "sample-size", value_name = "W", global = true, value_delimiter = ',')]
    sample_sizes: Vec<usize>,

    #[arg(long, value_enum, global = true)]
    hash: Option<CliHash>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(ValueEnum, Clone, Copy)]
enum CliHash {
    #[value(name = "fnv1a32", alias = "fnv1a_32")]
    Fnv1a32,
    #[value(name = "fnv1a64", alias = "fnv1a_64")]
    Fnv1a64,
}

impl From<CliHash> for HashVariant {
    fn from(h: CliHash) -> Self {
        match h {
            CliHash::Fnv1a32 => HashVariant::Fnv1a32,
            CliHash::Fnv1a64 => HashVariant::Fnv1a64,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Index files without searching
    Index {
        /// File to process; read newline-separated paths from stdin if absent
        #[arg(long = "file", short = 'f')]
        files: Vec<PathBuf>,
    },

    /// Print files that may contain every expression
    Search {
        #[arg(long = "file", short = 'f')]
        files: Vec<PathBuf>,
        expressions: Vec<String>,
    },

    /// Print the FNV-1a digest of TEXT (decimal and hex)
    Hash { text: String },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn default_db() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| anyhow!("HOME is not set; pass --db"))?;
    Ok(Path::new(&home).join(".cache").join("bloom").join("db"))
}

fn load_config(cli: &Cli) -> Result<IndexConfig> {
    let mut cfg = match &cli.config {
        Some(p) => IndexConfig::load(p).with_context(|| format!("config {}", p.display()))?,
        None => IndexConfig::default(),
    };
    if let Some(n) = cli.array_bytes {
        cfg.array_bytes = n;
    }
    if !cli.sample_sizes.is_empty() {
        cfg.sample_sizes = cli.sample_sizes.clone();
    }
    if let Some(h) = cli.hash {
        cfg.variant = h.into();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn open_indexer(cli: &Cli) -> Result<Indexer> {
    let db = match &cli.db {
        Some(p) => p.clone(),
        None => default_db()?,
    };
    debug!("DB path: {}", db.display());
    let store = ArrayStore::open(&db).with_context(|| format!("open db {}", db.display()))?;
    Ok(Indexer::new(load_config(cli)?, store)?)
}

fn input_paths(files: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    if !files.is_empty() {
        return Ok(files);
    }
    let mut out = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if !line.is_empty() {
            out.push(PathBuf::from(line));
        }
    }
    Ok(out)
}

fn report_failures(failed: usize) -> Result<()> {
    if failed > 0 {
        bail!("{failed} file(s) could not be processed");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match &cli.cmd {
        Cmd::Hash { text } => {
            let variant: HashVariant = cli.hash.map(Into::into).unwrap_or_default();
            match variant {
                HashVariant::Fnv1a32 => {
                    let h = fnv1a_32(text.as_bytes());
                    println!("{h} {}", hex::encode(h.to_be_bytes()));
                }
                HashVariant::Fnv1a64 => {
                    let h = fnv1a_64(text.as_bytes());
                    println!("{h} {}", hex::encode(h.to_be_bytes()));
                }
            }
        }
        Cmd::Index { files } => {
            let indexer = open_indexer(&cli)?;
            let paths = input_paths(files.clone())?;
            let failed = paths
                .par_iter()
                .filter(|p| match indexer.index_file(p) {
                    Ok(_) => false,
                    Err(e) => {
                        eprintln!("index: {}: {e}", p.display());
                        true
                    }
                })
                .count();
            report_failures(failed)?;
        }
        Cmd::Search { files, expressions } => {
            if expressions.is_empty() {
                bail!("No expression provided");
            }
            let indexer = open_indexer(&cli)?;
            let paths = input_paths(files.clone())?;
            // Matches are printed as each file finishes, in completion order.
            let failed = paths
                .par_iter()
                .filter(|p| match indexer.match_file(p, expressions.as_slice()) {
                    Ok(true) => {
                        let mut out = std::io::stdout().lock();
                        let _ = writeln!(out, "{}", p.display()).and_then(|_| out.flush());
                        false
                    }
                    Ok(false) => false,
                    Err(e) => {
                        eprintln!("search: {}: {e}", p.display());
                        true
                    }
                })
                .count();
            report_failures(failed)?;
        }
    }
    Ok(())
}
