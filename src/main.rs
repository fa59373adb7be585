use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use songprint::{discover, Library, LibrarySource, SongprintConfig};
use tracing_subscriber::EnvFilter;

/// Build a song database and identify short recordings against it.
#[derive(Parser)]
#[command(name = "songprint", version)]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the persisted index and catalog.
    #[arg(long, global = true)]
    database_dir: Option<PathBuf>,

    /// Directory of reference WAV files.
    #[arg(long, global = true)]
    references: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fingerprint every reference recording and save the database.
    Build {
        /// Reference directory; overrides `--references` and the config file.
        dir: Option<PathBuf>,
    },
    /// Identify WAV clips. Directories are expanded to the WAV files they contain.
    Identify {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print every ranked hit instead of the best one.
        #[arg(long)]
        all: bool,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> Result<SongprintConfig> {
    let mut cfg = match &cli.config {
        Some(path) => SongprintConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SongprintConfig::default(),
    };
    if let Some(dir) = &cli.database_dir {
        cfg.paths.database_dir = dir.clone();
    }
    if let Some(dir) = &cli.references {
        cfg.paths.references_dir = dir.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn report_build(source: &LibrarySource) {
    if let LibrarySource::Built { report, unreadable } = source {
        eprintln!(
            "indexed {} songs ({} distinct hashes, {} entries)",
            report.songs, report.distinct_hashes, report.entries
        );
        for skipped in &report.skipped {
            eprintln!("skipped {}: {}", skipped.path, skipped.reason);
        }
        for err in unreadable {
            eprintln!("skipped {err}");
        }
    }
}

fn expand_clips(paths: &[PathBuf], cfg: &SongprintConfig) -> Result<Vec<PathBuf>> {
    let mut clips = Vec::new();
    for path in paths {
        if path.is_dir() {
            clips.extend(discover(path, &cfg.ingest)?);
        } else {
            clips.push(path.clone());
        }
    }
    Ok(clips)
}

fn identify(library: &Library, clip: &Path, cfg: &SongprintConfig, all: bool) -> Result<()> {
    let hits = library
        .identify_file(clip, &cfg.ingest)
        .with_context(|| format!("identifying {}", clip.display()))?;
    match hits.first() {
        None => println!("{}\tno match", clip.display()),
        Some(best) if !all => println!("{}\t{}", clip.display(), best.name),
        Some(_) => {
            for hit in &hits {
                println!(
                    "{}\t{}\tscore={}\toffset={:.1}s",
                    clip.display(),
                    hit.name,
                    hit.score,
                    hit.offset_seconds
                );
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    let cfg = load_config(&cli)?;

    match &cli.command {
        Command::Build { dir } => {
            let dir = dir.clone().unwrap_or_else(|| cfg.paths.references_dir.clone());
            let (library, source) = Library::build_from_dir(&dir, &cfg)
                .with_context(|| format!("building database from {}", dir.display()))?;
            report_build(&source);
            let paths = cfg.artifact_paths();
            library.save(&paths, &cfg.index.to_persist_config()?)?;
            eprintln!("saved {} and {}", paths.index.display(), paths.catalog.display());
        }
        Command::Identify { paths, all } => {
            let (library, source) = Library::load_or_build(&cfg)?;
            report_build(&source);
            for clip in expand_clips(paths, &cfg)? {
                if let Err(err) = identify(&library, &clip, &cfg, *all) {
                    eprintln!("{err:#}");
                }
            }
        }
    }
    Ok(())
}
