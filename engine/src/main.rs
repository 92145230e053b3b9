//! airgest-engine CLI — replay recorded landmark logs into actions.
//!
//! Part of the Airgest project: camera-free testing of the recognition
//! pipeline against newline-delimited JSON frame logs.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use airgest_engine::replay::{self, ProfileFile};
use airgest_engine::{EngineConfig, GestureTemplate, Pipeline, ProfileSet};

#[derive(Parser, Debug)]
#[command(name = "airgest-engine", about = "Hand-gesture recognition engine replay driver")]
struct Cli {
    /// Frame log to replay (newline-delimited JSON records); '-' for stdin
    #[arg(long, default_value = "-")]
    frames: String,

    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Profiles and context rules file (JSON)
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Recorded gesture templates file (JSON array)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Initial application-context tag
    #[arg(long, default_value = "default")]
    context: String,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("airgest-engine {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airgest_engine=info".into()),
        )
        .init();

    let config: EngineConfig = match &cli.config {
        Some(path) => load_json(path)?,
        None => EngineConfig::default(),
    };
    let mut pipeline = Pipeline::new(config).context("building pipeline")?;

    let ProfileFile { profiles, rules } = match &cli.profiles {
        Some(path) => load_json(path)?,
        None => ProfileFile {
            profiles: ProfileSet::with_default_bindings(),
            rules: Vec::new(),
        },
    };
    pipeline.set_profiles(profiles);
    pipeline.set_context(cli.context.clone());

    if let Some(path) = &cli.templates {
        let templates: Vec<GestureTemplate> = load_json(path)?;
        info!("loaded {} templates from {}", templates.len(), path.display());
        for template in templates {
            pipeline
                .insert_template(template)
                .context("loading templates")?;
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = if cli.frames == "-" {
        let stdin = io::stdin();
        replay::run(&mut pipeline, &rules, stdin.lock(), &mut out)?
    } else {
        let file = File::open(&cli.frames)
            .with_context(|| format!("opening frame log {}", cli.frames))?;
        replay::run(&mut pipeline, &rules, BufReader::new(file), &mut out)?
    };

    info!(
        "{} frames replayed, {} actions dispatched",
        summary.frames, summary.actions
    );
    Ok(())
}
