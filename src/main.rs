use anyhow::Context;
use clap::Parser;
use magpie_digitize::{
    generate_dst_from_manifest, Collaborators, DigitizeConfig, DigitizeRequest,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "magpie-digitize", version, about)]
struct Cli {
    /// Region manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Output machine file.
    #[arg(long)]
    dst: PathBuf,

    /// Output stitch-path SVG.
    #[arg(long)]
    preview_svg: PathBuf,

    /// Output direction summary JSON.
    #[arg(long)]
    direction_json: PathBuf,

    /// Output direction map PNG, written only when a raster backend is built in.
    #[arg(long)]
    direction_png: Option<PathBuf>,

    /// Provenance hash echoed into the metrics.
    #[arg(long)]
    canonical_hash: String,

    /// JSON file overriding individual digitizer settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("magpie_digitize=info"),
        )
        .init();
    } else {
        env_logger::init();
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<DigitizeConfig> {
    let Some(path) = path else {
        return Ok(DigitizeConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("open config '{}'", path.display()))?;
    let config: DigitizeConfig =
        serde_json::from_str(&raw).with_context(|| "parse config JSON")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let request = DigitizeRequest {
        config: read_config(cli.config.as_deref())?,
        manifest: cli.manifest,
        dst: cli.dst,
        preview_svg: cli.preview_svg,
        direction_json: cli.direction_json,
        direction_png: cli.direction_png,
        canonical_hash: cli.canonical_hash,
    };

    let report = generate_dst_from_manifest(&request, &Collaborators::default())
        .with_context(|| format!("digitize '{}'", request.manifest.display()))?;
    println!(
        "{}",
        serde_json::to_string(&report).context("serialize metrics")?
    );
    Ok(())
}
