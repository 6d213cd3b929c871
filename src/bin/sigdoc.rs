//! Load a JSON-encoded typed signature and print its documentation model.

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use sigdoc::types::typedtree::Signature;
use sigdoc::{CmiReader, LoadContext, LoaderConfig, PlainDocParser, read_interface};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sigdoc")]
#[command(version)]
#[command(about = "Build the documentation model of a typed signature", long_about = None)]
struct Cli {
    /// JSON file holding the typed signature tree
    input: PathBuf,

    /// Name of the compilation root (package or library)
    #[arg(long)]
    root: String,

    /// Name of the compilation unit
    #[arg(long)]
    unit: String,

    /// JSON file with loader configuration
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn read_config(path: Option<&Path>) -> Result<LoaderConfig> {
    let Some(path) = path else {
        return Ok(LoaderConfig::default());
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("Could not read config {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid config {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let config = read_config(cli.config.as_deref())?;
    let contents = fs::read_to_string(&cli.input)
        .with_context(|| format!("Could not read {}", cli.input.display()))?;
    let signature: Signature = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid signature {}", cli.input.display()))?;

    let cx = LoadContext::new(&config, &PlainDocParser, &CmiReader);
    let interface = read_interface(&cx, &cli.root, &cli.unit, &signature)
        .with_context(|| format!("Failed to load {}", cli.unit))?;
    log::debug!("Loaded {} top-level items", interface.items.len());

    println!("{:#?}", interface);
    Ok(())
}
