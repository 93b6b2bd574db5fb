use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "textbook-extract",
    version,
    about = "Local textbook chapter topic and question extraction tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Extract(ExtractArgs),
    Status(StatusArgs),
    Verify(VerifyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = ".cache/textbook-extract")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "ocr_cache")]
    pub transcripts_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, default_value = ".cache/textbook-extract")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "ocr_cache")]
    pub transcripts_dir: PathBuf,

    #[arg(long, default_value = "heading_reference.json")]
    pub reference_path: PathBuf,

    #[arg(long)]
    pub inventory_manifest_path: Option<PathBuf>,

    #[arg(long)]
    pub extract_manifest_path: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub refresh_inventory: bool,

    #[arg(long = "target-chapter")]
    pub target_chapters: Vec<String>,

    #[arg(long, default_value_t = 0.8)]
    pub body_fraction: f64,

    #[arg(long, default_value = "EXERCISES")]
    pub exercises_marker: String,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/textbook-extract")]
    pub cache_root: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    #[arg(long, default_value = ".cache/textbook-extract")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "heading_reference.json")]
    pub reference_path: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}
