use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pdfshrink",
    version,
    about = "Shrink PDF files with Ghostscript quality presets",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Relative or absolute path of the input PDF file
    #[arg(required = true)]
    pub input: Option<PathBuf>,

    /// Output PDF path (default: replace the input in place)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Keep a copy of the original as <name>_BACKUP.pdf before replacing it
    #[arg(short, long)]
    pub backup: bool,

    /// Open the PDF after compression
    #[arg(long)]
    pub open: bool,

    /// Compression level: 0 default, 1 screen, 2 ebook, 3 printer, 4 prepress
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=4))]
    pub compression: Option<u8>,

    /// Kill the engine after this many seconds (0 = never)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved engine and current config
    Info,

    /// Generate a default .pdfshrink.toml config file
    Init {
        /// Generate in ~/.config/pdfshrink/ instead of current directory
        #[arg(long)]
        global: bool,
    },
}
