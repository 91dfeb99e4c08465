use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "json-pattern",
    version,
    about = "Match JSON documents against structural patterns"
)]
pub struct Args {
    /// JSON files to check (reads a single document from stdin when none given)
    pub paths: Vec<PathBuf>,

    /// Pattern text
    #[arg(short, long, value_name = "PATTERN", conflicts_with = "pattern_file")]
    pub pattern: Option<String>,

    /// Read the pattern from a file
    #[arg(long, value_name = "FILE")]
    pub pattern_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json", "quiet"])]
    pub format: String,

    /// List registered validator names, one per line, then exit
    #[arg(long)]
    pub list_validators: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}
