//! Inspector configuration.
//!
//! Configuration comes from CLI arguments, with environment variable
//! fallbacks (`AURORA_GFF_TAG`, `AURORA_GFF_FORMAT`, `AURORA_GFF_DEPTH`,
//! `AURORA_GFF_LOG_LEVEL`) and defaults.

use anyhow::{Result, bail};
use aurora_gff::ResourceType;
use clap::Parser;
use std::path::PathBuf;

/// Output format options
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented text tree
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Inspector configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gff-inspect",
    about = "Print the header and field tree of an Aurora GFF file",
    version
)]
pub struct InspectConfig {
    /// GFF file to inspect
    pub file: PathBuf,

    /// Expected four-character tag (defaults to the one implied by the
    /// file extension, else whatever the file declares)
    #[arg(long, env = "AURORA_GFF_TAG")]
    pub tag: Option<String>,

    /// Output format
    #[arg(
        short = 'o',
        long,
        value_enum,
        env = "AURORA_GFF_FORMAT",
        default_value = "text"
    )]
    pub format: OutputFormat,

    /// Maximum nesting depth of structs and lists to print
    #[arg(long, env = "AURORA_GFF_DEPTH", default_value_t = 8)]
    pub depth: usize,

    /// Log filter, e.g. `debug` or `aurora_gff=trace` (overrides RUST_LOG)
    #[arg(long, env = "AURORA_GFF_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl InspectConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Tag to check the header against, `None` to accept any.
    ///
    /// An explicit `--tag` is padded with spaces to four bytes.
    pub fn expected_tag(&self) -> Result<Option<[u8; 4]>> {
        if let Some(tag) = &self.tag {
            return parse_tag(tag).map(Some);
        }
        Ok(ResourceType::from_path(&self.file).map(ResourceType::tag))
    }
}

/// Four-character tag from user input
pub fn parse_tag(input: &str) -> Result<[u8; 4]> {
    if input.is_empty() || input.len() > 4 || !input.is_ascii() {
        bail!("tag must be 1 to 4 ASCII characters, got '{input}'");
    }
    let mut tag = [b' '; 4];
    tag[..input.len()].copy_from_slice(input.as_bytes());
    Ok(tag)
}
