//! Command-line inspector for Aurora GFF files.
//!
//! Loads a file with `aurora-gff` and prints its header summary and the
//! field tree of the top-level struct, as indented text or JSON.
//!
//! # Example
//!
//! ```no_run
//! use aurora_gff_inspect::{InspectConfig, run};
//!
//! let config = InspectConfig::from_args();
//! print!("{}", run(&config)?);
//! # Ok::<(), anyhow::Error>(())
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod render;

pub use config::{InspectConfig, OutputFormat};
pub use render::{load, render_json, render_text};

/// Load the configured file and render it in the configured format
pub fn run(config: &InspectConfig) -> anyhow::Result<String> {
    let file = load(&config.file, config.expected_tag()?)?;
    tracing::debug!(file = ?file, "loaded");

    match config.format {
        OutputFormat::Text => render_text(&file, config.depth),
        OutputFormat::Json => {
            let doc = render_json(&file, config.depth)?;
            Ok(serde_json::to_string_pretty(&doc)? + "\n")
        }
    }
}
