//! # Saorsa Stamp CLI
//!
//! Headless host for the stamp editor. Replays a JSON script of host events
//! against a document, servicing page renders and bitmap decodes with the
//! stamp-renderer collaborators, and reports the final overlay.
//!
//! ## Usage
//!
//! ```bash
//! stamp --script session.json --pages 3 --pretty
//! stamp --script session.json --document scans/ --scale 1.5
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ReplayConfig` - Document shape and starting scale for a replay
//! - `Script` - Steps to feed the editor
//! - `RecordingHost` - Host surface that records overlay and indicator state

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod host;
mod replay;
mod script;

pub use host::{PresentedPage, RecordingHost};
pub use replay::{replay, ReplayReport, StepFailure};
pub use script::{Script, ScriptStep};

use std::path::PathBuf;

use clap::Parser;
use stamp_renderer::DEFAULT_PAGE_SIZE;

/// Command-line arguments for stamp.
#[derive(Debug, Clone, Parser)]
#[command(name = "stamp")]
#[command(about = "Replay stamp editor sessions headlessly")]
#[command(version)]
pub struct CliArgs {
    /// JSON script of steps to replay
    #[arg(long, env = "STAMP_SCRIPT")]
    pub script: PathBuf,

    /// Image file or directory of images to use as pages
    #[arg(long, env = "STAMP_DOCUMENT")]
    pub document: Option<PathBuf>,

    /// Number of blank pages when no document is given
    #[arg(long, default_value = "3")]
    pub pages: u32,

    /// Blank page width in document units
    #[arg(long, default_value = "595")]
    pub page_width: f64,

    /// Blank page height in document units
    #[arg(long, default_value = "842")]
    pub page_height: f64,

    /// Starting zoom scale
    #[arg(long, default_value = "1.0")]
    pub scale: f64,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

/// Replay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    /// Pages come from these images when set; otherwise blank pages.
    pub document: Option<PathBuf>,
    /// Blank page count.
    pub pages: u32,
    /// Blank page width at scale 1.
    pub page_width: f64,
    /// Blank page height at scale 1.
    pub page_height: f64,
    /// Starting scale.
    pub scale: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayConfig {
    /// Create a replay configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: None,
            pages: 3,
            page_width: DEFAULT_PAGE_SIZE.0,
            page_height: DEFAULT_PAGE_SIZE.1,
            scale: 1.0,
        }
    }
}

impl From<CliArgs> for ReplayConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            document: args.document,
            pages: args.pages,
            page_width: args.page_width,
            page_height: args.page_height,
            scale: args.scale,
        }
    }
}
