//! Replay scripts.
//!
//! A script is a JSON array of steps. Each step is either a raw host event
//! (`{"type": "next_page"}`) or a file pick (`{"pick_image": "seal.png"}`),
//! which reads the image and places it as a stamp on the current page.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use stamp_core::HostEvent;

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    /// Read an image file and pick it as a stamp.
    PickImage {
        /// Image path, relative to the script's directory.
        pick_image: PathBuf,
    },
    /// Feed a host event as-is.
    Event(HostEvent),
}

/// A parsed replay script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    /// Create a script from steps.
    #[must_use]
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps }
    }

    /// Parse a script from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid script.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Invalid replay script")
    }

    /// Read a script file, resolving image paths against its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let mut script = Self::from_json(&json)?;
        if let Some(base) = path.parent() {
            script.resolve_paths(base);
        }
        Ok(script)
    }

    /// Make relative image paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for step in &mut self.steps {
            if let ScriptStep::PickImage { pick_image } = step {
                if pick_image.is_relative() {
                    *pick_image = base.join(&*pick_image);
                }
            }
        }
    }

    /// The steps in order.
    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the script has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
