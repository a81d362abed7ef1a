use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use rand::rngs::SmallRng;
use rust_embed::Embed;
use tracing::debug;

#[derive(Embed)]
#[folder = "assets/texts/"]
struct TextAssets;

/// Where practice passages come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextSource {
    Bundled,
    File(std::path::PathBuf),
}

impl TextSource {
    /// `"bundled"` (or empty) selects the embedded passages; anything else
    /// is a file path.
    pub fn from_setting(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("bundled") {
            TextSource::Bundled
        } else {
            TextSource::File(value.into())
        }
    }
}

/// One passage per non-blank line.
pub fn split_passages(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn bundled_passages() -> Vec<String> {
    let mut names: Vec<String> = TextAssets::iter().map(|n| n.to_string()).collect();
    names.sort();
    names
        .iter()
        .filter_map(|name| TextAssets::get(name))
        .filter_map(|file| String::from_utf8(file.data.into_owned()).ok())
        .flat_map(|content| split_passages(&content))
        .collect()
}

pub fn file_passages(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading practice text {}", path.display()))?;
    Ok(split_passages(&content))
}

pub struct PassageSource {
    passages: Vec<String>,
    rng: SmallRng,
    last: Option<usize>,
}

impl PassageSource {
    pub fn new(passages: Vec<String>, rng: SmallRng) -> Self {
        Self {
            passages,
            rng,
            last: None,
        }
    }

    /// Falls back to the bundled passages when the file has none.
    pub fn load(source: &TextSource, rng: SmallRng) -> Result<Self> {
        let passages = match source {
            TextSource::Bundled => bundled_passages(),
            TextSource::File(path) => {
                let passages = file_passages(path)?;
                if passages.is_empty() {
                    debug!("{} has no passages, using bundled texts", path.display());
                    bundled_passages()
                } else {
                    passages
                }
            }
        };
        debug!("loaded {} practice passages", passages.len());
        Ok(Self::new(passages, rng))
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Random passage, avoiding an immediate repeat when there is a choice.
    pub fn next_passage(&mut self) -> Option<&str> {
        if self.passages.is_empty() {
            return None;
        }
        let mut idx = self.rng.gen_range(0..self.passages.len());
        if self.passages.len() > 1 && Some(idx) == self.last {
            idx = (idx + 1) % self.passages.len();
        }
        self.last = Some(idx);
        Some(&self.passages[idx])
    }
}
