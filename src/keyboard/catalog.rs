use std::fs;
use std::path::{Path, PathBuf};

use rust_embed::Embed;
use tracing::{debug, info, warn};

use crate::keyboard::layout::{KeyboardLayout, LayoutError};

pub const DEFAULT_LAYOUT_ID: &str = "remington-gail";

#[derive(Embed)]
#[folder = "assets/layouts/"]
struct LayoutAssets;

/// Ids of the layouts shipped with the binary, sorted.
pub fn bundled_ids() -> Vec<String> {
    let mut ids: Vec<String> = LayoutAssets::iter()
        .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
        .collect();
    ids.sort();
    ids
}

pub fn bundled_layout(id: &str) -> Result<KeyboardLayout, LayoutError> {
    let file = LayoutAssets::get(&format!("{id}.toml"))
        .ok_or_else(|| LayoutError::NotBundled(id.to_string()))?;
    let content = String::from_utf8_lossy(file.data.as_ref());
    KeyboardLayout::from_toml(&content)
}

/// Every bundled layout. A bundled file that fails validation is a build
/// defect and is reported rather than skipped.
pub fn bundled_layouts() -> Result<Vec<KeyboardLayout>, LayoutError> {
    bundled_ids().iter().map(|id| bundled_layout(id)).collect()
}

/// Default location for user-supplied layouts.
pub fn user_layout_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("devtype")
        .join("layouts")
}

/// Parse every `*.toml` in `dir`. Invalid files are logged and skipped so
/// a broken user layout never prevents startup.
pub fn user_layouts(dir: &Path) -> Vec<KeyboardLayout> {
    let Ok(entries) = fs::read_dir(dir) else {
        debug!("no user layout directory at {}", dir.display());
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut layouts = Vec::new();
    for path in paths {
        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| KeyboardLayout::from_toml(&content).map_err(|e| e.to_string()));
        match parsed {
            Ok(layout) => layouts.push(layout),
            Err(err) => warn!("skipping layout {}: {err}", path.display()),
        }
    }
    layouts
}

/// Bundled layouts followed by user layouts. A user layout whose id
/// matches a bundled one replaces it in place.
pub fn load_catalog(user_dir: Option<&Path>) -> Result<Vec<KeyboardLayout>, LayoutError> {
    let mut catalog = bundled_layouts()?;
    if let Some(dir) = user_dir {
        for layout in user_layouts(dir) {
            match catalog.iter_mut().find(|l| l.id() == layout.id()) {
                Some(existing) => {
                    info!("user layout '{}' overrides bundled layout", layout.id());
                    *existing = layout;
                }
                None => catalog.push(layout),
            }
        }
    }
    info!(
        "loaded {} layouts: {}",
        catalog.len(),
        catalog.iter().map(|l| l.id()).collect::<Vec<_>>().join(", ")
    );
    Ok(catalog)
}
