use std::collections::BTreeMap;
use std::fs;

use ratatui::style::Color;
use serde::Deserialize;
use tracing::warn;

use devtype::config::Config;

/// Colours for everything the practice and result screens draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeColors {
    pub surface: Color,
    pub ink: Color,
    pub frame: Color,
    pub banner_bg: Color,
    pub banner_fg: Color,
    pub accent: Color,
    pub muted: Color,
    /// Already-typed units.
    pub unit_correct: Color,
    pub unit_error: Color,
    pub unit_error_bg: Color,
    pub cursor_fg: Color,
    pub cursor_bg: Color,
    /// Keyboard diagram highlights.
    pub guide_key: Color,
    pub pressed_key: Color,
    pub modifier_held: Color,
    /// Accuracy bands.
    pub good: Color,
    pub fair: Color,
    pub poor: Color,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            surface: Color::Rgb(0x1b, 0x1a, 0x24),
            ink: Color::Rgb(0xe6, 0xe1, 0xd3),
            frame: Color::Rgb(0x4a, 0x46, 0x5c),
            banner_bg: Color::Rgb(0x2c, 0x28, 0x3d),
            banner_fg: Color::Rgb(0xf2, 0xc1, 0x6b),
            accent: Color::Rgb(0xf2, 0xc1, 0x6b),
            muted: Color::Rgb(0x86, 0x82, 0x96),
            unit_correct: Color::Rgb(0x8f, 0xc9, 0x8a),
            unit_error: Color::Rgb(0xee, 0x7d, 0x6e),
            unit_error_bg: Color::Rgb(0x4a, 0x24, 0x2a),
            cursor_fg: Color::Rgb(0x1b, 0x1a, 0x24),
            cursor_bg: Color::Rgb(0xe6, 0xe1, 0xd3),
            guide_key: Color::Rgb(0xf2, 0xc1, 0x6b),
            pressed_key: Color::Rgb(0x7a, 0xb8, 0xe8),
            modifier_held: Color::Rgb(0xb4, 0x8e, 0xd8),
            good: Color::Rgb(0x8f, 0xc9, 0x8a),
            fair: Color::Rgb(0xe8, 0xb0, 0x5a),
            poor: Color::Rgb(0xee, 0x7d, 0x6e),
        }
    }
}

/// `#rrggbb` only.
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

impl ThemeColors {
    fn slot(&mut self, name: &str) -> Option<&mut Color> {
        let slot = match name {
            "surface" => &mut self.surface,
            "ink" => &mut self.ink,
            "frame" => &mut self.frame,
            "banner_bg" => &mut self.banner_bg,
            "banner_fg" => &mut self.banner_fg,
            "accent" => &mut self.accent,
            "muted" => &mut self.muted,
            "unit_correct" => &mut self.unit_correct,
            "unit_error" => &mut self.unit_error,
            "unit_error_bg" => &mut self.unit_error_bg,
            "cursor_fg" => &mut self.cursor_fg,
            "cursor_bg" => &mut self.cursor_bg,
            "guide_key" => &mut self.guide_key,
            "pressed_key" => &mut self.pressed_key,
            "modifier_held" => &mut self.modifier_held,
            "good" => &mut self.good,
            "fair" => &mut self.fair,
            "poor" => &mut self.poor,
            _ => return None,
        };
        Some(slot)
    }

    /// Overlay `name = "#rrggbb"` entries on top of the defaults. Unknown
    /// names and malformed colours are skipped with a warning.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut colors = Self::default();
        for (name, value) in overrides {
            let Some(color) = parse_hex(value) else {
                warn!("theme colour '{name}' has invalid value '{value}'");
                continue;
            };
            match colors.slot(name) {
                Some(slot) => *slot = color,
                None => warn!("unknown theme colour '{name}'"),
            }
        }
        colors
    }
}

#[derive(Deserialize)]
struct ThemeFile {
    name: String,
    #[serde(default)]
    colors: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        }
    }
}

impl Theme {
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        let file: ThemeFile = toml::from_str(source)?;
        Ok(Self {
            name: file.name,
            colors: ThemeColors::with_overrides(&file.colors),
        })
    }

    /// `default` is built in; anything else is read from
    /// `<config_dir>/devtype/themes/<name>.toml`.
    pub fn load(name: &str) -> Option<Self> {
        if name == "default" {
            return Some(Self::default());
        }
        let path = Config::config_dir().join("themes").join(format!("{name}.toml"));
        let content = fs::read_to_string(&path).ok()?;
        match Self::from_toml(&content) {
            Ok(theme) => Some(theme),
            Err(e) => {
                warn!("invalid theme {}: {e}", path.display());
                None
            }
        }
    }
}
