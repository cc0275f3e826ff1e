//! Site configuration module.
//!
//! Handles loading and validating `config.toml` from the content root.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Docs"             # Site label shown on OG cards
//! default_locale = "en"     # Locale the root redirect points at
//!
//! [colors]
//! background = "#0c0c0c"    # Card and page background
//! accent = "#ff96ff"        # Gradient and site-label color
//! title = "#ffffff"         # Card title color
//! description = "#f0f0f0cc" # Card description color (RGBA hex)
//!
//! [fonts]
//! # Paths resolved relative to the content root
//! primary = "assets/fonts/BrandSans-Variable.woff"
//! fallback = "assets/fonts/NotoSans-Regular.ttf"
//! ```
//!
//! Config files are sparse — override just the values you want. Unknown
//! keys are rejected to catch typos early.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteMeta,
    pub colors: ColorConfig,
    pub fonts: FontConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteMeta::default(),
            colors: ColorConfig::default(),
            fonts: FontConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    /// Site label shown in the header and on OG cards.
    pub name: String,
    /// Locale the root redirect points at.
    pub default_locale: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            name: "Docs".to_string(),
            default_locale: "en".to_string(),
        }
    }
}

/// Colors as `#rrggbb` or `#rrggbbaa` hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub background: String,
    pub accent: String,
    pub title: String,
    pub description: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: "#0c0c0c".to_string(),
            accent: "#ff96ff".to_string(),
            title: "#ffffff".to_string(),
            description: "#f0f0f0cc".to_string(),
        }
    }
}

/// Font file paths, resolved relative to the content root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// The branded (possibly variable, possibly WOFF-packed) primary font.
    pub primary: String,
    /// Known-good fallback used when the primary fails trial rendering.
    pub fallback: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            primary: "assets/fonts/BrandSans-Variable.woff".to_string(),
            fallback: "assets/fonts/NotoSans-Regular.ttf".to_string(),
        }
    }
}

impl FontConfig {
    pub fn primary_path(&self, root: &Path) -> PathBuf {
        root.join(&self.primary)
    }

    pub fn fallback_path(&self, root: &Path) -> PathBuf {
        root.join(&self.fallback)
    }
}

/// Load config from `<root>/config.toml`, or defaults if it doesn't exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }

    let content = fs::read_to_string(&config_path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &SiteConfig) -> Result<(), ConfigError> {
    for (field, value) in [
        ("colors.background", &config.colors.background),
        ("colors.accent", &config.colors.accent),
        ("colors.title", &config.colors.title),
        ("colors.description", &config.colors.description),
    ] {
        parse_color(value)
            .ok_or_else(|| ConfigError::Validation(format!("{field}: invalid color {value:?}")))?;
    }
    if config.site.default_locale.is_empty() {
        return Err(ConfigError::Validation(
            "site.default_locale must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Parse `#rrggbb` or `#rrggbbaa` into RGBA.
pub fn parse_color(hex: &str) -> Option<Rgba<u8>> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 && digits.len() != 8 {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    let alpha = if digits.len() == 8 { byte(6)? } else { 0xff };
    Some(Rgba([byte(0)?, byte(2)?, byte(4)?, alpha]))
}

impl ColorConfig {
    /// Resolved card style. Validation guarantees the hex parses, but the
    /// defaults stand in anyway for configs that skipped `load_config`.
    pub fn card_style(&self) -> crate::og::CardStyle {
        let fallback = crate::og::CardStyle::default();
        crate::og::CardStyle {
            background: parse_color(&self.background).unwrap_or(fallback.background),
            accent: parse_color(&self.accent).unwrap_or(fallback.accent),
            title: parse_color(&self.title).unwrap_or(fallback.title),
            description: parse_color(&self.description).unwrap_or(fallback.description),
        }
    }
}

/// Returns a fully-documented stock config.toml for `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# docsmith configuration
# All options are optional - defaults shown below.

[site]
# Site label shown in the header and on Open Graph cards
name = "Docs"
# Locale the root redirect points at (content/<locale>/ must exist)
default_locale = "en"

[colors]
# Card and page background
background = "#0c0c0c"
# Gradient and site-label color
accent = "#ff96ff"
# Card title color
title = "#ffffff"
# Card description color (RGBA hex - trailing byte is opacity)
description = "#f0f0f0cc"

[fonts]
# Paths resolved relative to the content root.
# The primary may be a variable font or a WOFF container; if it cannot be
# made renderable it is replaced by the fallback at build time.
primary = "assets/fonts/BrandSans-Variable.woff"
fallback = "assets/fonts/NotoSans-Regular.ttf"
"##
}
