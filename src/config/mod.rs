// Configuration module

use serde::{Deserialize, Serialize};
use std::path::Path;

// Default values
fn default_format() -> String {
    "original".to_string()
}

fn default_quality() -> u8 {
    80
}

fn default_fit() -> String {
    "inside".to_string()
}

fn default_true() -> bool {
    true
}

fn default_flatten_background() -> String {
    "#ffffff".to_string()
}

fn default_position() -> String {
    "bottomRight".to_string()
}

fn default_opacity() -> f32 {
    0.5
}

fn default_margin() -> u32 {
    20
}

fn default_size_ratio() -> f32 {
    0.2
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_color() -> String {
    "#ffffff".to_string()
}

/// Static, process-wide run configuration, read once at startup and passed
/// down the call chain as an immutable value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Output format selector: "original" or an explicit format name
    #[serde(default = "default_format")]
    pub format: String,

    /// Quality 1-100, meaningful for lossy formats only
    #[serde(default = "default_quality")]
    pub quality: u8,

    #[serde(default)]
    pub resize: ResizeConfig,

    #[serde(default)]
    pub optimize: OptimizeConfig,

    #[serde(default)]
    pub watermark: WatermarkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: default_format(),
            quality: default_quality(),
            resize: ResizeConfig::default(),
            optimize: OptimizeConfig::default(),
            watermark: WatermarkConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Target box width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Target box height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Fit mode: cover | contain | fill | inside | outside
    #[serde(default = "default_fit")]
    pub fit: String,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            width: None,
            height: None,
            fit: default_fit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeConfig {
    /// Apply a mild unparameterized sharpen pass
    #[serde(default)]
    pub sharpen: bool,

    /// Strip source metadata on re-encode (default: strip)
    #[serde(default = "default_true")]
    pub remove_metadata: bool,

    /// Background color used when flattening alpha for JPEG output
    #[serde(default = "default_flatten_background")]
    pub flatten_background: String,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            sharpen: false,
            remove_metadata: true,
            flatten_background: default_flatten_background(),
        }
    }
}

/// Watermark configuration, shared read-only across all files in a run.
///
/// `kind` and `position` stay as free-form strings on purpose: an
/// unrecognized kind makes the compositor a no-op for the run and an
/// unrecognized position defaults to bottom-right, so neither can fail
/// config loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Watermark kind: "image" or "text"
    #[serde(default, rename = "type")]
    pub kind: String,

    /// One of nine anchor names (topLeft, top, ..., bottomRight) or center
    #[serde(default = "default_position")]
    pub position: String,

    /// Opacity 0.0-1.0 applied on top of the overlay's own alpha
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Margin from the anchored edges in pixels
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// Image kind: path to the overlay image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    /// Image kind: overlay width as a ratio of the base width
    #[serde(default = "default_size_ratio")]
    pub size_ratio: f32,

    /// Text kind: the string to render
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Text kind: font family name
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Text kind: font size in pixels; derived from base width when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,

    /// Text kind: fill color as hex string
    #[serde(default = "default_color")]
    pub color: String,

    /// Text kind: rotation angle in degrees about the anchor point
    #[serde(default)]
    pub rotation: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: String::new(),
            position: default_position(),
            opacity: default_opacity(),
            margin: default_margin(),
            image_path: None,
            size_ratio: default_size_ratio(),
            text: None,
            font_family: default_font_family(),
            font_size: None,
            color: default_color(),
            rotation: 0.0,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| format!("invalid configuration: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.format, "original");
        assert_eq!(config.quality, 80);
        assert!(!config.resize.enabled);
        assert!(!config.watermark.enabled);
        assert!(config.optimize.remove_metadata);
        assert!(!config.optimize.sharpen);
    }

    #[test]
    fn test_default_matches_empty_yaml() {
        let constructed = Config::default();
        let parsed = Config::from_yaml("{}").unwrap();
        assert_eq!(constructed.format, parsed.format);
        assert_eq!(constructed.quality, parsed.quality);
        assert_eq!(constructed.resize.fit, parsed.resize.fit);
        assert_eq!(constructed.watermark.position, parsed.watermark.position);
        assert_eq!(constructed.watermark.margin, parsed.watermark.margin);
        assert_eq!(
            constructed.optimize.flatten_background,
            parsed.optimize.flatten_background
        );
    }

    #[test]
    fn test_empty_yaml_yields_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.format, "original");
        assert_eq!(config.quality, 80);
        assert_eq!(config.resize.fit, "inside");
        assert_eq!(config.watermark.position, "bottomRight");
        assert_eq!(config.watermark.margin, 20);
        assert_eq!(config.optimize.flatten_background, "#ffffff");
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
format: webp
quality: 65
resize:
  enabled: true
  width: 1200
  fit: inside
optimize:
  sharpen: true
  remove_metadata: false
watermark:
  enabled: true
  type: text
  text: "(c) 2026 Acme"
  position: topRight
  opacity: 0.35
  margin: 16
  rotation: -30
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.format, "webp");
        assert_eq!(config.quality, 65);
        assert!(config.resize.enabled);
        assert_eq!(config.resize.width, Some(1200));
        assert_eq!(config.resize.height, None);
        assert!(config.optimize.sharpen);
        assert!(!config.optimize.remove_metadata);
        assert!(config.watermark.enabled);
        assert_eq!(config.watermark.kind, "text");
        assert_eq!(config.watermark.text.as_deref(), Some("(c) 2026 Acme"));
        assert_eq!(config.watermark.position, "topRight");
        assert_eq!(config.watermark.rotation, -30.0);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::from_yaml("format: [").is_err());
    }
}
