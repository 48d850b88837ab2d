//! Configuration loading, defaults, and save-back.
//!
//! The configuration lives in `umbra-config.yaml`. This module defines
//! strongly-typed structs mirroring the YAML structure, a loader that falls
//! back to defaults (and writes them out) when the file is missing, and a
//! writer used to persist settings changed at runtime such as the selected
//! font or fullscreen mode.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, info_span, warn};

use crate::font::Font;
use crate::params::ParamValue;

/// Comment block written at the top of saved configuration files.
const CONFIG_HEADER: &str = "\
# UMBRA CONFIGURATION FILE
#
# window.root_width / root_height: size of the root console in cells
# window.full_screen: run in full screen mode
# font.font_id: index of the font to use, font.font_dir: font directory
# logging.level: info, notice, warning, error, fatal error, none
# engine.frame_interval_ms: target frame length
# engine.render_paused_modules: draw paused modules
# module_chain: name of the chain (under `chains`) activated at startup
";

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    #[error("failed to access config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse or serialize YAML content.
    #[error("failed to process config YAML: {source}")]
    Yaml {
        /// The underlying YAML error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UmbraConfig {
    /// Root console settings.
    #[serde(default)]
    pub window: WindowConfig,

    /// Font selection.
    #[serde(default)]
    pub font: FontConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Frame loop settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Name of the chain activated at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_chain: Option<String>,

    /// Named module chains.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub chains: BTreeMap<String, Vec<ChainEntry>>,
}

impl UmbraConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Load `path`, or write and return the defaults if it does not exist.
    ///
    /// A file that cannot be parsed is left untouched and the defaults are
    /// used instead.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read, or
    /// if the defaults cannot be written.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let _span = info_span!("config_load", path = %path.display()).entered();
        if !path.exists() {
            info!("Configuration file is missing, creating one with default values");
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        let contents = std::fs::read_to_string(path)?;
        let config = match Self::parse(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Invalid configuration file, using default values");
                return Ok(Self::default());
            }
        };
        info!(
            module_chain = config.module_chain.as_deref().unwrap_or(""),
            chains = config.chains.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Serialize to YAML, header comment included.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        let body = serde_yml::to_string(self)?;
        Ok(format!("{CONFIG_HEADER}\n{body}"))
    }

    /// Write the configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        info!(path = %path.display(), "Saving configuration");
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// The chain named by [`module_chain`](Self::module_chain), if both exist.
    pub fn startup_chain(&self) -> Option<(&str, &[ChainEntry])> {
        let name = self.module_chain.as_deref()?;
        self.chains
            .get(name)
            .map(|entries| (name, entries.as_slice()))
    }
}

/// Root console settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Width of the root console in cells.
    #[serde(default = "default_root_width")]
    pub root_width: u16,

    /// Height of the root console in cells.
    #[serde(default = "default_root_height")]
    pub root_height: u16,

    /// Whether to run full screen.
    #[serde(default)]
    pub full_screen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            root_width: default_root_width(),
            root_height: default_root_height(),
            full_screen: false,
        }
    }
}

/// Font settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Index of the font to activate at startup.
    #[serde(default)]
    pub font_id: usize,

    /// Directory holding font images.
    #[serde(default = "default_font_dir")]
    pub font_dir: String,

    /// Fonts to register, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<Font>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_id: 0,
            font_dir: default_font_dir(),
            fonts: Vec::new(),
        }
    }
}

/// Which messages are logged.
///
/// Unknown names deserialize to the default level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LogLevel {
    /// Everything down to informational messages.
    #[serde(rename = "info")]
    Info,
    /// Notices and above.
    #[serde(rename = "notice")]
    Notice,
    /// Warnings and above.
    #[serde(rename = "warning")]
    Warning,
    /// Errors and fatal errors.
    #[default]
    #[serde(rename = "error")]
    Error,
    /// Fatal errors only.
    #[serde(rename = "fatal error")]
    Fatal,
    /// Logging disabled.
    #[serde(rename = "none")]
    None,
}

impl LogLevel {
    /// Look a level up by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "info" => Some(Self::Info),
            "notice" => Some(Self::Notice),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "fatal error" => Some(Self::Fatal),
            "none" => Some(Self::None),
            _ => Option::None,
        }
    }

    /// The `tracing` filter directive for this level.
    pub const fn as_filter_directive(self) -> &'static str {
        match self {
            Self::Info => "debug",
            Self::Notice => "info",
            Self::Warning => "warn",
            Self::Error | Self::Fatal => "error",
            Self::None => "off",
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name).unwrap_or_else(|| {
            let level = Self::default();
            warn!(name = %name, default = ?level, "Unknown log level, keeping the default");
            level
        }))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,
}

/// Frame loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Target frame length in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Stop after this many frames (0 = unlimited).
    #[serde(default)]
    pub max_frames: u64,

    /// Whether paused modules are still rendered.
    #[serde(default = "default_true")]
    pub render_paused_modules: bool,

    /// Module activated when a deactivated module has no fallback of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fallback: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            max_frames: 0,
            render_paused_modules: true,
            default_fallback: None,
        }
    }
}

/// One module in a chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Registered module name.
    pub module: String,

    /// Priority override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Fallback module name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,

    /// Per-module paused render policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_when_paused: Option<bool>,

    /// Whether loading the chain activates this module.
    #[serde(default = "default_true")]
    pub active: bool,

    /// Parameter overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
}

const fn default_root_width() -> u16 {
    80
}

const fn default_root_height() -> u16 {
    60
}

fn default_font_dir() -> String {
    "data/img".to_owned()
}

const fn default_frame_interval_ms() -> u64 {
    33
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("umbra-{}-{name}.yaml", std::process::id()))
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = UmbraConfig::default();
        assert_eq!(config.window.root_width, 80);
        assert_eq!(config.window.root_height, 60);
        assert_eq!(config.font.font_dir, "data/img");
        assert_eq!(config.logging.level, LogLevel::Error);
        assert!(config.engine.render_paused_modules);
        assert!(config.startup_chain().is_none());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = UmbraConfig::parse("").unwrap();
        assert_eq!(config, UmbraConfig::default());
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = UmbraConfig::parse("window:\n  root_width: 120\n").unwrap();
        assert_eq!(config.window.root_width, 120);
        assert_eq!(config.window.root_height, 60);
        assert_eq!(config.engine.frame_interval_ms, 33);
    }

    #[test]
    fn parse_chain_and_log_level() {
        let yaml = r#"
logging:
  level: "fatal error"
module_chain: demo
chains:
  demo:
    - module: intro
      timeout_ms: 3000
      fallback: menu
      params:
        title: "Umbra"
        speed: 2
    - module: menu
      priority: 4
      active: false
"#;
        let config = UmbraConfig::parse(yaml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Fatal);
        assert_eq!(config.logging.level.as_filter_directive(), "error");

        let (name, entries) = config.startup_chain().unwrap();
        assert_eq!(name, "demo");
        assert_eq!(entries.len(), 2);
        let intro = entries.first().unwrap();
        assert_eq!(intro.timeout_ms, Some(3000));
        assert_eq!(intro.fallback.as_deref(), Some("menu"));
        assert!(intro.active);
        assert_eq!(intro.params.get("speed"), Some(&ParamValue::Int(2)));
        let menu = entries.get(1).unwrap();
        assert_eq!(menu.priority, Some(4));
        assert!(!menu.active);
    }

    #[test]
    fn unknown_log_level_keeps_the_default() {
        let config = UmbraConfig::parse("logging:\n  level: chatty\nwindow:\n  root_width: 100\n").unwrap();
        assert_eq!(config.logging.level, LogLevel::Error);
        assert_eq!(config.window.root_width, 100);
        assert_eq!(LogLevel::from_name("warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_name("chatty"), None);
    }

    #[test]
    fn invalid_file_loads_defaults_and_is_left_alone() {
        let path = temp_path("invalid");
        let broken = "window:\n  root_width: wide\n";
        std::fs::write(&path, broken).unwrap();

        let config = UmbraConfig::load_or_create(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(config, UmbraConfig::default());
        assert_eq!(text, broken);
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = temp_path("roundtrip");
        let mut config = UmbraConfig::default();
        config.window.full_screen = true;
        config.font.font_id = 2;
        config.module_chain = Some("main".to_owned());
        config.chains.insert(
            "main".to_owned(),
            vec![ChainEntry {
                module: "menu".to_owned(),
                active: true,
                ..ChainEntry::default()
            }],
        );

        config.save(&path).unwrap();
        let loaded = UmbraConfig::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);

        let config = UmbraConfig::load_or_create(&path).unwrap();
        assert_eq!(config, UmbraConfig::default());
        assert!(path.exists());
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(text.starts_with("# UMBRA CONFIGURATION FILE"));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("umbra-config.yaml");
        if path.exists() {
            let config = UmbraConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
