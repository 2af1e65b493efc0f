//! Swap configuration.
//!
//! Handles loading, validating, and layering the configuration file. Stock
//! defaults are overridden by whatever the user file sets; everything else
//! keeps its default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! breakpoints = [360, 480, 768, 1050, 1300, 1600]
//! upsize_only = true        # never swap to a smaller zone than already served
//! maintain_aspect = false   # crop to the element's own aspect ratio
//! protocol = "http://"      # prefix for generated URLs
//! logging = false           # emit diagnostics through the logger
//!
//! [strategy]
//! kind = "none"             # none | resize-service | custom-url | placeholder
//! ```
//!
//! Strategy variants carry their own settings:
//!
//! ```toml
//! [strategy]
//! kind = "resize-service"
//! service = "demo"          # → http://demo.cloudimage.io/s/resize/<zone>/<source>
//!
//! [strategy]
//! kind = "custom-url"
//! template = "https://img.example.com/%%size%%/%%source%%"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::zone::{Breakpoints, validate_breakpoints};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
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

/// How a zone and source token become an image URL.
///
/// Parsed through `StrategyTable` so that keys belonging to another kind
/// (a `template` under `placeholder`, say) are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", try_from = "StrategyTable")]
pub enum Strategy {
    /// Nothing selected. Every element reports a configuration error.
    #[default]
    None,
    /// cloudimage.io resize/crop service under the given account id.
    ResizeService { service: String },
    /// User template with `%%size%%` and `%%source%%` tokens.
    CustomUrl { template: String },
    /// Square placeholder images sized to the zone.
    Placeholder,
}

/// The `[strategy]` table as written, before checking which keys its kind
/// allows.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StrategyTable {
    kind: String,
    service: Option<String>,
    template: Option<String>,
}

impl TryFrom<StrategyTable> for Strategy {
    type Error = String;

    fn try_from(table: StrategyTable) -> Result<Self, Self::Error> {
        let StrategyTable {
            kind,
            service,
            template,
        } = table;
        let stray = |key: &str| format!("`{key}` is not used by strategy kind `{kind}`");
        match (kind.as_str(), service, template) {
            ("none", None, None) => Ok(Strategy::None),
            ("placeholder", None, None) => Ok(Strategy::Placeholder),
            ("resize-service", Some(service), None) => Ok(Strategy::ResizeService { service }),
            ("custom-url", None, Some(template)) => Ok(Strategy::CustomUrl { template }),
            ("resize-service", None, _) => Err("missing field `service`".to_string()),
            ("custom-url", _, None) => Err("missing field `template`".to_string()),
            ("none" | "placeholder" | "resize-service" | "custom-url", Some(_), _) => {
                Err(stray("service"))
            }
            ("none" | "placeholder" | "resize-service" | "custom-url", _, Some(_)) => {
                Err(stray("template"))
            }
            (other, _, _) => Err(format!(
                "unknown strategy kind `{other}`, expected one of none, resize-service, custom-url, placeholder"
            )),
        }
    }
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::None => "none",
            Strategy::ResizeService { .. } => "resize-service",
            Strategy::CustomUrl { .. } => "custom-url",
            Strategy::Placeholder => "placeholder",
        }
    }
}

/// Swap configuration, constructed once and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ascending viewport widths that define the zones.
    pub breakpoints: Vec<u32>,
    /// Refuse swaps to a zone smaller than the largest already served.
    pub upsize_only: bool,
    /// Crop resize-service images to the element's aspect ratio.
    pub maintain_aspect: bool,
    /// Protocol prefix for generated URLs, including `://`.
    pub protocol: String,
    /// Emit diagnostics through the logger.
    pub logging: bool,
    pub strategy: Strategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            breakpoints: vec![360, 480, 768, 1050, 1300, 1600],
            upsize_only: true,
            maintain_aspect: false,
            protocol: "http://".to_string(),
            logging: false,
            strategy: Strategy::None,
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_breakpoints(&self.breakpoints)?;
        if self.protocol.is_empty() {
            return Err(ConfigError::Validation("protocol must not be empty".into()));
        }
        match &self.strategy {
            Strategy::ResizeService { service } if service.is_empty() => {
                Err(ConfigError::Validation(
                    "strategy.service must not be empty for resize-service".into(),
                ))
            }
            Strategy::CustomUrl { template } if template.is_empty() => Err(
                ConfigError::Validation("strategy.template must not be empty for custom-url".into()),
            ),
            _ => Ok(()),
        }
    }

    /// The validated breakpoint list.
    pub fn breakpoints(&self) -> Result<Breakpoints, ConfigError> {
        Breakpoints::new(self.breakpoints.clone())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Layer a user config on top of a base, then deserialize and validate.
///
/// A `[strategy]` table in the overlay replaces the base strategy as a
/// whole: variant fields never mix across kinds.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => {
            let mut base = base;
            if let (toml::Value::Table(base_table), Some(_)) = (&mut base, ov.get("strategy")) {
                base_table.remove("strategy");
            }
            merge_toml(base, ov)
        }
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `path`, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Smarter Images Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Viewport widths (px) that define the zones. At least two, strictly
# increasing. A viewport narrower than the first breakpoint uses the first
# zone; one at or beyond the last uses the last zone.
breakpoints = [360, 480, 768, 1050, 1300, 1600]

# Never replace an image with one for a smaller zone than the element has
# already been served.
upsize_only = true

# Crop resize-service images to each element's own aspect ratio, measured
# once from its rendered box.
maintain_aspect = false

# Prefix for generated URLs.
protocol = "http://"

# Emit diagnostics (missing source tokens, no strategy) through the logger.
logging = false

# ---------------------------------------------------------------------------
# URL strategy
# ---------------------------------------------------------------------------
# kind = "resize-service"  with  service = "<cloudimage.io account id>"
# kind = "custom-url"      with  template = "https://cdn/%%size%%/%%source%%"
# kind = "placeholder"     square placeholder images sized to the zone
# kind = "none"            no strategy; every element reports an error
[strategy]
kind = "none"
"##
}
