//! Renderer configuration.
//!
//! Loaded from YAML, with `${VAR}` / `${VAR:-default}` substitution, and
//! overridable through environment variables:
//!
//! | field        | environment            | default                    |
//! |--------------|------------------------|----------------------------|
//! | `fontset`    | `MAPSERVER_FONTSET`    | `<renderer>/fonts/fontset` |
//! | `max_size`   | `MAPSERVER_MAX_SIZE`   | 4096                       |
//! | `anti_alias` | `MAPSERVER_ANTI_ALIAS` | true                       |

use map_common::{MapError, MapResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const FONTSET_ENV: &str = "MAPSERVER_FONTSET";
pub const MAX_SIZE_ENV: &str = "MAPSERVER_MAX_SIZE";
pub const ANTI_ALIAS_ENV: &str = "MAPSERVER_ANTI_ALIAS";

/// Largest accepted image width or height unless configured otherwise.
pub const DEFAULT_MAX_SIZE: u32 = 4096;

/// The font list shipped with this crate.
pub fn default_fontset_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fonts")
        .join("fontset")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Font list used by labels
    pub fontset: PathBuf,

    /// Largest accepted width or height in pixels
    pub max_size: u32,

    pub anti_alias: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fontset: default_fontset_path(),
            max_size: DEFAULT_MAX_SIZE,
            anti_alias: true,
        }
    }
}

impl RendererConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> MapResult<Self> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Parse YAML. Relative `fontset` paths stay relative to the working
    /// directory; use [`from_yaml_file`](Self::from_yaml_file) to anchor them.
    pub fn from_yaml_str(yaml: &str) -> MapResult<Self> {
        let expanded = substitute_env_vars(yaml, &|name| std::env::var(name).ok())?;
        let config: RendererConfig = serde_yaml::from_str(&expanded)
            .map_err(|e| MapError::Config(format!("invalid renderer config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file; a relative `fontset` is resolved against the file's
    /// directory.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MapError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_yaml_str(&content)?;
        if config.fontset.is_relative() {
            if let Some(dir) = path.parent() {
                config.fontset = dir.join(&config.fontset);
            }
        }
        tracing::debug!(path = %path.display(), fontset = %config.fontset.display(), "Loaded renderer config");
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> MapResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(FONTSET_ENV).filter(|v| !v.is_empty()) {
            self.fontset = PathBuf::from(path);
        }
        if let Some(value) = lookup(MAX_SIZE_ENV) {
            self.max_size = value.trim().parse().map_err(|_| {
                MapError::Config(format!("{} must be a positive integer, got {:?}", MAX_SIZE_ENV, value))
            })?;
        }
        if let Some(value) = lookup(ANTI_ALIAS_ENV) {
            self.anti_alias = parse_bool(&value).ok_or_else(|| {
                MapError::Config(format!("{} must be true or false, got {:?}", ANTI_ALIAS_ENV, value))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> MapResult<()> {
        if self.max_size == 0 {
            return Err(MapError::Config("max_size must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Replace `${VAR}` and `${VAR:-default}` references.
fn substitute_env_vars<F>(content: &str, lookup: &F) -> MapResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            MapError::Config(format!("unclosed variable substitution: ${{{}", after))
        })?;

        let expr = &after[..end];
        let value = match expr.split_once(":-") {
            Some((name, default)) => lookup(name.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string()),
            None => lookup(expr.trim()).ok_or_else(|| {
                MapError::Config(format!("environment variable {} not set", expr.trim()))
            })?,
        };
        result.push_str(&value);
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.max_size, 4096);
        assert!(config.anti_alias);
        assert!(config.fontset.ends_with("fonts/fontset"));
    }

    #[test]
    fn test_overrides() {
        let config = RendererConfig::default()
            .with_overrides(env(&[
                (FONTSET_ENV, "/etc/mapserver/fonts.txt"),
                (MAX_SIZE_ENV, " 512 "),
                (ANTI_ALIAS_ENV, "off"),
            ]))
            .unwrap();
        assert_eq!(config.fontset, PathBuf::from("/etc/mapserver/fonts.txt"));
        assert_eq!(config.max_size, 512);
        assert!(!config.anti_alias);
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let err = RendererConfig::default()
            .with_overrides(env(&[(MAX_SIZE_ENV, "huge")]))
            .unwrap_err();
        assert!(matches!(err, MapError::Config(_)));

        let err = RendererConfig::default()
            .with_overrides(env(&[(MAX_SIZE_ENV, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("max_size"));
    }

    #[test]
    fn test_yaml_partial_uses_defaults() {
        let config = RendererConfig::from_yaml_str("max_size: 1024\n").unwrap();
        assert_eq!(config.max_size, 1024);
        assert!(config.anti_alias);
        assert_eq!(config.fontset, default_fontset_path());
    }

    #[test]
    fn test_yaml_unknown_type_rejected() {
        assert!(RendererConfig::from_yaml_str("max_size: [1, 2]\n").is_err());
    }

    #[test]
    fn test_substitution() {
        let lookup = env(&[("FONT_DIR", "/opt/fonts")]);
        assert_eq!(
            substitute_env_vars("fontset: ${FONT_DIR}/list", &lookup).unwrap(),
            "fontset: /opt/fonts/list"
        );
        assert_eq!(
            substitute_env_vars("max_size: ${MISSING:-256}", &lookup).unwrap(),
            "max_size: 256"
        );
        assert!(substitute_env_vars("x: ${MISSING}", &lookup).is_err());
        assert!(substitute_env_vars("x: ${OPEN", &lookup).is_err());
    }

    #[test]
    fn test_yaml_file_resolves_relative_fontset() {
        let dir = test_utils::temp_test_dir();
        let path = dir.path().join("renderer.yaml");
        std::fs::write(&path, "fontset: fonts/list.txt\nanti_alias: false\n").unwrap();

        let config = RendererConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.fontset, dir.path().join("fonts/list.txt"));
        assert!(!config.anti_alias);
    }
}
