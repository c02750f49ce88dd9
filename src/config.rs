/*!
# Reanalysis Configuration

Knobs for the strategy selector and the scoped recompiler. Loaded from TOML
or YAML; every field has a default, so an empty file is a valid configuration.

```toml
function_scoped = true
verify_suffix = true
max_body_len = 65536
verbose_logging = false
```
*/

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecompileConfig {
    /// Allow reanalyzing a single function body. When off, every edit that
    /// would qualify is reanalyzed with the whole document.
    #[serde(default = "default_true")]
    pub function_scoped: bool,

    /// Check that the text after the cursor continues the recompiled body.
    /// The extracted-text check of the scoped recompiler is not optional.
    #[serde(default = "default_true")]
    pub verify_suffix: bool,

    /// Bodies longer than this (in old-text bytes) are reanalyzed with the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_body_len: Option<usize>,

    /// Debug-level logging in [`crate::logging::init_from_config`].
    #[serde(default)]
    pub verbose_logging: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RecompileConfig {
    fn default() -> Self {
        Self { function_scoped: true, verify_suffix: true, max_body_len: None, verbose_logging: false }
    }
}

impl RecompileConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML reanalysis config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse YAML reanalysis config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read reanalysis config from {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        let parsed = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => bail!("Unsupported config format for {} (expected .toml, .yaml or .yml)", path.display()),
        };
        parsed.with_context(|| format!("Invalid reanalysis config in {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize reanalysis config to TOML")
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write reanalysis config to {}", path.as_ref().display()))
    }

    fn validate(&self) -> Result<()> {
        if self.max_body_len == Some(0) {
            bail!("max_body_len must be positive; omit it to disable the limit");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RecompileConfig::default();
        assert!(config.function_scoped);
        assert!(config.verify_suffix);
        assert_eq!(config.max_body_len, None);
        assert_eq!(RecompileConfig::from_toml_str("").expect("empty"), config);
    }

    #[test]
    fn test_partial_toml_and_yaml() {
        let toml = RecompileConfig::from_toml_str("function_scoped = false\nmax_body_len = 512\n").expect("toml");
        assert!(!toml.function_scoped);
        assert!(toml.verify_suffix);
        assert_eq!(toml.max_body_len, Some(512));

        let yaml = RecompileConfig::from_yaml_str("verbose_logging: true\n").expect("yaml");
        assert!(yaml.verbose_logging);
        assert!(yaml.function_scoped);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(RecompileConfig::from_toml_str("max_body_len = 0").is_err());
        assert!(RecompileConfig::from_toml_str("function_scope = true").is_err());
    }

    #[test]
    fn test_toml_serialization() {
        let text = RecompileConfig::default().to_toml_string().expect("toml");
        assert!(text.contains("function_scoped = true"));
        assert!(!text.contains("max_body_len"));
    }
}
