use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Mapper settings, usually read from a TOML file.
///
/// ```toml
/// key_prefix = "map_"
/// default_expiration_seconds = 3600
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    /// Prepended to every key the mapper builds.
    pub key_prefix: String,
    /// Expiration applied by `Repository::store`. Zero or negative keeps
    /// records forever.
    pub default_expiration_seconds: i64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            key_prefix: String::new(),
            default_expiration_seconds: 0,
        }
    }
}

impl MapperConfig {
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded mapper config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn validate(&self) -> SdkResult<()> {
        if self.key_prefix.chars().any(char::is_whitespace) {
            return Err(SdkError::Config(format!(
                "key_prefix {:?} must not contain whitespace",
                self.key_prefix
            )));
        }
        Ok(())
    }
}
