use std::fmt;

use serde::de::{self, Deserializer};
use serde::Deserialize;

// -----------------------------------------------------------------------------
// Style mode
// -----------------------------------------------------------------------------

/// What to do about a component's stylesheet when its import is synthesized.
///
/// Mirrors the JSON shape of the `style` option: `false` (default), `true`,
/// or the string `"css"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleMode {
    /// No side-effect import is emitted.
    #[default]
    None,
    /// Emit a side-effect import of `<component>/style/index.js`.
    Full,
    /// Emit a side-effect import of `<component>/style/css.js`.
    Css,
}

impl<'de> Deserialize<'de> for StyleMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StyleModeVisitor;

        impl de::Visitor<'_> for StyleModeVisitor {
            type Value = StyleMode;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("false, true, or the string \"css\"")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<StyleMode, E> {
                Ok(if v { StyleMode::Full } else { StyleMode::None })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StyleMode, E> {
                if v == "css" {
                    Ok(StyleMode::Css)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(StyleModeVisitor)
    }
}

// -----------------------------------------------------------------------------
// Plugin configuration
// -----------------------------------------------------------------------------

/// Rewrite configuration, supplied once by the host and immutable for the
/// whole compilation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// The aggregate import source to match, e.g. `"antd-design-vue"`.
    pub library_name: String,
    /// Sub-path segment under which per-component modules live, e.g. `"es"`.
    pub library_directory: String,
    #[serde(default)]
    pub style: StyleMode,
}

impl PluginConfig {
    /// Parses and validates the raw JSON config string handed over by the
    /// host. Validation happens here, before any file is visited, so a
    /// malformed configuration fails the compilation up front instead of
    /// silently no-opping.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: PluginConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.library_name.is_empty() {
            return Err(ConfigError::MissingLibraryName);
        }
        if self.library_directory.is_empty() {
            return Err(ConfigError::MissingLibraryDirectory);
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    MissingLibraryName,
    MissingLibraryDirectory,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "invalid plugin configuration: {err}"),
            ConfigError::MissingLibraryName => {
                f.write_str("plugin configuration requires a non-empty `libraryName`")
            }
            ConfigError::MissingLibraryDirectory => {
                f.write_str("plugin configuration requires a non-empty `libraryDirectory`")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = PluginConfig::from_json(
            r#"{"libraryName":"antd-design-vue","libraryDirectory":"es","style":true}"#,
        )
        .unwrap();
        assert_eq!(config.library_name, "antd-design-vue");
        assert_eq!(config.library_directory, "es");
        assert_eq!(config.style, StyleMode::Full);
    }

    #[test]
    fn style_defaults_to_none() {
        let config =
            PluginConfig::from_json(r#"{"libraryName":"lib","libraryDirectory":"lib"}"#).unwrap();
        assert_eq!(config.style, StyleMode::None);
    }

    #[test]
    fn style_accepts_css_string() {
        let config = PluginConfig::from_json(
            r#"{"libraryName":"lib","libraryDirectory":"lib","style":"css"}"#,
        )
        .unwrap();
        assert_eq!(config.style, StyleMode::Css);

        let config = PluginConfig::from_json(
            r#"{"libraryName":"lib","libraryDirectory":"lib","style":false}"#,
        )
        .unwrap();
        assert_eq!(config.style, StyleMode::None);
    }

    #[test]
    fn rejects_unknown_style_string() {
        let err = PluginConfig::from_json(
            r#"{"libraryName":"lib","libraryDirectory":"lib","style":"scss"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_missing_library_name() {
        let err = PluginConfig::from_json(r#"{"libraryDirectory":"es"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = PluginConfig::from_json(r#"{"libraryName":"","libraryDirectory":"es"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingLibraryName));
    }

    #[test]
    fn rejects_empty_library_directory() {
        let err =
            PluginConfig::from_json(r#"{"libraryName":"lib","libraryDirectory":""}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingLibraryDirectory));
    }
}
