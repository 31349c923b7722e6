//! Settings for the precis engine: layout metrics, hover timings, overlay
//! style classes and the default rank threshold.
//!
//! Every key has a value in the embedded `defaults/precis.default.toml`, so a
//! reader's file only names what it changes. [`Loader`] does the layering.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/precis.default.toml");

/// All settings of one document view
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrecisConfig {
    pub layout: LayoutConfig,
    pub interaction: InteractionConfig,
    pub overlay: OverlayConfig,
    pub filter: FilterConfig,
}

/// Metrics for the reference monospace layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutConfig {
    pub columns: usize,
    pub char_width: f64,
    pub line_height: f64,
    pub paragraph_spacing: f64,
}

/// Hover-intent timings and floating control size.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InteractionConfig {
    pub hover_show_delay_ms: u64,
    pub hover_hide_grace_ms: u64,
    pub control_width: f64,
    pub control_height: f64,
}

impl InteractionConfig {
    pub fn hover_show_delay(&self) -> Duration {
        Duration::from_millis(self.hover_show_delay_ms)
    }

    pub fn hover_hide_grace(&self) -> Duration {
        Duration::from_millis(self.hover_hide_grace_ms)
    }
}

/// CSS state classes applied to overlay elements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OverlayConfig {
    pub selection_class: String,
    pub tagged_class: String,
    pub hover_class: String,
    pub control_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterConfig {
    pub default_threshold: u8,
}

impl Default for PrecisConfig {
    fn default() -> Self {
        // The embedded defaults are validated by `loads_default_config`.
        Self {
            layout: LayoutConfig {
                columns: 72,
                char_width: 8.0,
                line_height: 20.0,
                paragraph_spacing: 12.0,
            },
            interaction: InteractionConfig {
                hover_show_delay_ms: 200,
                hover_hide_grace_ms: 250,
                control_width: 24.0,
                control_height: 24.0,
            },
            overlay: OverlayConfig {
                selection_class: "summa-selection".to_string(),
                tagged_class: "summa-tagged".to_string(),
                hover_class: "summa-hover".to_string(),
                control_class: "summa-control".to_string(),
            },
            filter: FilterConfig {
                default_threshold: 80,
            },
        }
    }
}

/// Layers a reader's settings file and command-line values over the
/// embedded `precis.default.toml`.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder()
                .add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layer a TOML settings file. The file must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.builder = self.builder.add_source(
            File::from(path.as_ref())
                .format(FileFormat::Toml)
                .required(true),
        );
        self
    }

    /// Override one dotted key, e.g. `layout.columns` from `--width`
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PrecisConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_defaults_match_default_impl() {
        let config = Loader::new().build().expect("defaults to deserialize");
        assert_eq!(config, PrecisConfig::default());
        assert_eq!(
            config.interaction.hover_show_delay(),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("filter.default_threshold", 50i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.filter.default_threshold, 50);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[layout]\ncolumns = 40").expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.layout.columns, 40);
        assert_eq!(config.layout.line_height, 20.0);
    }

    #[test]
    fn missing_user_file_is_an_error() {
        assert!(Loader::new()
            .with_file("/nonexistent/precis.toml")
            .build()
            .is_err());
    }
}
