//! CLI configuration
//!
//! `defaults/ufoscript.default.toml` is embedded into the binary. A
//! `ufoscript.toml` in the working directory and an explicit `--config` file
//! are layered on top through [`Loader`] before deserializing into
//! [`UfoConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use ufoscript_core::{
    standard_kinds, BlockKind, DuplicatePolicy, Registry, RegistryBuilder, RegistryError,
    Unstructured,
};

const DEFAULT_TOML: &str = include_str!("../defaults/ufoscript.default.toml");

/// Project-local file picked up when present
pub const LOCAL_CONFIG: &str = "ufoscript.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct UfoConfig {
    pub registry: RegistryConfig,
    pub diagnostics: DiagnosticsConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub duplicate_policy: DuplicatePolicy,
    pub disabled_kinds: Vec<String>,
    /// Project kinds registered after the standard ones
    pub extra_kinds: Vec<ExtraKind>,
}

/// Keyword whose blocks are accepted without field parsing
#[derive(Debug, Clone, Deserialize)]
pub struct ExtraKind {
    pub keyword: String,
    #[serde(default = "default_named")]
    pub named: bool,
}

fn default_named() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    pub warnings_as_errors: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl RegistryConfig {
    /// Standard kinds minus the disabled ones, then the extra kinds. An extra
    /// kind reusing a keyword goes through the duplicate policy.
    pub fn build_registry(&self) -> Result<Registry, RegistryError> {
        for keyword in &self.disabled_kinds {
            if !standard_kinds().iter().any(|k| k.id() == keyword) {
                tracing::warn!(keyword = %keyword, "disabled kind is not a standard block kind");
            }
        }

        let mut builder = RegistryBuilder::new().with_policy(self.duplicate_policy);
        for kind in standard_kinds() {
            if self.disabled_kinds.iter().any(|k| k == kind.id()) {
                tracing::debug!(keyword = kind.id(), "block kind disabled by configuration");
                continue;
            }
            builder.register(kind)?;
        }
        for extra in &self.extra_kinds {
            builder.register(BlockKind::new(extra.keyword.clone(), extra.named, Unstructured))?;
        }
        Ok(builder.build())
    }
}

impl DiagnosticsConfig {
    /// Whether a run with these counts should fail
    pub fn fails(&self, errors: usize, warnings: usize) -> bool {
        errors > 0 || (self.warnings_as_errors && warnings > 0)
    }
}

/// Layers user overrides over the built-in defaults
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a configuration file that may be absent
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override from the command line
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<UfoConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub warnings_as_errors: bool,
    pub format: Option<OutputFormat>,
}

/// Defaults, then `./ufoscript.toml`, then `explicit` when given, then the
/// command line
pub fn load(explicit: Option<&Path>, overrides: Overrides) -> Result<UfoConfig, ConfigError> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    if let Some(path) = explicit {
        loader = loader.with_file(path);
    }
    if overrides.warnings_as_errors {
        loader = loader.set_override("diagnostics.warnings_as_errors", true)?;
    }
    if let Some(format) = overrides.format {
        loader = loader.set_override("output.format", format.as_str())?;
    }
    loader.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = Loader::new().build().expect("defaults to deserialize");
        assert_eq!(config.registry.duplicate_policy, DuplicatePolicy::Replace);
        assert!(config.registry.disabled_kinds.is_empty());
        assert!(!config.diagnostics.warnings_as_errors);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("output.format", "json")
            .expect("override to apply")
            .set_override("registry.duplicate_policy", "reject")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.registry.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn rejects_unknown_format() {
        let result = Loader::new()
            .set_override("output.format", "yaml")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new()
            .with_file("/nonexistent/ufoscript-test.toml")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn layered_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("ufoscript-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[registry]\ndisabled_kinds = [\"physics\"]\n[diagnostics]\nwarnings_as_errors = true\n",
        )
        .unwrap();
        let config = Loader::new().with_file(&path).build();
        let _ = std::fs::remove_file(&path);

        let config = config.expect("config to build");
        assert_eq!(config.registry.disabled_kinds, vec!["physics".to_string()]);
        assert!(config.diagnostics.warnings_as_errors);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn disabled_kinds_are_not_registered() {
        let registry = RegistryConfig {
            duplicate_policy: DuplicatePolicy::Replace,
            disabled_kinds: vec!["physics".to_string(), "mapdef".to_string()],
            extra_kinds: Vec::new(),
        }
        .build_registry()
        .unwrap();
        assert!(registry.lookup("physics").is_none());
        assert!(registry.lookup("tech").is_some());
        assert_eq!(registry.len(), standard_kinds().len() - 1);
    }

    #[test]
    fn warnings_as_errors() {
        let strict = DiagnosticsConfig {
            warnings_as_errors: true,
        };
        let lenient = DiagnosticsConfig {
            warnings_as_errors: false,
        };
        assert!(strict.fails(0, 1));
        assert!(!lenient.fails(0, 1));
        assert!(lenient.fails(1, 0));
        assert!(!strict.fails(0, 0));
    }

    fn extra(keyword: &str, named: bool) -> ExtraKind {
        ExtraKind {
            keyword: keyword.to_string(),
            named,
        }
    }

    #[test]
    fn extra_kinds_are_registered() {
        let registry = RegistryConfig {
            duplicate_policy: DuplicatePolicy::Replace,
            disabled_kinds: Vec::new(),
            extra_kinds: vec![extra("mapdef", true), extra("campaign", false)],
        }
        .build_registry()
        .unwrap();
        assert!(registry.lookup("mapdef").unwrap().is_id_name());
        assert!(!registry.lookup("campaign").unwrap().is_id_name());
        assert!(registry.duplicates().is_empty());
    }

    #[test]
    fn extra_kind_replacing_a_standard_kind_is_flagged() {
        let registry = RegistryConfig {
            duplicate_policy: DuplicatePolicy::Replace,
            disabled_kinds: Vec::new(),
            extra_kinds: vec![extra("tech", false)],
        }
        .build_registry()
        .unwrap();
        assert_eq!(registry.duplicates(), ["tech".to_string()]);
        assert_eq!(registry.duplicate_diagnostics().len(), 1);
        assert!(!registry.lookup("tech").unwrap().is_id_name());
    }

    #[test]
    fn reject_policy_fails_on_reused_keyword() {
        let result = RegistryConfig {
            duplicate_policy: DuplicatePolicy::Reject,
            disabled_kinds: Vec::new(),
            extra_kinds: vec![extra("tech", false)],
        }
        .build_registry();
        assert!(matches!(
            result,
            Err(RegistryError::DuplicateRegistration { keyword }) if keyword == "tech"
        ));
    }

    #[test]
    fn extra_kinds_load_from_file() {
        let path = std::env::temp_dir().join(format!("ufoscript-extra-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[[registry.extra_kinds]]\nkeyword = \"mapdef\"\n\n[[registry.extra_kinds]]\nkeyword = \"campaign\"\nnamed = false\n",
        )
        .unwrap();
        let config = Loader::new().with_file(&path).build();
        let _ = std::fs::remove_file(&path);

        let kinds = config.expect("config to build").registry.extra_kinds;
        assert_eq!(kinds.len(), 2);
        assert!(kinds[0].named);
        assert!(!kinds[1].named);
    }

    #[test]
    fn command_line_overrides_apply() {
        let config = load(
            None,
            Overrides {
                warnings_as_errors: true,
                format: Some(OutputFormat::Json),
            },
        )
        .expect("config to build");
        assert!(config.diagnostics.warnings_as_errors);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let config = load(None, Overrides::default()).expect("config to build");
        assert_eq!(config.output.format, OutputFormat::Text);
    }
}
