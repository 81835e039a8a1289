//! Configuration management for the type generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (typegen.toml)
//! - Environment variables (TYPEGEN_*)
//!
//! ## Example config file (typegen.toml):
//! ```toml
//! [generator]
//! accepted_environments = ["development"]
//! verbose_logs = false
//! always_add_enum_suffix = false
//! always_add_component_suffix = false
//! strategy = "plain"
//! restricted_variants = false
//! ignore = [
//!     "plugin::upload.folder",
//!     { regex = "plugin::content-releases\\..*" },
//! ]
//!
//! [sources]
//! application_dir = "src/api"
//! components_dir = "src/components"
//!
//! [output]
//! path = "types/contentTypes.d.ts"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// Main configuration for the type generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypegenConfig {
    /// Settings consumed by the compiler itself
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Where schema descriptors are read from
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Where the generated document is written
    #[serde(default)]
    pub output: OutputConfig,
}

/// Compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Environments in which generation runs (checked by the CLI, not the compiler)
    #[serde(default = "default_accepted_environments")]
    pub accepted_environments: Vec<String>,

    /// Promote per-schema decisions to info-level logs
    #[serde(default)]
    pub verbose_logs: bool,

    /// Suffix every synthesized enum name with `Enum`
    #[serde(default)]
    pub always_add_enum_suffix: bool,

    /// Suffix every component type name with `Component`
    #[serde(default)]
    pub always_add_component_suffix: bool,

    /// Schema identifiers to leave out of the document
    #[serde(default = "default_ignore")]
    pub ignore: Vec<IgnorePattern>,

    /// Which mapping strategy renders references and declarations
    #[serde(default)]
    pub strategy: MappingStrategyKind,

    /// Emit `<Name>Restricted` types without password fields
    #[serde(default)]
    pub restricted_variants: bool,
}

/// A single ignore entry: a literal identifier or a regular expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IgnorePattern {
    Literal(String),
    Regex { regex: String },
}

impl IgnorePattern {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            regex: pattern.into(),
        }
    }
}

/// Selects a [`crate::codegen::strategy::MappingStrategy`] implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStrategyKind {
    /// Bare type references, nullable audit timestamps
    #[default]
    Plain,
    /// Declarations generic over the publication state
    PublicationState,
}

/// Descriptor source locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Root of the application content types (`<api>/content-types/<name>/schema.json`)
    #[serde(default = "default_application_dir")]
    pub application_dir: PathBuf,

    /// Root of the components (`<category>/<name>.json`)
    #[serde(default = "default_components_dir")]
    pub components_dir: PathBuf,

    /// A single JSON dump exported from the running host, used instead of the directories
    #[serde(default)]
    pub dump: Option<PathBuf>,
}

/// Output location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the generated declaration file
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

// Default value functions
fn default_accepted_environments() -> Vec<String> {
    vec!["development".to_string()]
}

fn default_ignore() -> Vec<IgnorePattern> {
    vec![
        IgnorePattern::literal("plugin::upload.folder"),
        IgnorePattern::literal("plugin::i18n.locale"),
        IgnorePattern::regex(r"plugin::content-releases\..*"),
        IgnorePattern::literal("plugin::users-permissions.permission"),
    ]
}

fn default_application_dir() -> PathBuf {
    PathBuf::from("src/api")
}

fn default_components_dir() -> PathBuf {
    PathBuf::from("src/components")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("types/contentTypes.d.ts")
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            accepted_environments: default_accepted_environments(),
            verbose_logs: false,
            always_add_enum_suffix: false,
            always_add_component_suffix: false,
            ignore: default_ignore(),
            strategy: MappingStrategyKind::default(),
            restricted_variants: false,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            application_dir: default_application_dir(),
            components_dir: default_components_dir(),
            dump: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl GeneratorConfig {
    /// Whether generation should run in the given environment
    pub fn accepts_environment(&self, environment: &str) -> bool {
        self.accepted_environments.iter().any(|e| e == environment)
    }
}

impl TypegenConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["typegen.toml", ".typegen.toml", "config/typegen.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "typegen", "schema-typegen") {
            let xdg_config = config_dir.config_dir().join("typegen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (TYPEGEN_*)
        builder = builder.add_source(
            Environment::with_prefix("TYPEGEN")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
