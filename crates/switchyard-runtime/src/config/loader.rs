//! Layered config loading on figment.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables TOML configuration files (`switchyard.toml`, `config.toml`)
//! - `yaml-config`: enables YAML configuration files (`switchyard.yaml`, `switchyard.yml`, etc.)
//!
//! With both enabled, TOML names are tried before YAML names and the first
//! file found is the one loaded.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic base configs ([`ConfigLoader::merge`])
//! 3. Profile-specific config file (`switchyard.{profile}.toml`)
//! 4. Main config file (`switchyard.toml`)
//! 5. Environment variables (`SWITCHYARD_*`)
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `SWITCHYARD_` prefix with `__` as separator:
//!
//! - `SWITCHYARD_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `SWITCHYARD_BOT__USERNAME=relay_bot` → `bot.username = "relay_bot"`
//! - `SWITCHYARD_DISPATCH__SYNCHRONOUS=true` → `dispatch.synchronous = true`
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./config/switchyard.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::SwitchyardConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "SWITCHYARD_";

/// Selects the `switchyard.<profile>.*` overlay file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    /// Any other name, kept as written.
    Custom(String),
}

impl Profile {
    /// `SWITCHYARD_PROFILE`, or development when unset.
    pub fn from_env() -> Self {
        match std::env::var("SWITCHYARD_PROFILE") {
            Ok(name) => Self::from(name.as_str()),
            Err(_) => Self::default(),
        }
    }
}

impl From<&str> for Profile {
    fn from(name: &str) -> Self {
        if name.eq_ignore_ascii_case("prod") || name.eq_ignore_ascii_case("production") {
            Self::Production
        } else if name.eq_ignore_ascii_case("dev") || name.eq_ignore_ascii_case("development") {
            Self::Development
        } else {
            Self::Custom(name.to_owned())
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        })
    }
}

/// Builds a [`SwitchyardConfig`] from defaults, files and the environment.
pub struct ConfigLoader {
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
    base: Vec<SwitchyardConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
            base: Vec::new(),
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::from(profile.into().as_str());
        self
    }

    /// Adds a directory to look for config files in. Without any, the
    /// current directory and the user config dir are searched.
    pub fn search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    pub fn with_current_dir(mut self) -> Self {
        self.search_paths.extend(std::env::current_dir().ok());
        self
    }

    /// Adds `<user config dir>/switchyard`, e.g. `~/.config/switchyard`.
    pub fn with_user_config_dir(mut self) -> Self {
        self.search_paths
            .extend(dirs::config_dir().map(|dir| dir.join("switchyard")));
        self
    }

    /// Sets a specific configuration file to load instead of searching.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a configuration over the built-in defaults. Files and
    /// environment variables still take precedence.
    ///
    /// ```rust,ignore
    /// let config = ConfigLoader::new()
    ///     .merge(SwitchyardConfig {
    ///         dispatch: DispatchConfig { synchronous: true, ..Default::default() },
    ///         ..Default::default()
    ///     })
    ///     .load()?;
    /// ```
    pub fn merge(mut self, config: SwitchyardConfig) -> Self {
        self.base.push(config);
        self
    }

    /// Loads and validates the configuration.
    pub fn load(self) -> ConfigResult<SwitchyardConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: SwitchyardConfig = figment.extract()?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            bot = %config.bot.username,
            logging_level = %config.logging.level,
            "switchyard config loaded"
        );

        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(SwitchyardConfig::default()));
        for config in &self.base {
            figment = figment.merge(Serialized::defaults(config));
        }

        figment = match &self.config_file {
            Some(path) if !path.exists() => return Err(ConfigError::FileNotFound(path.clone())),
            Some(path) => {
                info!(path = %path.display(), "merging config file");
                merge_config_file(figment, path)?
            }
            None => self.merge_discovered_files(figment)?,
        };

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "merging environment overrides");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    /// Walks `search dirs x file names` in order. Each candidate's profile
    /// variant is merged if present; the first candidate that exists is
    /// merged on top and ends the search.
    fn merge_discovered_files(&self, mut figment: Figment) -> ConfigResult<Figment> {
        let candidates: Vec<PathBuf> = self
            .resolve_search_paths()
            .iter()
            .flat_map(|dir| file_names().into_iter().map(move |name| dir.join(name)))
            .collect();

        for main in &candidates {
            if let Some(profiled) = self.profile_variant(main).filter(|p| p.exists()) {
                debug!(path = %profiled.display(), "merging profile config file");
                figment = merge_config_file(figment, &profiled)?;
            }
            if main.exists() {
                info!(path = %main.display(), "merging config file");
                return merge_config_file(figment, main);
            }
        }

        warn!(
            searched = candidates.len(),
            "no config file found, continuing with defaults"
        );
        Ok(figment)
    }

    /// `switchyard.toml` becomes `switchyard.<profile>.toml`.
    fn profile_variant(&self, path: &Path) -> Option<PathBuf> {
        let stem = path.file_stem()?.to_str()?;
        let ext = path.extension()?.to_str()?;
        Some(path.with_file_name(format!("{stem}.{}.{ext}", self.profile)))
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("switchyard")))
            .collect()
    }
}

/// Config file names for the enabled formats, TOML first.
#[allow(unused_mut)]
fn file_names() -> Vec<&'static str> {
    let mut names = Vec::new();
    #[cfg(feature = "toml-config")]
    names.extend(["switchyard.toml", "config.toml"]);
    #[cfg(feature = "yaml-config")]
    names.extend(["switchyard.yaml", "switchyard.yml", "config.yaml", "config.yml"]);
    names
}

/// Merges one config file, choosing the provider by extension.
fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<SwitchyardConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from one file plus environment variables.
pub fn load_config_from_file(path: impl Into<PathBuf>) -> ConfigResult<SwitchyardConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{BotIdentityConfig, DispatchConfig, LogLevel};
    use figment::Jail;

    #[test]
    fn test_default_config() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level.as_str(), "info");
            assert_eq!(config.bot.username, "switchyard_bot");
            Ok(())
        });
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::from("PROD"), Profile::Production);
        assert_eq!(Profile::from("dev"), Profile::Development);
        assert_eq!(Profile::from("staging").to_string(), "staging");
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = ConfigLoader::new()
            .file("/definitely/not/here/switchyard.toml")
            .without_env()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "switchyard.toml",
                r#"
                [bot]
                id = 77
                username = "file_bot"

                [dispatch]
                synchronous = true
                "#,
            )?;
            jail.set_env("SWITCHYARD_BOT__USERNAME", "env_bot");
            jail.set_env("SWITCHYARD_LOGGING__LEVEL", "debug");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.bot.id, 77);
            assert_eq!(config.bot.username, "env_bot");
            assert!(config.dispatch.synchronous);
            assert_eq!(config.logging.level, LogLevel::Debug);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_profile_file_below_main_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "switchyard.production.toml",
                "[dispatch]\nverbose = true\nchannel_capacity = 8\n",
            )?;
            jail.create_file("switchyard.toml", "[dispatch]\nchannel_capacity = 16\n")?;

            let config = ConfigLoader::new()
                .profile("production")
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;
            assert!(config.dispatch.verbose);
            assert_eq!(config.dispatch.channel_capacity, 16);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_base_config_below_files() {
        Jail::expect_with(|jail| {
            jail.create_file("switchyard.toml", "[dispatch]\nchannel_capacity = 16\n")?;

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .merge(SwitchyardConfig {
                    bot: BotIdentityConfig {
                        username: "merged_bot".into(),
                        ..Default::default()
                    },
                    dispatch: DispatchConfig {
                        channel_capacity: 4,
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.bot.username, "merged_bot");
            assert_eq!(config.dispatch.channel_capacity, 16);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_validation_runs() {
        Jail::expect_with(|jail| {
            jail.create_file("switchyard.toml", "[dispatch]\nchannel_capacity = 0\n")?;

            let err = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .unwrap_err();
            assert!(matches!(err, ConfigError::ValidationError { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("switchyard.ini", "")?;
            let err = ConfigLoader::new()
                .file(jail.directory().join("switchyard.ini"))
                .without_env()
                .load()
                .unwrap_err();
            assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "ini"));
            Ok(())
        });
    }
}
