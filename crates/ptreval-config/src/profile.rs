//! Evaluation profiles loaded from TOML.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PROFILES_FILE: &str = "ptreval.toml";
pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_SEED: &str = "U2xhcnRpYmFydGZhc3My";

/// Directory names a configuration may not take, since they sit next to the
/// configuration directories in the output tree.
const RESERVED_CONFIG_NAMES: &[&str] = &["compare"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read profiles file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in profiles file")]
    Toml(#[source] toml::de::Error),

    #[error("The profiles file defines no profiles")]
    NoProfiles,

    #[error("Profile names must not be empty")]
    EmptyProfileName,

    #[error("Profile '{0}' is defined more than once")]
    DuplicateProfile(String),

    #[error("Profile '{0}' has no configurations")]
    NoConfigs(String),

    #[error("Profile '{profile}' has an invalid configuration name '{config}'")]
    InvalidConfigName { profile: String, config: String },

    #[error("Profile '{profile}' defines configuration '{config}' more than once")]
    DuplicateConfig { profile: String, config: String },

    #[error("Profile '{profile}' sets {buckets} buckets for {configs} configurations")]
    TooFewBuckets {
        profile: String,
        buckets: usize,
        configs: usize,
    },

    #[error("Unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },
}

/// One run configuration of the analysis tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigProfile {
    pub name: String,
    /// Arguments passed to the tool for this configuration only.
    #[serde(default)]
    pub tool_args: Vec<String>,
}

/// Optional discovery overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_marker: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_include_depth: Option<usize>,
}

fn default_seed() -> String {
    DEFAULT_SEED.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default = "default_seed")]
    pub seed: String,
    #[serde(default)]
    pub per_file_comparison: bool,
    /// Defaults to the number of configurations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Arguments passed to the tool for every configuration.
    #[serde(default)]
    pub tool_args: Vec<String>,
    #[serde(default)]
    pub discover: DiscoverConfig,
    #[serde(default)]
    pub configs: Vec<ConfigProfile>,
}

impl Profile {
    /// Configuration names in declaration order. The first one is the
    /// baseline side of every comparison it takes part in.
    pub fn config_names(&self) -> Vec<String> {
        self.configs.iter().map(|c| c.name.clone()).collect()
    }

    pub fn config(&self, name: &str) -> Option<&ConfigProfile> {
        self.configs.iter().find(|c| c.name == name)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.unwrap_or(self.configs.len())
    }

    /// Profile-wide arguments followed by the configuration's own.
    pub fn tool_args_for(&self, config: &ConfigProfile) -> Vec<String> {
        self.tool_args
            .iter()
            .chain(&config.tool_args)
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyProfileName);
        }
        if self.configs.is_empty() {
            return Err(ConfigError::NoConfigs(self.name.clone()));
        }
        let mut seen = BTreeSet::new();
        for config in &self.configs {
            if !valid_config_name(&config.name) {
                return Err(ConfigError::InvalidConfigName {
                    profile: self.name.clone(),
                    config: config.name.clone(),
                });
            }
            if !seen.insert(config.name.as_str()) {
                return Err(ConfigError::DuplicateConfig {
                    profile: self.name.clone(),
                    config: config.name.clone(),
                });
            }
        }
        if let Some(buckets) = self.buckets
            && buckets < self.configs.len()
        {
            return Err(ConfigError::TooFewBuckets {
                profile: self.name.clone(),
                buckets,
                configs: self.configs.len(),
            });
        }
        Ok(())
    }

    /// The profile used when no profiles file exists.
    pub fn builtin() -> Self {
        Self {
            name: DEFAULT_PROFILE.to_string(),
            seed: default_seed(),
            per_file_comparison: false,
            buckets: None,
            limit: None,
            tool_args: Vec::new(),
            discover: DiscoverConfig::default(),
            configs: vec![
                ConfigProfile {
                    name: "insens".to_string(),
                    tool_args: Vec::new(),
                },
                ConfigProfile {
                    name: "sens".to_string(),
                    tool_args: vec!["--enable-pointer-tracking".to_string()],
                },
            ],
        }
    }
}

/// Configuration names become directory names.
fn valid_config_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains("--")
        && !RESERVED_CONFIG_NAMES.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Default for ProfilesFile {
    fn default() -> Self {
        Self {
            profiles: vec![Profile::builtin()],
        }
    }
}

impl ProfilesFile {
    /// Parse and validate a profiles document.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let file: ProfilesFile = toml::from_str(s).map_err(ConfigError::Toml)?;
        file.validate()?;
        Ok(file)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }
        let mut seen = BTreeSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigError::DuplicateProfile(profile.name.clone()));
            }
        }
        Ok(())
    }

    /// Look up `name`, or [`DEFAULT_PROFILE`] when `None`.
    pub fn get(&self, name: Option<&str>) -> Result<&Profile, ConfigError> {
        let key = name.unwrap_or(DEFAULT_PROFILE);
        self.profiles
            .iter()
            .find(|p| p.name == key)
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: key.to_string(),
                available: self
                    .profiles
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
