// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::core::{AppConfig, ProfileSelection};
use super::validation::ConfigValidator;
use crate::errors::ProfileError;
use crate::types::CredentialProfile;

pub struct ConfigLoader {
    config_path: PathBuf,
    format: ConfigFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref().to_path_buf();
        let format = Self::detect_format(&path)?;

        Ok(Self {
            config_path: path,
            format,
        })
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow::anyhow!("Could not determine config file format"))?;

        match extension {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(anyhow::anyhow!("Unsupported config file format: {}", extension)),
        }
    }

    /// Parse the file and apply environment overrides. Validation is left to
    /// the caller, since command-line flags are merged in afterwards.
    pub fn load_config(&self) -> Result<AppConfig> {
        let content = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {:?}", self.config_path))?;

        let mut config: AppConfig = match self.format {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)
                .context("Failed to parse YAML config")?,
            ConfigFormat::Toml => toml::from_str(&content)
                .context("Failed to parse TOML config")?,
            ConfigFormat::Json => serde_json::from_str(&content)
                .context("Failed to parse JSON config")?,
        };

        apply_env_overrides(&mut config)?;

        Ok(config)
    }
}

/// Environment variables win over file values
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Ok(key) = std::env::var("SHODAN_API_KEY") {
        if !key.is_empty() {
            config.targets.shodan_key = Some(key);
        }
    }

    if let Ok(concurrency) = std::env::var("MAX_CONCURRENCY") {
        config.scanner.max_concurrency = concurrency.parse()
            .context("Invalid MAX_CONCURRENCY")?;
    }

    if let Ok(timeout) = std::env::var("REQUEST_TIMEOUT_SECS") {
        config.scanner.request_timeout_secs = timeout.parse()
            .context("Invalid REQUEST_TIMEOUT_SECS")?;
    }

    if let Ok(proxy) = std::env::var("SCAN_PROXY") {
        if !proxy.is_empty() {
            config.scanner.proxy = Some(proxy);
        }
    }

    Ok(())
}

/// Loads `*.yml` / `*.yaml` credential profiles from a directory tree.
pub struct ProfileLoader {
    dir: PathBuf,
    name_filter: Option<String>,
    category_filter: Option<String>,
}

impl ProfileLoader {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            name_filter: None,
            category_filter: None,
        }
    }

    pub fn from_selection(selection: &ProfileSelection) -> Self {
        Self {
            dir: selection.dir.clone(),
            name_filter: selection.name.as_ref().map(|n| n.to_lowercase()),
            category_filter: selection.category.as_ref().map(|c| c.to_lowercase()),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name_filter = Some(name.to_lowercase());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category_filter = Some(category.to_lowercase());
        self
    }

    /// Every profile file must parse and validate; one bad file fails the load.
    pub fn load(&self) -> Result<Vec<CredentialProfile>, ProfileError> {
        let files = self.profile_files()?;
        let mut profiles = Vec::with_capacity(files.len());

        for path in files {
            let profile = Self::load_file(&path)?;
            if self.selected(&profile) {
                profiles.push(profile);
            } else {
                debug!("Skipping profile '{}' (filtered)", profile.name);
            }
        }

        info!(
            "Loaded {} credential profiles from {}",
            profiles.len(),
            self.dir.display()
        );
        Ok(profiles)
    }

    pub fn load_file(path: &Path) -> Result<CredentialProfile, ProfileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let profile: CredentialProfile =
            serde_yaml::from_str(&content).map_err(|e| ProfileError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        ConfigValidator::validate_profile(&profile)?;
        Ok(profile)
    }

    fn profile_files(&self) -> Result<Vec<PathBuf>, ProfileError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.dir).follow_links(true) {
            let entry = entry.map_err(|e| ProfileError::Read {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| self.dir.clone()),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let is_yaml = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| e == "yml" || e == "yaml");
            if is_yaml {
                files.push(entry.into_path());
            }
        }

        // Stable order keeps fingerprint and result ordering reproducible
        files.sort();
        Ok(files)
    }

    fn selected(&self, profile: &CredentialProfile) -> bool {
        if let Some(ref name) = self.name_filter {
            if !profile.name.to_lowercase().contains(name.as_str()) {
                return false;
            }
        }
        if let Some(ref category) = self.category_filter {
            if profile.category.to_lowercase() != *category {
                return false;
            }
        }
        true
    }
}
