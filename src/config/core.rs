// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub targets: TargetSources,

    #[serde(default)]
    pub profiles: ProfileSelection,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScannerConfig {
    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Upstream proxy for every request (http, https or socks5 URL)
    #[serde(default)]
    pub proxy: Option<String>,

    #[validate(range(min = 1, max = 10000))]
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,

    #[validate(range(min = 0, max = 20))]
    #[serde(default = "default_redirect_limit")]
    pub max_redirects: usize,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Match fingerprints and build login attempts without sending credentials
    #[serde(default)]
    pub fingerprint_only: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            proxy: None,
            max_concurrency: default_concurrency(),
            max_redirects: default_redirect_limit(),
            user_agent: None,
            fingerprint_only: false,
        }
    }
}

/// Where targets come from. Any combination may be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSources {
    /// CIDR block, every usable host is scanned
    #[serde(default)]
    pub subnet: Option<String>,

    /// File with one target per line
    #[serde(default)]
    pub targets: Option<PathBuf>,

    /// Single host or host:port
    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub shodan_query: Option<String>,

    #[serde(default)]
    pub shodan_key: Option<String>,

    /// Nmap XML report (-oX)
    #[serde(default)]
    pub nmap: Option<PathBuf>,
}

impl TargetSources {
    pub fn is_empty(&self) -> bool {
        self.subnet.is_none()
            && self.targets.is_none()
            && self.target.is_none()
            && self.shodan_query.is_none()
            && self.nmap.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSelection {
    #[serde(default = "default_profile_dir")]
    pub dir: PathBuf,

    /// Case-insensitive substring of the profile name
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub category: Option<String>,
}

impl Default for ProfileSelection {
    fn default() -> Self {
        Self {
            dir: default_profile_dir(),
            name: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unsupported output format: {}", other)),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_concurrency() -> usize {
    16
}

fn default_redirect_limit() -> usize {
    5
}

fn default_profile_dir() -> PathBuf {
    PathBuf::from("creds")
}
