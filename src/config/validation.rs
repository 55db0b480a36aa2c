// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use ipnetwork::IpNetwork;
use validator::Validate;

use super::core::AppConfig;
use crate::errors::ProfileError;
use crate::types::CredentialProfile;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_app_config(config: &AppConfig) -> Result<()> {
        config.validate()
            .context("Configuration validation failed")?;

        Self::validate_scanner_config(config)?;
        Self::validate_target_sources(config)?;

        Ok(())
    }

    /// A scan run needs at least one place to take targets from.
    pub fn validate_scan_config(config: &AppConfig) -> Result<()> {
        Self::validate_app_config(config)?;

        if config.targets.is_empty() {
            return Err(anyhow::anyhow!(
                "No target source configured (subnet, targets, target, shodan_query or nmap)"
            ));
        }

        Ok(())
    }

    fn validate_scanner_config(config: &AppConfig) -> Result<()> {
        if config.scanner.max_concurrency == 0 {
            return Err(anyhow::anyhow!("Max concurrency must be greater than 0"));
        }

        if config.scanner.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Request timeout must be greater than 0"));
        }

        if let Some(ref proxy) = config.scanner.proxy {
            url::Url::parse(proxy)
                .with_context(|| format!("Proxy must be a URL: {}", proxy))?;
        }

        Ok(())
    }

    fn validate_target_sources(config: &AppConfig) -> Result<()> {
        let targets = &config.targets;

        if let Some(ref subnet) = targets.subnet {
            subnet.parse::<IpNetwork>()
                .map_err(|e| anyhow::anyhow!("Invalid subnet {}: {}", subnet, e))?;
        }

        if targets.shodan_query.is_some()
            && targets.shodan_key.as_deref().map_or(true, str::is_empty)
        {
            return Err(anyhow::anyhow!(
                "Shodan query requires an API key (shodan_key or SHODAN_API_KEY)"
            ));
        }

        Ok(())
    }

    /// Structural checks that serde cannot express
    pub fn validate_profile(profile: &CredentialProfile) -> Result<(), ProfileError> {
        let invalid = |reason: &str| ProfileError::Invalid {
            name: profile.name.clone(),
            reason: reason.to_string(),
        };

        if profile.name.trim().is_empty() {
            return Err(invalid("name cannot be empty"));
        }

        if profile.fingerprint.url.is_empty() {
            return Err(invalid("fingerprint needs at least one url"));
        }

        if profile.auth.url.is_empty() {
            return Err(invalid("auth needs at least one url"));
        }

        if let Some(path) = profile
            .fingerprint
            .url
            .iter()
            .chain(profile.auth.url.iter())
            .find(|p| !p.starts_with('/'))
        {
            return Err(invalid(&format!("url path must start with '/': {}", path)));
        }

        if profile.fingerprint.rule.is_empty() {
            return Err(invalid("fingerprint has no match conditions"));
        }

        if profile.auth.success.is_empty() {
            return Err(invalid("auth success rule has no conditions"));
        }

        if profile.credentials.is_empty() {
            return Err(invalid("no credentials to try"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(yaml: &str) -> CredentialProfile {
        serde_yaml::from_str(yaml).unwrap()
    }

    const VALID: &str = r#"
name: Generic Router
fingerprint:
  url: [/]
  body: ["Router Login"]
auth:
  type: post
  url: [/login.cgi]
  success: {status: 302}
credentials: [{username: admin, password: admin}]
"#;

    #[test]
    fn test_valid_profile() {
        assert!(ConfigValidator::validate_profile(&profile(VALID)).is_ok());
    }

    #[test]
    fn test_relative_path_rejected() {
        let p = profile(&VALID.replace("/login.cgi", "login.cgi"));
        let err = ConfigValidator::validate_profile(&p).unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let p = profile(&VALID.replace("[{username: admin, password: admin}]", "[]"));
        assert!(ConfigValidator::validate_profile(&p).is_err());
    }

    #[test]
    fn test_shodan_query_requires_key() {
        let mut config = AppConfig::default();
        config.targets.shodan_query = Some("title:router".to_string());
        assert!(ConfigValidator::validate_app_config(&config).is_err());

        config.targets.shodan_key = Some("k".to_string());
        assert!(ConfigValidator::validate_app_config(&config).is_ok());
    }

    #[test]
    fn test_scan_requires_target_source() {
        let mut config = AppConfig::default();
        assert!(ConfigValidator::validate_scan_config(&config).is_err());

        config.targets.target = Some("10.0.0.1".to_string());
        assert!(ConfigValidator::validate_scan_config(&config).is_ok());
    }

    #[test]
    fn test_bad_subnet_rejected() {
        let mut config = AppConfig::default();
        config.targets.subnet = Some("10.0.0.0/40".to_string());
        assert!(ConfigValidator::validate_app_config(&config).is_err());
    }
}
