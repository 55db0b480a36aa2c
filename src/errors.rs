// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Credential Audit Error Types
 * Fatal target/profile errors and classified per-probe network failures
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use std::error::Error as StdError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error for a credential audit run
#[derive(Error, Debug)]
pub enum ScannerError {
    /// Target resolution errors (always fatal)
    #[error("Target error: {0}")]
    Target(#[from] TargetError),

    /// Credential profile errors (always fatal)
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Report output errors
    #[error("Report error: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Network-specific errors with detailed classification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Connection timeout after {timeout:?} to {url}")]
    ConnectionTimeout {
        url: String,
        timeout: Duration,
    },

    #[error("DNS resolution failed for {host}: {reason}")]
    DnsResolutionFailed {
        host: String,
        reason: String,
    },

    #[error("TLS handshake failed for {host}: {reason}")]
    TlsHandshakeFailed {
        host: String,
        reason: String,
    },

    #[error("Connection reset by peer for {url}")]
    ConnectionReset {
        url: String,
    },

    #[error("Connection refused for {url}")]
    ConnectionRefused {
        url: String,
    },

    #[error("Proxy error: {reason}")]
    ProxyError {
        reason: String,
    },

    #[error("Too many redirects (>{max_redirects}) for {url}")]
    TooManyRedirects {
        url: String,
        max_redirects: usize,
    },

    #[error("Invalid URL: {url}")]
    InvalidUrl {
        url: String,
    },

    #[error("Network error: {0}")]
    Other(String),
}

/// Errors raised while populating the target set
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Failed to read target list {path:?}: {source}")]
    ListFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid subnet {subnet}: {reason}")]
    InvalidSubnet {
        subnet: String,
        reason: String,
    },

    #[error("Invalid target {target}: {reason}")]
    InvalidTarget {
        target: String,
        reason: String,
    },

    #[error("Shodan query configured but no API key supplied")]
    MissingShodanKey,

    #[error("Shodan rejected the API key (HTTP {status_code})")]
    ShodanAuth {
        status_code: u16,
    },

    #[error("Shodan search failed: {reason}")]
    ShodanService {
        reason: String,
    },

    #[error("Failed to parse Nmap report {path:?}: {reason}")]
    NmapReport {
        path: PathBuf,
        reason: String,
    },
}

/// Errors raised while loading credential profiles
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profile {path:?}: {reason}")]
    Parse {
        path: PathBuf,
        reason: String,
    },

    #[error("Invalid profile '{name}': {reason}")]
    Invalid {
        name: String,
        reason: String,
    },
}

impl NetworkError {
    /// Map a reqwest failure onto an explicit failure kind.
    ///
    /// reqwest only exposes coarse predicates, so DNS and TLS failures are
    /// recognised from the source chain of the underlying hyper/io error.
    pub fn classify(err: &reqwest::Error, timeout: Duration, max_redirects: usize) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        let host = err
            .url()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        let chain = error_chain(err);
        let chain_lower = chain.to_lowercase();

        if err.is_timeout() || chain_lower.contains("timed out") {
            return NetworkError::ConnectionTimeout { url, timeout };
        }

        if err.is_redirect() {
            return NetworkError::TooManyRedirects { url, max_redirects };
        }

        if err.is_builder() {
            return NetworkError::InvalidUrl { url };
        }

        if chain_lower.contains("dns error")
            || chain_lower.contains("failed to lookup address")
            || chain_lower.contains("name or service not known")
        {
            return NetworkError::DnsResolutionFailed { host, reason: chain };
        }

        if chain_lower.contains("certificate")
            || chain_lower.contains("tls")
            || chain_lower.contains("ssl")
            || chain_lower.contains("handshake")
        {
            return NetworkError::TlsHandshakeFailed { host, reason: chain };
        }

        if chain_lower.contains("proxy") {
            return NetworkError::ProxyError { reason: chain };
        }

        if chain_lower.contains("connection refused") {
            return NetworkError::ConnectionRefused { url };
        }

        if chain_lower.contains("connection reset") || chain_lower.contains("broken pipe") {
            return NetworkError::ConnectionReset { url };
        }

        if err.is_connect() {
            return NetworkError::ConnectionRefused { url };
        }

        NetworkError::Other(chain)
    }

    /// Short label used in structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkError::ConnectionTimeout { .. } => "timeout",
            NetworkError::DnsResolutionFailed { .. } => "dns",
            NetworkError::TlsHandshakeFailed { .. } => "tls",
            NetworkError::ConnectionReset { .. } => "reset",
            NetworkError::ConnectionRefused { .. } => "refused",
            NetworkError::ProxyError { .. } => "proxy",
            NetworkError::TooManyRedirects { .. } => "redirects",
            NetworkError::InvalidUrl { .. } => "invalid_url",
            NetworkError::Other(_) => "other",
        }
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

/// Result type for scanner operations
pub type ScannerResult<T> = Result<T, ScannerError>;
