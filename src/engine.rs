// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Credential Scan Engine
 * Target resolution, fingerprint matching and login dispatch for one run
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::{AppConfig, ConfigValidator};
use crate::dispatcher::{DispatchStats, ResultSink, ScanDispatcher, DEFAULT_SINK_CAPACITY};
use crate::errors::{ScannerError, ScannerResult};
use crate::fingerprint::FingerprintCatalog;
use crate::http_client::{SessionPool, SessionSettings};
use crate::matcher::{FingerprintMatcher, ProfileMatch};
use crate::targets::TargetResolver;
use crate::types::{CredentialProfile, ScanResult};

/// Outcome of one engine run
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub targets: usize,
    pub fingerprints: usize,
    pub probes_sent: usize,
    pub probe_failures: usize,
    pub matches: Vec<ProfileMatch>,
    /// Human-readable description of every constructed attempt
    pub planned_attempts: Vec<String>,
    pub dispatch: DispatchStats,
    pub results: Vec<ScanResult>,
    pub duration: Duration,
}

/// One stateless pass: targets and fingerprints are computed once per `run`
/// and never re-resolved mid-scan.
pub struct ScanEngine {
    config: AppConfig,
    profiles: Arc<Vec<Arc<CredentialProfile>>>,
    shodan_base_url: Option<String>,
}

impl ScanEngine {
    /// Validates the configuration up front so nothing touches the network
    /// when a fatal setting is wrong.
    pub fn new(config: AppConfig, profiles: Vec<CredentialProfile>) -> ScannerResult<Self> {
        ConfigValidator::validate_scan_config(&config)
            .map_err(|e| ScannerError::Configuration(format!("{:#}", e)))?;

        if profiles.is_empty() {
            return Err(ScannerError::Configuration(format!(
                "No credential profiles loaded from {}",
                config.profiles.dir.display()
            )));
        }

        Ok(Self {
            config,
            profiles: Arc::new(profiles.into_iter().map(Arc::new).collect()),
            shodan_base_url: None,
        })
    }

    pub fn with_shodan_base_url(mut self, base_url: &str) -> Self {
        self.shodan_base_url = Some(base_url.to_string());
        self
    }

    pub fn profiles(&self) -> &[Arc<CredentialProfile>] {
        &self.profiles
    }

    pub async fn run(&self) -> ScannerResult<ScanSummary> {
        let start = Instant::now();
        let scanner = &self.config.scanner;
        let timeout = Duration::from_secs(scanner.request_timeout_secs);

        let mut resolver = TargetResolver::new(self.config.targets.clone(), timeout)?;
        if let Some(ref base_url) = self.shodan_base_url {
            resolver = resolver.with_shodan_base_url(base_url);
        }
        let targets = resolver.resolve().await?;
        info!("[Engine] {} targets resolved", targets.len());

        let catalog = FingerprintCatalog::from_profiles(self.profiles.as_slice());
        info!(
            "[Engine] {} fingerprints from {} profiles",
            catalog.len(),
            self.profiles.len()
        );

        let sessions = Arc::new(SessionPool::new(SessionSettings::from_config(scanner)));
        let matcher = FingerprintMatcher::new(
            Arc::clone(&self.profiles),
            Arc::clone(&sessions),
            scanner.max_concurrency,
        );
        let report = matcher.probe_all(&targets, &catalog).await;

        let mut summary = ScanSummary {
            targets: targets.len(),
            fingerprints: catalog.len(),
            probes_sent: report.probes_sent,
            probe_failures: report.probe_failures,
            matches: report.matches,
            planned_attempts: report.units.iter().map(|u| u.describe()).collect(),
            ..Default::default()
        };

        if scanner.fingerprint_only {
            info!(
                "[Engine] Fingerprint-only run: {} attempts not sent",
                report.units.len()
            );
            summary.duration = start.elapsed();
            return Ok(summary);
        }

        let (sink, collector) = ResultSink::channel(DEFAULT_SINK_CAPACITY);
        let collected = collector.spawn();

        let dispatcher = ScanDispatcher::new(scanner.max_concurrency);
        summary.dispatch = dispatcher.dispatch(report.units, &sink).await;
        drop(sink);

        let mut results = collected
            .await
            .map_err(|e| ScannerError::Internal(format!("result collector failed: {}", e)))?;
        results.sort_by(|a, b| {
            (&a.target, &a.profile, &a.url, &a.username)
                .cmp(&(&b.target, &b.profile, &b.url, &b.username))
        });
        summary.results = results;
        summary.duration = start.elapsed();

        info!(
            "[Engine] Scan finished in {:.1}s: {} valid credentials across {} sessions",
            summary.duration.as_secs_f64(),
            summary.results.len(),
            sessions.len()
        );
        Ok(summary)
    }
}
