// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Fingerprint Matcher
 * Probes every (target, fingerprint) pair and turns matching responses into
 * authentication attempt units
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::csrf::CsrfExtractor;
use crate::fingerprint::{Fingerprint, FingerprintCatalog};
use crate::http_client::{HttpClient, HttpResponse, SessionPool};
use crate::scanners::{ScannerFactory, ScannerUnit};
use crate::targets::{Target, TargetSet};
use crate::types::CredentialProfile;

/// A profile whose signature was found on a target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileMatch {
    pub profile: String,
    pub target: Target,
    pub url: String,
}

#[derive(Default)]
pub struct MatchReport {
    /// HTTP probes actually sent
    pub probes_sent: usize,
    /// Probes that ended in a transport error
    pub probe_failures: usize,
    pub matches: Vec<ProfileMatch>,
    pub units: Vec<ScannerUnit>,
}

#[derive(Default)]
struct ProbeOutcome {
    failed: bool,
    matches: Vec<ProfileMatch>,
    units: Vec<ScannerUnit>,
}

pub struct FingerprintMatcher {
    profiles: Arc<Vec<Arc<CredentialProfile>>>,
    sessions: Arc<SessionPool>,
    max_concurrency: usize,
    probes_sent: AtomicUsize,
}

impl FingerprintMatcher {
    pub fn new(
        profiles: Arc<Vec<Arc<CredentialProfile>>>,
        sessions: Arc<SessionPool>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            profiles,
            sessions,
            max_concurrency: max_concurrency.max(1),
            probes_sent: AtomicUsize::new(0),
        }
    }

    /// Probe the full cross product of targets and fingerprints.
    ///
    /// A transport failure only skips its own pair. Every response is tested
    /// against every profile, so one page can yield units for several profiles.
    ///
    /// Fingerprints that only differ in their default port collapse onto one
    /// URL for a target with a pinned port. Their matches and units are kept
    /// once per (profile, login URL, credential).
    pub async fn probe_all(&self, targets: &TargetSet, catalog: &FingerprintCatalog) -> MatchReport {
        let pairs: Vec<(&Target, &Fingerprint)> = targets
            .iter()
            .flat_map(|target| catalog.iter().map(move |fp| (target, fp)))
            .collect();

        info!(
            "[Matcher] Probing {} targets x {} fingerprints ({} requests, concurrency {})",
            targets.len(),
            catalog.len(),
            pairs.len(),
            self.max_concurrency
        );

        let sent_before = self.probes_sent.load(Ordering::Relaxed);

        let outcomes: Vec<ProbeOutcome> = stream::iter(pairs)
            .map(|(target, fingerprint)| self.probe(target, fingerprint))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut report = MatchReport {
            probes_sent: self.probes_sent.load(Ordering::Relaxed) - sent_before,
            ..Default::default()
        };
        let mut seen_matches = HashSet::new();
        let mut seen_units = HashSet::new();
        for outcome in outcomes {
            if outcome.failed {
                report.probe_failures += 1;
            }
            for m in outcome.matches {
                if seen_matches.insert(m.clone()) {
                    report.matches.push(m);
                }
            }
            for unit in outcome.units {
                if seen_units.insert(unit_key(&unit)) {
                    report.units.push(unit);
                }
            }
        }

        info!(
            "[Matcher] {} probes sent, {} failed, {} matches, {} attempts queued",
            report.probes_sent,
            report.probe_failures,
            report.matches.len(),
            report.units.len()
        );
        report
    }

    async fn probe(&self, target: &Target, fingerprint: &Fingerprint) -> ProbeOutcome {
        let origin = format!("{}://{}", fingerprint.scheme(), target.authority(fingerprint.port));
        let session = match self.sessions.session_for(&origin) {
            Ok(session) => session,
            Err(e) => {
                warn!("[Matcher] No session for {}: {:#}", origin, e);
                return ProbeOutcome {
                    failed: true,
                    ..Default::default()
                };
            }
        };

        let url = fingerprint.probe_url(target);
        self.probes_sent.fetch_add(1, Ordering::Relaxed);

        let response = match session
            .get(&url, &fingerprint.headers, &fingerprint.cookies)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("[Matcher] {} failed ({}): {}", url, e.kind(), e);
                return ProbeOutcome {
                    failed: true,
                    ..Default::default()
                };
            }
        };

        let mut outcome = ProbeOutcome::default();
        for profile in self.profiles.iter() {
            if !profile.fingerprint.rule.is_match(&response) {
                continue;
            }

            info!("[Matcher] {} matched '{}'", url, profile.name);
            outcome.matches.push(ProfileMatch {
                profile: profile.name.clone(),
                target: target.clone(),
                url: url.clone(),
            });
            outcome
                .units
                .extend(self.build_units(profile, target, &response, &session));
        }

        outcome
    }

    fn build_units(
        &self,
        profile: &Arc<CredentialProfile>,
        target: &Target,
        response: &HttpResponse,
        session: &Arc<HttpClient>,
    ) -> Vec<ScannerUnit> {
        let csrf = profile
            .auth
            .csrf_field()
            .and_then(|field| CsrfExtractor::extract(response, field));

        // Login URLs hang off the effective (post-redirect) URL of the match
        let base = response.base_url();

        let mut units = Vec::with_capacity(profile.credentials.len() * profile.auth.url.len());
        for credential in &profile.credentials {
            for path in &profile.auth.url {
                // Each attempt starts from the cookies of the matched page
                let attempt_session = match session.fork(&response.url) {
                    Ok(fork) => Arc::new(fork),
                    Err(e) => {
                        warn!("[Matcher] Cannot fork session for {}: {:#}", response.url, e);
                        continue;
                    }
                };
                units.push(ScannerFactory::build(
                    profile,
                    credential,
                    target,
                    format!("{}{}", base, path),
                    attempt_session,
                    csrf.clone(),
                ));
            }
        }
        units
    }
}

fn unit_key(unit: &ScannerUnit) -> (String, String, String, String, String) {
    let ctx = unit.context();
    (
        ctx.target.to_string(),
        ctx.profile.name.clone(),
        ctx.url.clone(),
        ctx.credential.username.clone(),
        ctx.credential.password.clone(),
    )
}
