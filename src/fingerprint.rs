// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::targets::Target;
use crate::types::CredentialProfile;

/// A distinct network probe. Two profiles that would send the same request
/// share one `Fingerprint`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub url: String,
    pub port: u16,
    pub ssl: bool,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
}

impl Fingerprint {
    pub fn scheme(&self) -> &'static str {
        if self.ssl {
            "https"
        } else {
            "http"
        }
    }

    /// Absolute probe URL for a target. A target that carries its own port
    /// overrides the fingerprint's default port.
    pub fn probe_url(&self, target: &Target) -> String {
        format!("{}://{}{}", self.scheme(), target.authority(self.port), self.url)
    }
}

/// Deduplicated probe set derived from the profile catalog, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct FingerprintCatalog {
    fingerprints: Vec<Fingerprint>,
    seen: HashSet<Fingerprint>,
}

impl FingerprintCatalog {
    pub fn from_profiles<P: Borrow<CredentialProfile>>(profiles: &[P]) -> Self {
        let mut catalog = Self::default();

        for profile in profiles {
            let profile: &CredentialProfile = profile.borrow();
            let spec = &profile.fingerprint;
            for url in &spec.url {
                let fingerprint = Fingerprint {
                    url: url.clone(),
                    port: spec.default_port,
                    ssl: spec.ssl,
                    headers: spec.headers.clone(),
                    cookies: spec.cookie.clone(),
                };
                if !catalog.insert(fingerprint) {
                    debug!("[Fingerprint] '{}' {} already queued", profile.name, url);
                }
            }
        }

        debug!(
            "[Fingerprint] {} distinct fingerprints from {} profiles",
            catalog.len(),
            profiles.len()
        );
        catalog
    }

    /// Returns false when a structurally equal fingerprint is already present
    pub fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        if self.seen.contains(&fingerprint) {
            return false;
        }
        self.seen.insert(fingerprint.clone());
        self.fingerprints.push(fingerprint);
        true
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fingerprint> {
        self.fingerprints.iter()
    }
}
