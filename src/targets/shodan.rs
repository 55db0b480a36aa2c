// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shodan host search client.
//!
//! API: `GET https://api.shodan.io/shodan/host/search?key=API_KEY&query=QUERY`

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::TargetError;

pub const DEFAULT_SHODAN_URL: &str = "https://api.shodan.io";

#[derive(Debug, Deserialize)]
struct HostSearchResponse {
    #[serde(default)]
    matches: Vec<HostMatch>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct HostMatch {
    ip_str: String,
}

pub struct ShodanClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ShodanClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, TargetError> {
        if api_key.trim().is_empty() {
            return Err(TargetError::MissingShodanKey);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TargetError::ShodanService {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: DEFAULT_SHODAN_URL.to_string(),
        })
    }

    /// Point the client at another API root (self-hosted mirror or a test server)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns `ip_str` of every match on the first result page
    pub async fn search(&self, query: &str) -> Result<Vec<String>, TargetError> {
        let url = format!("{}/shodan/host/search", self.base_url);
        debug!("[Targets] Shodan search: {}", query);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("query", query)])
            .send()
            .await
            .map_err(|e| TargetError::ShodanService {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(TargetError::ShodanAuth {
                status_code: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(TargetError::ShodanService {
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let body: HostSearchResponse =
            response.json().await.map_err(|e| TargetError::ShodanService {
                reason: format!("malformed response: {}", e),
            })?;

        info!(
            "[Targets] Shodan returned {} of {} total matches",
            body.matches.len(),
            body.total
        );

        Ok(body.matches.into_iter().map(|m| m.ip_str).collect())
    }
}
