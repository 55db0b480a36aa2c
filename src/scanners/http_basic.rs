// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use tracing::debug;

use super::UnitContext;
use crate::errors::NetworkError;
use crate::types::ScanResult;

/// HTTP Basic authentication
pub struct HttpBasicScanner {
    pub(crate) ctx: UnitContext,
}

impl HttpBasicScanner {
    pub fn new(ctx: UnitContext) -> Self {
        Self { ctx }
    }

    pub async fn scan(&self) -> Result<Option<ScanResult>, NetworkError> {
        let credential = &self.ctx.credential;
        let response = self
            .ctx
            .session
            .get_basic_auth(&self.ctx.url, &credential.username, &credential.password)
            .await?;

        // A 401 is always a rejection, whatever the success rule says
        if response.status_code == 401 {
            debug!("[Dispatch] BASIC {} {}: rejected", self.ctx.url, credential.username);
            return Ok(None);
        }

        let outcome = self.ctx.profile.auth.success.evaluate(&response);
        debug!(
            "[Dispatch] BASIC {} {}: HTTP {} {}",
            self.ctx.url,
            credential.username,
            response.status_code,
            if outcome.is_some() { "success" } else { "rejected" }
        );

        Ok(outcome.map(|evidence| self.ctx.success(evidence)))
    }
}
