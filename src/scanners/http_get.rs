// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::collections::BTreeMap;
use tracing::debug;

use super::UnitContext;
use crate::errors::NetworkError;
use crate::types::{LoginFields, ScanResult};

/// Credentials as query parameters, optionally echoed into request headers
pub struct HttpGetScanner {
    pub(crate) ctx: UnitContext,
    fields: LoginFields,
    headers: BTreeMap<String, String>,
}

impl HttpGetScanner {
    pub fn new(ctx: UnitContext, fields: LoginFields, headers: BTreeMap<String, String>) -> Self {
        Self {
            ctx,
            fields,
            headers,
        }
    }

    pub async fn scan(&self) -> Result<Option<ScanResult>, NetworkError> {
        let credential = &self.ctx.credential;
        let query = vec![
            (self.fields.username.clone(), credential.username.clone()),
            (self.fields.password.clone(), credential.password.clone()),
        ];
        let headers = self.ctx.render_map(&self.headers);

        let response = self
            .ctx
            .session
            .get_with_query(&self.ctx.url, &query, &headers)
            .await?;

        let outcome = self.ctx.profile.auth.success.evaluate(&response);
        debug!(
            "[Dispatch] GET {} {}: HTTP {} {}",
            self.ctx.url,
            credential.username,
            response.status_code,
            if outcome.is_some() { "success" } else { "rejected" }
        );

        Ok(outcome.map(|evidence| self.ctx.success(evidence)))
    }
}
