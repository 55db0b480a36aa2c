// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::collections::BTreeMap;
use tracing::debug;

use super::UnitContext;
use crate::errors::NetworkError;
use crate::types::{LoginFields, ScanResult};

/// Form login. Submits the static form fields, the credential pair and the
/// anti-forgery token when one was extracted from the matched page.
pub struct HttpPostScanner {
    pub(crate) ctx: UnitContext,
    fields: LoginFields,
    form: BTreeMap<String, String>,
    /// `(field name, token value)`
    pub(crate) csrf: Option<(String, String)>,
}

impl HttpPostScanner {
    pub fn new(
        ctx: UnitContext,
        fields: LoginFields,
        form: BTreeMap<String, String>,
        csrf: Option<(String, String)>,
    ) -> Self {
        Self {
            ctx,
            fields,
            form,
            csrf,
        }
    }

    fn form_body(&self) -> Vec<(String, String)> {
        let credential = &self.ctx.credential;
        let mut body: Vec<(String, String)> = self.ctx.render_map(&self.form).into_iter().collect();
        body.push((self.fields.username.clone(), credential.username.clone()));
        body.push((self.fields.password.clone(), credential.password.clone()));
        if let Some((ref field, ref token)) = self.csrf {
            body.push((field.clone(), token.clone()));
        }
        body
    }

    pub async fn scan(&self) -> Result<Option<ScanResult>, NetworkError> {
        let response = self
            .ctx
            .session
            .post_form(&self.ctx.url, &self.form_body())
            .await?;

        let outcome = self.ctx.profile.auth.success.evaluate(&response);
        debug!(
            "[Dispatch] POST {} {}: HTTP {} {}",
            self.ctx.url,
            self.ctx.credential.username,
            response.status_code,
            if outcome.is_some() { "success" } else { "rejected" }
        );

        Ok(outcome.map(|evidence| self.ctx.success(evidence)))
    }
}
