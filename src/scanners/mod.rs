// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Authentication attempt units.
//!
//! A unit is one credential pair against one resolved login URL. Its session
//! is a fork of the one that matched the fingerprint, so cookies from the
//! matched page come along and cookies from sibling attempts do not.
//! [`ScannerFactory::build`] picks the variant from the profile's auth method
//! with an exhaustive match.

pub mod http_basic;
pub mod http_get;
pub mod http_post;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::NetworkError;
use crate::http_client::HttpClient;
use crate::targets::Target;
use crate::types::{AuthMethod, Credential, CredentialProfile, ScanResult};

pub use http_basic::HttpBasicScanner;
pub use http_get::HttpGetScanner;
pub use http_post::HttpPostScanner;

/// State shared by every unit variant
#[derive(Clone)]
pub struct UnitContext {
    pub profile: Arc<CredentialProfile>,
    pub target: Target,
    pub url: String,
    pub credential: Credential,
    pub session: Arc<HttpClient>,
}

impl UnitContext {
    fn success(&self, evidence: String) -> ScanResult {
        ScanResult {
            profile: self.profile.name.clone(),
            category: self.profile.category.clone(),
            target: self.target.to_string(),
            url: self.url.clone(),
            auth_type: self.profile.auth.method.as_str().to_string(),
            username: self.credential.username.clone(),
            password: self.credential.password.clone(),
            evidence,
            found_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Substitute `{username}` / `{password}` placeholders
    fn render(&self, template: &str) -> String {
        template
            .replace("{username}", &self.credential.username)
            .replace("{password}", &self.credential.password)
    }

    fn render_map(&self, values: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        values
            .iter()
            .map(|(k, v)| (k.clone(), self.render(v)))
            .collect()
    }
}

pub enum ScannerUnit {
    Get(HttpGetScanner),
    Post(HttpPostScanner),
    Basic(HttpBasicScanner),
}

impl ScannerUnit {
    /// Run the attempt. `Ok(None)` means the server answered but the login failed.
    pub async fn scan(&self) -> Result<Option<ScanResult>, NetworkError> {
        match self {
            ScannerUnit::Get(scanner) => scanner.scan().await,
            ScannerUnit::Post(scanner) => scanner.scan().await,
            ScannerUnit::Basic(scanner) => scanner.scan().await,
        }
    }

    pub fn context(&self) -> &UnitContext {
        match self {
            ScannerUnit::Get(scanner) => &scanner.ctx,
            ScannerUnit::Post(scanner) => &scanner.ctx,
            ScannerUnit::Basic(scanner) => &scanner.ctx,
        }
    }

    pub fn auth_type(&self) -> &'static str {
        match self {
            ScannerUnit::Get(_) => "get",
            ScannerUnit::Post(_) => "post",
            ScannerUnit::Basic(_) => "basic",
        }
    }

    /// One-line summary for dry runs and logs
    pub fn describe(&self) -> String {
        let ctx = self.context();
        format!(
            "{} {} {} {}:{}",
            ctx.profile.name,
            self.auth_type().to_uppercase(),
            ctx.url,
            ctx.credential.username,
            ctx.credential.password
        )
    }
}

pub struct ScannerFactory;

impl ScannerFactory {
    /// Pure construction, no I/O. The CSRF token is only carried by POST units.
    pub fn build(
        profile: &Arc<CredentialProfile>,
        credential: &Credential,
        target: &Target,
        url: String,
        session: Arc<HttpClient>,
        csrf_token: Option<String>,
    ) -> ScannerUnit {
        let ctx = UnitContext {
            profile: Arc::clone(profile),
            target: target.clone(),
            url,
            credential: credential.clone(),
            session,
        };

        match &profile.auth.method {
            AuthMethod::Get { fields, headers } => {
                ScannerUnit::Get(HttpGetScanner::new(ctx, fields.clone(), headers.clone()))
            }
            AuthMethod::Post { fields, csrf, form } => {
                let token = csrf
                    .as_ref()
                    .and_then(|field| csrf_token.map(|value| (field.clone(), value)));
                ScannerUnit::Post(HttpPostScanner::new(ctx, fields.clone(), form.clone(), token))
            }
            AuthMethod::Basic => ScannerUnit::Basic(HttpBasicScanner::new(ctx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::SessionSettings;

    fn profile(auth: &str) -> Arc<CredentialProfile> {
        let yaml = format!(
            r#"
name: Test Device
fingerprint:
  url: [/]
  status: 200
auth:
{auth}
  url: [/login]
  success: {{status: 200}}
credentials: [{{username: admin, password: "1234"}}]
"#
        );
        Arc::new(serde_yaml::from_str(&yaml).unwrap())
    }

    fn build(profile: &Arc<CredentialProfile>, csrf: Option<String>) -> ScannerUnit {
        let session = Arc::new(HttpClient::new(&SessionSettings::default()).unwrap());
        ScannerFactory::build(
            profile,
            &profile.credentials[0],
            &Target::new("10.0.0.1", None),
            "http://10.0.0.1:80/login".to_string(),
            session,
            csrf,
        )
    }

    #[test]
    fn test_factory_selects_variant() {
        assert_eq!(build(&profile("  type: get"), None).auth_type(), "get");
        assert_eq!(build(&profile("  type: post"), None).auth_type(), "post");
        assert_eq!(build(&profile("  type: basic_auth"), None).auth_type(), "basic");
    }

    #[test]
    fn test_post_carries_csrf_token() {
        let p = profile("  type: post\n  csrf: token");
        match build(&p, Some("abc".to_string())) {
            ScannerUnit::Post(scanner) => {
                assert_eq!(scanner.csrf, Some(("token".to_string(), "abc".to_string())))
            }
            _ => panic!("expected POST unit"),
        }

        match build(&p, None) {
            ScannerUnit::Post(scanner) => assert!(scanner.csrf.is_none()),
            _ => panic!("expected POST unit"),
        }
    }

    #[test]
    fn test_render_placeholders() {
        let unit = build(&profile("  type: get"), None);
        let ctx = unit.context();
        assert_eq!(ctx.render("Basic {username}:{password}"), "Basic admin:1234");
        assert!(unit.describe().contains("GET http://10.0.0.1:80/login admin:1234"));
    }
}
