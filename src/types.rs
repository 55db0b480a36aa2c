// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Credential profile data model.
//!
//! A profile bundles the HTTP signature of a product, the way its login works
//! and the default credentials to try. Profiles are deserialized from YAML and
//! stay immutable for the whole run.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::http_client::HttpResponse;

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialProfile {
    pub name: String,

    #[serde(default = "default_category")]
    pub category: String,

    pub fingerprint: FingerprintSpec,

    pub auth: AuthSpec,

    pub credentials: Vec<Credential>,
}

fn default_category() -> String {
    "web".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,

    #[serde(default)]
    pub password: String,
}

impl Credential {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// How to recognise a product from a single GET request
#[derive(Debug, Clone, Deserialize)]
pub struct FingerprintSpec {
    pub url: Vec<String>,

    #[serde(default = "default_port")]
    pub default_port: u16,

    #[serde(default)]
    pub ssl: bool,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub cookie: BTreeMap<String, String>,

    #[serde(flatten)]
    pub rule: MatchRule,
}

fn default_port() -> u16 {
    80
}

/// Signature predicate over a probe response.
///
/// Every configured condition must hold. A rule with no conditions never
/// matches, otherwise it would claim every live web server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchRule {
    #[serde(default)]
    pub status: Option<u16>,

    #[serde(default, deserialize_with = "deserialize_patterns")]
    pub body: Vec<Regex>,

    #[serde(default)]
    pub server_header: Option<String>,

    #[serde(default)]
    pub basic_auth_realm: Option<String>,
}

impl MatchRule {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.body.is_empty()
            && self.server_header.is_none()
            && self.basic_auth_realm.is_none()
    }

    pub fn is_match(&self, response: &HttpResponse) -> bool {
        if self.is_empty() {
            return false;
        }

        if let Some(status) = self.status {
            if response.status_code != status {
                return false;
            }
        }

        if !self.body.is_empty() && !self.body.iter().any(|re| re.is_match(&response.body)) {
            return false;
        }

        if let Some(ref server) = self.server_header {
            match response.header("server") {
                Some(value) if value.contains(server.as_str()) => {}
                _ => return false,
            }
        }

        if let Some(ref realm) = self.basic_auth_realm {
            match response.header("www-authenticate") {
                Some(value) if value.contains(realm.as_str()) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Login description: where to send credentials and how to judge the answer
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSpec {
    pub url: Vec<String>,

    pub success: SuccessRule,

    #[serde(flatten)]
    pub method: AuthMethod,
}

impl AuthSpec {
    /// Name of the hidden form field carrying the anti-forgery token, if any.
    pub fn csrf_field(&self) -> Option<&str> {
        match &self.method {
            AuthMethod::Post { csrf, .. } => csrf.as_deref(),
            AuthMethod::Get { .. } | AuthMethod::Basic => None,
        }
    }
}

/// Closed set of supported login protocols, selected by the `type` key.
///
/// An unknown `type` fails deserialization, so a misconfigured profile is
/// rejected at load time instead of silently producing no attempts.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMethod {
    Get {
        #[serde(default)]
        fields: LoginFields,

        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    Post {
        #[serde(default)]
        fields: LoginFields,

        #[serde(default)]
        csrf: Option<String>,

        #[serde(default)]
        form: BTreeMap<String, String>,
    },
    #[serde(alias = "basic_auth")]
    Basic,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Get { .. } => "get",
            AuthMethod::Post { .. } => "post",
            AuthMethod::Basic => "basic",
        }
    }
}

/// Parameter names for the username and password
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginFields {
    #[serde(default = "default_username_field")]
    pub username: String,

    #[serde(default = "default_password_field")]
    pub password: String,
}

impl Default for LoginFields {
    fn default() -> Self {
        Self {
            username: default_username_field(),
            password: default_password_field(),
        }
    }
}

fn default_username_field() -> String {
    "username".to_string()
}

fn default_password_field() -> String {
    "password".to_string()
}

/// Decides whether an authentication attempt got in
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuccessRule {
    #[serde(default)]
    pub status: Option<u16>,

    #[serde(default, deserialize_with = "deserialize_patterns")]
    pub body: Vec<Regex>,
}

impl SuccessRule {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.body.is_empty()
    }

    /// Returns the evidence for a successful login, or `None`.
    pub fn evaluate(&self, response: &HttpResponse) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        if let Some(status) = self.status {
            if response.status_code != status {
                return None;
            }
        }

        if self.body.is_empty() {
            return Some(format!("HTTP {}", response.status_code));
        }

        self.body
            .iter()
            .find_map(|re| re.find(&response.body))
            .map(|m| format!("HTTP {} body matched '{}'", response.status_code, m.as_str()))
    }
}

fn deserialize_patterns<'de, D>(deserializer: D) -> Result<Vec<Regex>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    raw.iter()
        .map(|p| Regex::new(p).map_err(serde::de::Error::custom))
        .collect()
}

/// A confirmed default-credential login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub profile: String,
    pub category: String,
    pub target: String,
    pub url: String,
    pub auth_type: String,
    pub username: String,
    pub password: String,
    pub evidence: String,
    pub found_at: String,
}
