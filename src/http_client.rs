// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, RequestBuilder};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::ScannerConfig;
use crate::errors::NetworkError;

/// Maximum response body size (10MB) to prevent memory exhaustion
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings shared by every session of a run
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl SessionSettings {
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_secs),
            proxy: config.proxy.clone(),
            max_redirects: config.max_redirects,
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            proxy: None,
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// One cookie-carrying HTTP session.
///
/// Certificate verification is always off: the audited devices are mostly
/// appliances with self-signed certificates.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    jar: Arc<Jar>,
    settings: SessionSettings,
    max_body_size: usize,
}

impl HttpClient {
    pub fn new(settings: &SessionSettings) -> Result<Self> {
        Self::with_jar(settings, Arc::new(Jar::default()))
    }

    fn with_jar(settings: &SessionSettings, jar: Arc<Jar>) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .user_agent(settings.user_agent.as_str())
            .cookie_provider(Arc::clone(&jar))
            .tcp_nodelay(true);

        // Only the configured proxy is used, never the HTTP_PROXY family
        builder = match settings.proxy {
            Some(ref proxy) => builder.proxy(
                reqwest::Proxy::all(proxy.as_str())
                    .with_context(|| format!("Invalid proxy URL: {}", proxy))?,
            ),
            None => builder.no_proxy(),
        };

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            jar,
            settings: settings.clone(),
            max_body_size: MAX_BODY_SIZE,
        })
    }

    /// New session holding a copy of the cookies this one would send to `url`.
    ///
    /// Cookies the fork receives afterwards stay in the fork.
    pub fn fork(&self, url: &Url) -> Result<Self> {
        let jar = Jar::default();
        if let Some(header) = self.jar.cookies(url) {
            let header = header.to_str().context("Non-ASCII cookie header")?;
            for pair in header.split("; ").filter(|pair| !pair.is_empty()) {
                jar.add_cookie_str(&format!("{}; Path=/", pair), url);
            }
        }
        Self::with_jar(&self.settings, Arc::new(jar))
    }

    /// GET with extra headers and cookies attached
    pub async fn get(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        cookies: &BTreeMap<String, String>,
    ) -> Result<HttpResponse, NetworkError> {
        let mut request = self.client.get(url);
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(cookie) = cookie_header(cookies) {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        self.execute(request).await
    }

    /// GET with query parameters
    pub async fn get_with_query(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &BTreeMap<String, String>,
    ) -> Result<HttpResponse, NetworkError> {
        let mut request = self.client.get(url).query(query);
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }
        self.execute(request).await
    }

    /// POST an `application/x-www-form-urlencoded` body
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<HttpResponse, NetworkError> {
        self.execute(self.client.post(url).form(form)).await
    }

    /// GET with HTTP Basic credentials
    pub async fn get_basic_auth(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<HttpResponse, NetworkError> {
        self.execute(self.client.get(url).basic_auth(username, Some(password)))
            .await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<HttpResponse, NetworkError> {
        let response = request.send().await.map_err(|e| self.classify(&e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().clone();

        let headers = {
            let headers = response.headers();
            let mut map = HashMap::with_capacity(headers.len());
            for (k, v) in headers.iter() {
                if let Ok(value_str) = v.to_str() {
                    map.insert(k.as_str().to_string(), value_str.to_string());
                }
            }
            map
        };

        let body_bytes = response.bytes().await.map_err(|e| self.classify(&e))?;
        let body = if body_bytes.len() > self.max_body_size {
            String::from_utf8_lossy(&body_bytes[..self.max_body_size]).to_string()
        } else {
            String::from_utf8_lossy(&body_bytes).to_string()
        };

        debug!("{} -> HTTP {} ({}B)", final_url, status_code, body.len());

        Ok(HttpResponse {
            status_code,
            body,
            headers,
            url: final_url,
        })
    }
}

impl HttpClient {
    fn classify(&self, err: &reqwest::Error) -> NetworkError {
        NetworkError::classify(err, self.settings.timeout, self.settings.max_redirects)
    }
}

fn cookie_header(cookies: &BTreeMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        None
    } else {
        Some(
            cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
    /// Header names are lowercase
    pub headers: HashMap<String, String>,
    /// Effective URL after redirects
    pub url: Url,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// `scheme://host[:port]` of the effective URL
    pub fn base_url(&self) -> String {
        base_url(&self.url)
    }
}

pub fn base_url(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Sessions keyed by target origin.
///
/// Probes against one origin share a session. Authentication attempts run
/// on forks of it, so cookies never leak between attempts or targets.
pub struct SessionPool {
    settings: SessionSettings,
    sessions: Mutex<HashMap<String, Arc<HttpClient>>>,
}

impl SessionPool {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn session_for(&self, origin: &str) -> Result<Arc<HttpClient>> {
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get(origin) {
            return Ok(Arc::clone(session));
        }
        let session = Arc::new(HttpClient::new(&self.settings)?);
        sessions.insert(origin.to_string(), Arc::clone(&session));
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
