// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Target Resolution
 * Builds the deduplicated target set from CIDR blocks, list files, literal
 * targets, Shodan searches and Nmap reports
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

pub mod cidr;
pub mod nmap;
pub mod shodan;

use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv6Addr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TargetSources;
use crate::errors::TargetError;
use shodan::ShodanClient;

/// A host, optionally pinned to a port
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target {
    pub host: String,
    pub port: Option<u16>,
}

impl Target {
    pub fn new(host: &str, port: Option<u16>) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    fn is_ipv6(&self) -> bool {
        self.host.parse::<Ipv6Addr>().is_ok()
    }

    /// `host:port` for URL construction, using the target's own port when it has one
    pub fn authority(&self, default_port: u16) -> String {
        let port = self.port.unwrap_or(default_port);
        if self.is_ipv6() {
            format!("[{}]:{}", self.host, port)
        } else {
            format!("{}:{}", self.host, port)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) if self.is_ipv6() => write!(f, "[{}]:{}", self.host, port),
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = |reason: &str| TargetError::InvalidTarget {
            target: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("empty target"));
        }
        if raw.contains("://") || raw.contains('/') {
            return Err(invalid("expected host or host:port"));
        }

        // [v6]:port or [v6]
        if let Some(rest) = raw.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| invalid("unterminated '['"))?;
            host.parse::<Ipv6Addr>()
                .map_err(|_| invalid("invalid IPv6 address"))?;
            let port = match tail.strip_prefix(':') {
                Some(p) => Some(parse_port(p).ok_or_else(|| invalid("invalid port"))?),
                None if tail.is_empty() => None,
                None => return Err(invalid("unexpected characters after ']'")),
            };
            return Ok(Target::new(host, port));
        }

        if raw.parse::<Ipv6Addr>().is_ok() {
            return Ok(Target::new(raw, None));
        }

        match raw.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(invalid("missing host"));
                }
                let port = parse_port(port).ok_or_else(|| invalid("invalid port"))?;
                Ok(Target::new(host, Some(port)))
            }
            None => Ok(Target::new(raw, None)),
        }
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.parse::<u16>().ok().filter(|p| *p != 0)
}

/// Ordered, duplicate-free collection of targets. Read-only once resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    targets: BTreeSet<Target>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: Target) -> bool {
        self.targets.insert(target)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn contains(&self, target: &Target) -> bool {
        self.targets.contains(target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }
}

impl FromIterator<Target> for TargetSet {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a Target;
    type IntoIter = std::collections::btree_set::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

/// Trimmed, non-empty, non-comment lines of a target list file
pub fn read_target_file(path: &Path) -> Result<Vec<String>, TargetError> {
    let content = std::fs::read_to_string(path).map_err(|source| TargetError::ListFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Merges every configured target source into one [`TargetSet`].
///
/// Sources are applied in a fixed order: CIDR, list file, literal target,
/// Shodan search, Nmap report. Each adds to the set except the list file,
/// which replaces whatever the CIDR block produced.
pub struct TargetResolver {
    sources: TargetSources,
    shodan: Option<ShodanClient>,
}

impl TargetResolver {
    pub fn new(sources: TargetSources, timeout: Duration) -> Result<Self, TargetError> {
        let shodan = match sources.shodan_query {
            Some(_) => {
                let key = sources
                    .shodan_key
                    .as_deref()
                    .ok_or(TargetError::MissingShodanKey)?;
                Some(ShodanClient::new(key, timeout)?)
            }
            None => None,
        };

        Ok(Self { sources, shodan })
    }

    /// Redirect Shodan searches to another API root
    pub fn with_shodan_base_url(mut self, base_url: &str) -> Self {
        self.shodan = self.shodan.map(|client| client.with_base_url(base_url));
        self
    }

    pub async fn resolve(&self) -> Result<TargetSet, TargetError> {
        let mut targets = TargetSet::new();

        if let Some(ref subnet) = self.sources.subnet {
            let hosts = cidr::expand(subnet)?;
            info!("[Targets] {} hosts from subnet {}", hosts.len(), subnet);
            for ip in hosts {
                targets.insert(Target::new(&ip.to_string(), None));
            }
        }

        if let Some(ref path) = self.sources.targets {
            let lines = read_target_file(path)?;
            let replaced = lines
                .iter()
                .map(|line| line.parse::<Target>())
                .collect::<Result<TargetSet, TargetError>>()?;
            if !targets.is_empty() {
                warn!(
                    "[Targets] Target list {} replaces {} targets from earlier sources",
                    path.display(),
                    targets.len()
                );
            }
            info!("[Targets] {} targets from {}", replaced.len(), path.display());
            targets = replaced;
        }

        if let Some(ref literal) = self.sources.target {
            targets.insert(literal.parse()?);
        }

        if let Some(ref query) = self.sources.shodan_query {
            let client = self.shodan.as_ref().ok_or(TargetError::MissingShodanKey)?;
            for ip in client.search(query).await? {
                targets.insert(ip.parse()?);
            }
        }

        if let Some(ref path) = self.sources.nmap {
            let hosts = nmap::parse_file(path)?;
            info!("[Targets] Loaded {} hosts from {}", hosts.len(), path.display());
            for host in hosts {
                for port in host.open_ports {
                    targets.insert(Target::new(&host.address, Some(port)));
                }
            }
        }

        debug!("[Targets] {} targets resolved", targets.len());
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_target_forms() {
        assert_eq!("10.0.0.1".parse::<Target>().unwrap(), Target::new("10.0.0.1", None));
        assert_eq!(
            "router.local:8080".parse::<Target>().unwrap(),
            Target::new("router.local", Some(8080))
        );
        assert_eq!(
            "[2001:db8::1]:8443".parse::<Target>().unwrap(),
            Target::new("2001:db8::1", Some(8443))
        );
        assert_eq!("2001:db8::1".parse::<Target>().unwrap().port, None);
        assert!("10.0.0.1:http".parse::<Target>().is_err());
        assert!("http://10.0.0.1".parse::<Target>().is_err());
        assert!("".parse::<Target>().is_err());
    }

    #[test]
    fn test_authority_and_display() {
        let v4 = Target::new("10.0.0.1", None);
        assert_eq!(v4.authority(8080), "10.0.0.1:8080");
        assert_eq!(v4.to_string(), "10.0.0.1");

        let pinned = Target::new("10.0.0.1", Some(81));
        assert_eq!(pinned.authority(8080), "10.0.0.1:81");

        let v6 = Target::new("2001:db8::1", Some(443));
        assert_eq!(v6.authority(80), "[2001:db8::1]:443");
        assert_eq!(v6.to_string(), "[2001:db8::1]:443");
    }

    #[test]
    fn test_read_target_file_skips_blanks_and_comments() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# lab hosts\n10.0.0.1\n\n  10.0.0.2  \n10.0.0.3:8080").unwrap();

        let lines = read_target_file(file.path()).unwrap();
        assert_eq!(lines, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3:8080"]);
    }

    #[test]
    fn test_missing_list_file_is_fatal() {
        let err = read_target_file(Path::new("/nonexistent/targets.txt")).unwrap_err();
        assert!(matches!(err, TargetError::ListFile { .. }));
    }

    #[test]
    fn test_shodan_query_without_key() {
        let sources = TargetSources {
            shodan_query: Some("product:tomcat".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            TargetResolver::new(sources, Duration::from_secs(5)),
            Err(TargetError::MissingShodanKey)
        ));
    }

    #[tokio::test]
    async fn test_subnet_plus_literal() {
        let sources = TargetSources {
            subnet: Some("192.168.10.0/29".to_string()),
            target: Some("10.1.1.1".to_string()),
            ..Default::default()
        };
        let resolver = TargetResolver::new(sources, Duration::from_secs(5)).unwrap();
        let targets = resolver.resolve().await.unwrap();
        assert_eq!(targets.len(), 7);
        assert!(targets.contains(&Target::new("10.1.1.1", None)));
    }

    #[tokio::test]
    async fn test_list_file_replaces_subnet() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "172.16.0.1\n172.16.0.2\n172.16.0.1").unwrap();

        let sources = TargetSources {
            subnet: Some("192.168.10.0/29".to_string()),
            targets: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let resolver = TargetResolver::new(sources, Duration::from_secs(5)).unwrap();
        let targets = resolver.resolve().await.unwrap();
        assert_eq!(targets.len(), 2);
        assert!(!targets.contains(&Target::new("192.168.10.1", None)));
    }

    #[tokio::test]
    async fn test_no_sources_yields_empty_set() {
        let resolver =
            TargetResolver::new(TargetSources::default(), Duration::from_secs(5)).unwrap();
        assert!(resolver.resolve().await.unwrap().is_empty());
    }
}
