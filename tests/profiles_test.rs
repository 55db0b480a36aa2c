// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use credaudit::config::ProfileLoader;
use credaudit::errors::ProfileError;
use credaudit::fingerprint::FingerprintCatalog;
use credaudit::types::AuthMethod;
use std::path::PathBuf;
use tempfile::TempDir;

fn bundled_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("creds")
}

#[test]
fn test_bundled_profiles_load() {
    let profiles = ProfileLoader::new(bundled_dir()).load().unwrap();
    assert_eq!(profiles.len(), 6);

    let catalog = FingerprintCatalog::from_profiles(&profiles);
    assert_eq!(catalog.len(), 6);

    let django = profiles.iter().find(|p| p.name == "Django Admin").unwrap();
    assert_eq!(django.auth.csrf_field(), Some("csrfmiddlewaretoken"));
    assert!(matches!(django.auth.method, AuthMethod::Post { .. }));
}

#[test]
fn test_bundled_category_filter() {
    let servers = ProfileLoader::new(bundled_dir())
        .with_category("servers")
        .load()
        .unwrap();
    let names: Vec<_> = servers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Apache Tomcat", "JBoss JMX Console"]);
}

#[test]
fn test_unknown_auth_type_fails_load() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("ntlm.yml"),
        r#"
name: Exchange OWA
fingerprint: {url: [/owa/], status: 200}
auth: {type: ntlm, url: [/owa/auth.owa], success: {status: 302}}
credentials: [{username: administrator, password: Passw0rd}]
"#,
    )
    .unwrap();

    let err = ProfileLoader::new(dir.path()).load().unwrap_err();
    assert!(matches!(err, ProfileError::Parse { .. }), "unexpected error: {}", err);
}

#[test]
fn test_profile_without_match_conditions_fails_load() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("empty.yml"),
        r#"
name: Catch All
fingerprint: {url: [/]}
auth: {type: basic, url: [/], success: {status: 200}}
credentials: [{username: admin, password: admin}]
"#,
    )
    .unwrap();

    assert!(matches!(
        ProfileLoader::new(dir.path()).load(),
        Err(ProfileError::Invalid { .. })
    ));
}
