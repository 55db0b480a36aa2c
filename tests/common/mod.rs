// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

#![allow(dead_code)]

use credaudit::config::AppConfig;
use credaudit::types::CredentialProfile;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::MockServer;

pub fn profile(yaml: &str) -> CredentialProfile {
    serde_yaml::from_str(yaml).expect("test profile must parse")
}

/// `127.0.0.1:port` of a mock server, usable as a scan target
pub fn target_of(server: &MockServer) -> String {
    server.address().to_string()
}

pub fn target_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

/// Config scanning exactly the targets listed in `file`
pub fn config_for(file: &NamedTempFile) -> AppConfig {
    let mut config = AppConfig::default();
    config.targets.targets = Some(file.path().to_path_buf());
    config.scanner.request_timeout_secs = 3;
    config.scanner.max_concurrency = 8;
    config
}
