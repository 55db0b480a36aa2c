// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Engine Tests
 * End-to-end runs against mock devices: matching, attempt construction,
 * dispatch and failure isolation
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

mod common;

use common::{config_for, profile, target_file, target_of};
use credaudit::ScanEngine;
use wiremock::{
    matchers::{header, header_exists, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const GET_PROFILE: &str = r#"
name: Query Login Camera
category: camera
fingerprint:
  url: [/login]
  status: 200
auth:
  type: get
  url: [/login]
  fields: {username: user, password: pass}
  success:
    body: ["Welcome admin"]
credentials:
  - {username: admin, password: admin}
"#;

async fn login_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Login</form>"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_targets_one_valid_login() {
    let accepting = MockServer::start().await;
    let rejecting = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .and(query_param("user", "admin"))
        .and(query_param("pass", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Welcome admin"))
        .with_priority(1)
        .expect(1)
        .mount(&accepting)
        .await;
    login_page(&accepting).await;
    login_page(&rejecting).await;

    let targets = target_file(&[target_of(&accepting), target_of(&rejecting)]);
    let engine = ScanEngine::new(config_for(&targets), vec![profile(GET_PROFILE)]).unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.targets, 2);
    assert_eq!(summary.fingerprints, 1);
    assert_eq!(summary.matches.len(), 2);
    assert_eq!(summary.planned_attempts.len(), 2);
    assert_eq!(summary.dispatch.attempted, 2);

    assert_eq!(summary.results.len(), 1);
    let result = &summary.results[0];
    assert_eq!(result.target, target_of(&accepting));
    assert_eq!(result.profile, "Query Login Camera");
    assert_eq!(result.category, "camera");
    assert_eq!(result.auth_type, "get");
    assert_eq!(result.username, "admin");
    assert!(result.evidence.contains("Welcome admin"));
}

#[tokio::test]
async fn test_probe_count_is_full_cross_product() {
    let servers = vec![
        MockServer::start().await,
        MockServer::start().await,
        MockServer::start().await,
    ];

    let a = profile(
        r#"
name: A
fingerprint: {url: [/, /admin], status: 200, body: ["never-present"]}
auth: {type: basic, url: [/], success: {status: 200}}
credentials: [{username: a, password: a}]
"#,
    );
    let b = profile(
        r#"
name: B
fingerprint: {url: [/admin], status: 200, body: ["never-present"]}
auth: {type: basic, url: [/], success: {status: 200}}
credentials: [{username: b, password: b}]
"#,
    );

    let targets = target_file(&servers.iter().map(target_of).collect::<Vec<_>>());
    let engine = ScanEngine::new(config_for(&targets), vec![a, b]).unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.fingerprints, 2);
    assert_eq!(summary.probes_sent, 3 * 2);
    assert_eq!(summary.probe_failures, 0);
    assert!(summary.matches.is_empty());
    assert_eq!(summary.dispatch.attempted, 0);
}

#[tokio::test]
async fn test_one_response_matches_several_profiles() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Server", "lighttpd/1.4.59")
                .set_body_string("<title>NetGear Router</title>"),
        )
        .mount(&server)
        .await;
    Mock::given(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let netgear = profile(
        r#"
name: NetGear
fingerprint: {url: [/], body: ["NetGear"]}
auth: {type: basic, url: [/setup.cgi], success: {status: 200}}
credentials: [{username: admin, password: password}, {username: admin, password: "1234"}]
"#,
    );
    let lighttpd = profile(
        r#"
name: Generic lighttpd Panel
fingerprint: {url: [/], server_header: lighttpd}
auth: {type: basic, url: [/], success: {status: 200}}
credentials: [{username: root, password: root}, {username: admin, password: admin}]
"#,
    );
    let cisco = profile(
        r#"
name: Cisco
fingerprint: {url: [/], body: ["Cisco"]}
auth: {type: basic, url: [/], success: {status: 200}}
credentials: [{username: cisco, password: cisco}]
"#,
    );

    let targets = target_file(&[target_of(&server)]);
    let mut config = config_for(&targets);
    config.scanner.fingerprint_only = true;

    let engine = ScanEngine::new(config, vec![netgear, lighttpd, cisco]).unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.fingerprints, 1);
    assert_eq!(summary.probes_sent, 1);

    let matched: Vec<_> = summary.matches.iter().map(|m| m.profile.as_str()).collect();
    assert_eq!(matched, vec!["NetGear", "Generic lighttpd Panel"]);

    assert_eq!(summary.planned_attempts.len(), 4);
    assert!(summary
        .planned_attempts
        .iter()
        .any(|a| a.starts_with("NetGear BASIC") && a.ends_with("/setup.cgi admin:1234")));
    assert!(summary.results.is_empty());
    assert_eq!(summary.dispatch.attempted, 0);
}

#[tokio::test]
async fn test_refused_target_does_not_affect_others() {
    let mut servers = Vec::new();
    for _ in 0..9 {
        let server = MockServer::start().await;
        // admin:admin
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
            .respond_with(ResponseTemplate::new(200).set_body_string("Device status"))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .insert_header("WWW-Authenticate", "Basic realm=\"Embedded Device\""),
            )
            .mount(&server)
            .await;
        servers.push(server);
    }

    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let closed_target = closed.local_addr().unwrap().to_string();
    drop(closed);

    let mut lines: Vec<String> = servers.iter().map(target_of).collect();
    lines.push(closed_target);
    let targets = target_file(&lines);

    let device = profile(
        r#"
name: Embedded Device
fingerprint:
  url: [/]
  status: 401
  basic_auth_realm: Embedded Device
auth:
  type: basic_auth
  url: [/]
  success: {status: 200}
credentials:
  - {username: admin, password: admin}
  - {username: admin, password: wrong}
"#,
    );

    let engine = ScanEngine::new(config_for(&targets), vec![device]).unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.targets, 10);
    assert_eq!(summary.probes_sent, 10);
    assert_eq!(summary.probe_failures, 1);
    assert_eq!(summary.matches.len(), 9);
    assert_eq!(summary.dispatch.attempted, 18);
    assert_eq!(summary.results.len(), 9);
    assert!(summary.results.iter().all(|r| r.password == "admin"));
}

#[tokio::test]
async fn test_login_url_follows_redirected_match() {
    let landing = MockServer::start().await;
    let portal = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/portal", portal.uri())),
        )
        .mount(&landing)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"token\": \"x\"}"))
        .expect(0)
        .mount(&landing)
        .await;

    Mock::given(method("GET"))
        .and(path("/portal"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Acme Portal</h1>"))
        .mount(&portal)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"token\": \"x\"}"))
        .expect(1)
        .mount(&portal)
        .await;

    let acme = profile(
        r#"
name: Acme Portal
fingerprint: {url: [/], body: ["Acme Portal"]}
auth:
  type: post
  url: [/api/login]
  success: {status: 200, body: ["token"]}
credentials: [{username: admin, password: acme}]
"#,
    );

    let targets = target_file(&[target_of(&landing)]);
    let engine = ScanEngine::new(config_for(&targets), vec![acme]).unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results[0].url, format!("{}/api/login", portal.uri()));
    assert_eq!(summary.results[0].target, target_of(&landing));
}

#[tokio::test]
async fn test_pinned_port_reports_each_login_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
        .respond_with(ResponseTemplate::new(200).set_body_string("Control panel"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let on_port = |name: &str, port: u16| {
        profile(&format!(
            r#"
name: {}
fingerprint: {{url: [/], default_port: {}, status: 401}}
auth: {{type: basic, url: [/], success: {{status: 200}}}}
credentials: [{{username: admin, password: admin}}]
"#,
            name, port
        ))
    };

    // target_of pins the mock server's port, so both fingerprints hit one URL
    let targets = target_file(&[target_of(&server)]);
    let engine = ScanEngine::new(
        config_for(&targets),
        vec![on_port("Panel A", 80), on_port("Panel B", 8080)],
    )
    .unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.fingerprints, 2);
    assert_eq!(summary.probes_sent, 2);
    assert_eq!(summary.matches.len(), 2);
    assert_eq!(summary.dispatch.attempted, 2);

    let found: Vec<_> = summary.results.iter().map(|r| r.profile.as_str()).collect();
    assert_eq!(found, vec!["Panel A", "Panel B"]);
}

#[tokio::test]
async fn test_login_cookie_does_not_leak_to_other_attempts() {
    let server = MockServer::start().await;

    login_page(&server).await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .and(query_param("user", "admin"))
        .and(query_param("pass", "admin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "sid=authed; Path=/")
                .set_body_string("Welcome admin"),
        )
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    // The device trusts its session cookie over whatever credentials are sent
    Mock::given(method("GET"))
        .and(path("/login"))
        .and(header("cookie", "sid=authed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Welcome admin"))
        .with_priority(2)
        .mount(&server)
        .await;

    let device = profile(
        r#"
name: Query Login Camera
category: camera
fingerprint:
  url: [/login]
  status: 200
auth:
  type: get
  url: [/login]
  fields: {username: user, password: pass}
  success:
    body: ["Welcome admin"]
credentials:
  - {username: admin, password: admin}
  - {username: admin, password: wrong}
  - {username: guest, password: nope}
"#,
    );

    let targets = target_file(&[target_of(&server)]);
    let mut config = config_for(&targets);
    config.scanner.max_concurrency = 1;
    let engine = ScanEngine::new(config, vec![device]).unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.dispatch.attempted, 3);
    let found: Vec<_> = summary
        .results
        .iter()
        .map(|r| format!("{}:{}", r.username, r.password))
        .collect();
    assert_eq!(found, vec!["admin:admin"]);
}
