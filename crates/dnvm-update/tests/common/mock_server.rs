//! A wiremock SDK feed
//!
//! Serves `release-metadata/releases-index.json` and one archive per SDK
//! version at `/sdk/{version}.tar.gz`. Each archive holds a `dotnet`
//! executable whose content is the version string.

use dnvm_core::EXE_SUFFIX;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One release line served by the mock feed
#[derive(Debug, Clone)]
pub struct MockLine {
    pub channel_version: &'static str,
    pub latest_sdk: &'static str,
    pub release_type: &'static str,
    pub support_phase: &'static str,
}

impl MockLine {
    pub fn new(
        channel_version: &'static str,
        latest_sdk: &'static str,
        release_type: &'static str,
        support_phase: &'static str,
    ) -> Self {
        Self {
            channel_version,
            latest_sdk,
            release_type,
            support_phase,
        }
    }
}

/// Build a `.tar.gz` holding `dotnet` (content = `version`) and a nested file
pub fn sdk_archive(version: &str) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut add = |name: &str, data: &[u8], mode: u32| {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data)
            .expect("Failed to append archive entry");
    };

    add(&format!("dotnet{}", EXE_SUFFIX), version.as_bytes(), 0o755);
    add(&format!("sdk/{}/dotnet.dll", version), b"sdk", 0o644);

    builder
        .into_inner()
        .and_then(|gz| gz.finish())
        .expect("Failed to finish archive")
}

fn index_json(server: &MockServer, lines: &[MockLine]) -> Value {
    let releases: Vec<Value> = lines
        .iter()
        .map(|l| {
            json!({
                "channel-version": l.channel_version,
                "latest-sdk": l.latest_sdk,
                "release-type": l.release_type,
                "support-phase": l.support_phase,
                "sdk-download-url": format!("{}/sdk/{}.tar.gz", server.uri(), l.latest_sdk),
            })
        })
        .collect();
    json!({ "releases-index": releases })
}

/// Start a feed serving `lines` and an archive for each of them
pub async fn start_feed(lines: &[MockLine]) -> MockServer {
    let server = MockServer::start().await;
    mount_index(&server, lines).await;
    for line in lines {
        mount_archive(&server, line.latest_sdk).await;
    }
    server
}

/// Serve `lines` as the release index, replacing earlier mounts
pub async fn mount_index(server: &MockServer, lines: &[MockLine]) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/release-metadata/releases-index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(index_json(server, lines)))
        .mount(server)
        .await;
}

/// Serve an SDK archive for `version`
pub async fn mount_archive(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/sdk/{}.tar.gz", version)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(sdk_archive(version)))
        .mount(server)
        .await;
}

/// Make every archive download fail with `status`
pub async fn fail_archives(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/sdk/.*"))
        .respond_with(ResponseTemplate::new(status))
        .with_priority(1)
        .mount(server)
        .await;
}

/// The standard feed: 6.0 (LTS, maintenance), 8.0 (LTS, active) and a 9.0 preview
pub fn standard_lines() -> Vec<MockLine> {
    vec![
        MockLine::new("6.0", "6.0.400", "lts", "maintenance"),
        MockLine::new("8.0", "8.0.100", "lts", "active"),
        MockLine::new("9.0", "9.0.100-preview.1", "sts", "preview"),
    ]
}
