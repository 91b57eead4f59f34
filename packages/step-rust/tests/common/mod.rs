//! Shared fixtures: a mock AAKaaS package service and step arguments.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;

use aakaas_step::StepArgs;
use clap::Parser;
use parking_lot::Mutex;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TV_ID: &str = "W7Q00207512600000188";
pub const USERNAME: &str = "S0012345678";
pub const PASSWORD: &str = "pa55-w0rd";

pub const SERVICE_PATH: &str = "/odata/aas_ocs_package";

pub fn status_path() -> String {
    format!("{SERVICE_PATH}/TargetVectorSet('{TV_ID}')")
}

pub fn publish_path() -> String {
    format!("{SERVICE_PATH}/PublishTargetVector")
}

pub fn tv_response(status: &str, publish_status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "d": {
            "Id": TV_ID,
            "Vendor": "0000203069",
            "ProductName": "/DRNMSPC/PRD01",
            "ProductVersion": "0001",
            "SpsLevel": "0002",
            "PatchLevel": "0000",
            "Status": status,
            "PublishStatus": publish_status
        }
    }))
}

/// Mounts a token endpoint and an accepting publish endpoint.
pub async fn mount_submit(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "tok-1"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(publish_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"d": {}})))
        .expect(1)
        .mount(server)
        .await;
}

/// Step arguments pointing at `server`, plus any `extra` flags.
pub fn args_for(server: &MockServer, extra: &[&str]) -> StepArgs {
    let descriptor = format!(r#"{{"addonProduct":"/DRNMSPC/PRD01","targetVectorID":"{TV_ID}"}}"#);
    let uri = server.uri();
    let mut argv: Vec<&str> = vec![
        "aakaas-publish-target-vector",
        "--abapAddonAssemblyKitEndpoint",
        &uri,
        "--username",
        USERNAME,
        "--password",
        PASSWORD,
        "--addonDescriptor",
        &descriptor,
    ];
    argv.extend_from_slice(extra);
    StepArgs::try_parse_from(argv).expect("valid arguments")
}

/// Number of requests the server received on `request_path`.
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

/// In-memory log sink usable as a `tracing_subscriber` writer.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).unwrap()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
