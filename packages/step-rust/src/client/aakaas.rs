//! AAKaaS OData package service client.
//!
//! Publication is triggered with a function import on the package service
//! and tracked by reading the target vector entity:
//!
//! 1. `GET  /odata/aas_ocs_package` with `x-csrf-token: fetch` (token + session cookie)
//! 2. `POST /odata/aas_ocs_package/PublishTargetVector?Id='<id>'&Scope='<T|P>'`
//! 3. `GET  /odata/aas_ocs_package/TargetVectorSet('<id>')`, repeated by the poller

use std::time::Duration;

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{Method, StatusCode};
use reqwest::{RequestBuilder, Url};
use tracing::debug;

use aakaas_core::{
    Credentials, OperationHandle, OperationStatus, PublishRequest, StatusReport, TargetVector,
};

use super::http::{classify_status, transport_error};
use super::OperationClient;
use crate::error::ClientError;

/// Base path of the OData package service.
pub const PACKAGE_SERVICE_PATH: &str = "/odata/aas_ocs_package";

/// Header used to fetch and echo the anti-forgery token.
pub const CSRF_TOKEN_HEADER: &str = "x-csrf-token";

/// Where and as whom to talk to AAKaaS.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Base URL of the AAKaaS system.
    pub endpoint: Url,
    pub credentials: Credentials,
    /// Upper bound for a single HTTP exchange.
    pub request_timeout: Duration,
}

impl Connection {
    #[must_use]
    pub fn new(endpoint: Url, credentials: Credentials) -> Self {
        Self {
            endpoint,
            credentials,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Buffered HTTP response.
struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// [`OperationClient`] for target vector publication.
#[derive(Debug, Clone)]
pub struct AakaasClient {
    http: reqwest::Client,
    connection: Connection,
}

impl AakaasClient {
    /// Builds the client with a cookie store so the CSRF token fetched on
    /// submit stays bound to its session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if the TLS backend cannot be
    /// initialized.
    pub fn new(connection: Connection) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(connection.request_timeout)
            .build()
            .map_err(|err| transport_error(&err))?;

        Ok(Self { http, connection })
    }

    /// Appends `path` to the endpoint, keeping any base path it carries.
    fn url(&self, path: &str) -> Url {
        let mut url = self.connection.endpoint.clone();
        let joined = format!("{}{path}", url.path().trim_end_matches('/'));
        url.set_path(&joined);
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let credentials = &self.connection.credentials;
        self.http
            .request(method, url)
            .basic_auth(
                credentials.username.expose(),
                Some(credentials.password.expose()),
            )
    }

    async fn send(&self, builder: RequestBuilder) -> Result<RawResponse, ClientError> {
        let response = builder.send().await.map_err(|err| transport_error(&err))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(&err))?
            .to_vec();
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Fetches an anti-forgery token for the package service.
    ///
    /// Returns `None` when the service does not hand out a token.
    async fn fetch_csrf_token(&self) -> Result<Option<HeaderValue>, ClientError> {
        let url = self.url(PACKAGE_SERVICE_PATH);
        let response = self
            .send(
                self.request(Method::GET, url)
                    .header(CSRF_TOKEN_HEADER, "fetch"),
            )
            .await?;
        classify_status(response.status, &response.body)?;
        Ok(response.headers.get(CSRF_TOKEN_HEADER).cloned())
    }
}

#[async_trait]
impl OperationClient for AakaasClient {
    type Payload = TargetVector;

    async fn submit(&self, request: &PublishRequest) -> Result<OperationHandle, ClientError> {
        let token = self.fetch_csrf_token().await?;

        let mut url = self.url(&format!("{PACKAGE_SERVICE_PATH}/PublishTargetVector"));
        url.query_pairs_mut()
            .append_pair("Id", &format!("'{}'", request.target_vector_id()))
            .append_pair("Scope", &format!("'{}'", request.scope().code()));

        let mut builder = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/json")
            .body("");
        if let Some(token) = token {
            builder = builder.header(CSRF_TOKEN_HEADER, token);
        }

        let response = self.send(builder).await?;
        classify_status(response.status, &response.body)?;
        debug!(
            target_vector = request.target_vector_id(),
            scope = request.scope().code(),
            status = response.status.as_u16(),
            "publication triggered"
        );
        Ok(OperationHandle::from(request))
    }

    async fn check_status(
        &self,
        handle: &OperationHandle,
    ) -> Result<StatusReport<TargetVector>, ClientError> {
        let url = self.url(&format!(
            "{PACKAGE_SERVICE_PATH}/TargetVectorSet('{}')",
            handle.id()
        ));
        let response = self.send(self.request(Method::GET, url)).await?;
        classify_status(response.status, &response.body)?;

        match TargetVector::from_odata_json(&response.body) {
            Ok(vector) => Ok(vector.classify(handle.scope())),
            Err(err) => {
                debug!(target_vector = handle.id(), error = %err, "undecodable status response");
                Ok(StatusReport {
                    status: OperationStatus::Unknown,
                    reason: Some(format!("undecodable status response: {err}")),
                    payload: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use aakaas_core::TargetVectorScope;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TV_ID: &str = "W7Q00207512600000188";

    fn client_for(server: &MockServer) -> AakaasClient {
        let endpoint = Url::parse(&server.uri()).unwrap();
        AakaasClient::new(Connection::new(
            endpoint,
            Credentials::new("S0012345678", "s3cr3t"),
        ))
        .unwrap()
    }

    fn tv_body(status: &str, publish_status: &str) -> serde_json::Value {
        json!({"d": {"Id": TV_ID, "Status": status, "PublishStatus": publish_status}})
    }

    #[tokio::test]
    async fn submit_fetches_token_and_echoes_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PACKAGE_SERVICE_PATH))
            .and(header(CSRF_TOKEN_HEADER, "fetch"))
            .and(basic_auth("S0012345678", "s3cr3t"))
            .respond_with(ResponseTemplate::new(200).insert_header(CSRF_TOKEN_HEADER, "tok-123"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{PACKAGE_SERVICE_PATH}/PublishTargetVector")))
            .and(query_param("Id", format!("'{TV_ID}'")))
            .and(query_param("Scope", "'P'"))
            .and(header(CSRF_TOKEN_HEADER, "tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"d": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = PublishRequest::new(TargetVectorScope::Productive, TV_ID);
        let handle = client.submit(&request).await.unwrap();

        assert_eq!(handle.id(), TV_ID);
        assert_eq!(handle.scope(), TargetVectorScope::Productive);
    }

    #[tokio::test]
    async fn submit_with_rejected_credentials_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PACKAGE_SERVICE_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = PublishRequest::new(TargetVectorScope::Test, TV_ID);
        let err = client.submit(&request).await.unwrap_err();

        assert_eq!(err, ClientError::Auth { status: 401 });
        assert!(!err.to_string().contains("s3cr3t"));
    }

    #[tokio::test]
    async fn submit_rejected_by_service_is_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PACKAGE_SERVICE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": "/AAK/PUB/001", "message": {"value": "Target vector already published"}}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .submit(&PublishRequest::new(TargetVectorScope::Test, TV_ID))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ClientError::Validation {
                status: 400,
                message: "/AAK/PUB/001: Target vector already published".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn check_status_maps_publish_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{PACKAGE_SERVICE_PATH}/TargetVectorSet('{TV_ID}')")))
            .respond_with(ResponseTemplate::new(200).set_body_json(tv_body("T", "S")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let handle = OperationHandle::new(TV_ID, TargetVectorScope::Test);
        let report = client.check_status(&handle).await.unwrap();

        assert_eq!(report.status, OperationStatus::Succeeded);
        assert_eq!(report.payload.unwrap().id, TV_ID);
    }

    #[tokio::test]
    async fn check_status_with_garbage_body_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let handle = OperationHandle::new(TV_ID, TargetVectorScope::Test);
        let report = client.check_status(&handle).await.unwrap();

        assert_eq!(report.status, OperationStatus::Unknown);
    }

    #[tokio::test]
    async fn check_status_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let handle = OperationHandle::new(TV_ID, TargetVectorScope::Test);
        let err = client.check_status(&handle).await.unwrap_err();

        assert!(err.is_transient());
    }

    #[test]
    fn url_keeps_endpoint_base_path() {
        let client = |endpoint: &str| {
            AakaasClient::new(Connection::new(
                Url::parse(endpoint).unwrap(),
                Credentials::new("u", "p"),
            ))
            .unwrap()
        };

        assert_eq!(
            client("https://host/aakaas/").url(PACKAGE_SERVICE_PATH).as_str(),
            "https://host/aakaas/odata/aas_ocs_package"
        );
        assert_eq!(
            client("https://host/aakaas").url(PACKAGE_SERVICE_PATH).as_str(),
            "https://host/aakaas/odata/aas_ocs_package"
        );
        assert_eq!(
            client("https://apps.support.sap.com").url(PACKAGE_SERVICE_PATH).as_str(),
            "https://apps.support.sap.com/odata/aas_ocs_package"
        );
    }

    #[tokio::test]
    async fn check_status_under_endpoint_base_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!(
                "/aakaas{PACKAGE_SERVICE_PATH}/TargetVectorSet('{TV_ID}')"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(tv_body("G", "R")))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}/aakaas", server.uri())).unwrap();
        let client =
            AakaasClient::new(Connection::new(endpoint, Credentials::new("u", "p"))).unwrap();
        let handle = OperationHandle::new(TV_ID, TargetVectorScope::Test);
        let report = client.check_status(&handle).await.unwrap();

        assert_eq!(report.status, OperationStatus::Running);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is not served by anything in the test environment.
        let endpoint = Url::parse("http://127.0.0.1:9").unwrap();
        let client =
            AakaasClient::new(Connection::new(endpoint, Credentials::new("u", "p"))).unwrap();
        let handle = OperationHandle::new(TV_ID, TargetVectorScope::Test);
        let err = client.check_status(&handle).await.unwrap_err();

        assert!(err.is_transient());
    }
}
