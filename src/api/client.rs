//! Request execution and status classification.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::api::error::{ApiError, Result};
use crate::utils::auth::add_auth_headers;
use crate::utils::url::{EndpointResolver, Environment};

/// Default timeout for ordinary requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a whole streamed response.
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(300);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The workspace API key and the workspace it belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub workspace_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            workspace_id: workspace_id.into(),
        }
    }
}

// Keep the key out of debug output and logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("workspace_id", &self.workspace_id)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully read response that already went through status classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: StatusCode,
    body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Where a response came from, for operator-facing diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct RequestTarget<'a> {
    pub method: Method,
    pub workspace_id: &'a str,
    pub endpoint: &'a str,
}

/// The statuses the client treats as hard failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Authentication,
    NotFound,
    MethodNotAllowed,
}

impl Failure {
    /// 200 and every unlisted status map to `None` and pass through as data.
    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::UNAUTHORIZED => Some(Failure::Authentication),
            StatusCode::NOT_FOUND => Some(Failure::NotFound),
            StatusCode::METHOD_NOT_ALLOWED => Some(Failure::MethodNotAllowed),
            _ => None,
        }
    }

    fn report(self, target: RequestTarget<'_>) {
        match self {
            Failure::Authentication => {
                error!("Unauthorized access, please check your API key.");
            }
            Failure::NotFound => {
                error!(
                    workspace_id = target.workspace_id,
                    endpoint = target.endpoint,
                    "Resource not found, please check the workspace and resource identifiers."
                );
            }
            Failure::MethodNotAllowed => {
                error!(
                    endpoint = target.endpoint,
                    "Method {} not supported.", target.method
                );
            }
        }
    }

    pub fn into_error(self, body: String) -> ApiError {
        match self {
            Failure::Authentication => ApiError::Authentication(body),
            Failure::NotFound => ApiError::NotFound(body),
            Failure::MethodNotAllowed => ApiError::MethodNotAllowed(body),
        }
    }
}

/// Pass `response` through unchanged unless its status is a classified failure.
pub fn classify(response: RawResponse, target: RequestTarget<'_>) -> Result<RawResponse> {
    match Failure::from_status(response.status) {
        Some(failure) => {
            failure.report(target);
            Err(failure.into_error(response.body))
        }
        None => {
            if response.status != StatusCode::OK {
                debug!(status = %response.status, endpoint = target.endpoint, "Unclassified response status");
            }
            Ok(response)
        }
    }
}

/// HTTP client for one Dust deployment.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct DustClient {
    http: reqwest::Client,
    resolver: EndpointResolver,
    timeout: Duration,
    stream_timeout: Duration,
}

impl DustClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn new(environment: Environment) -> Result<Self> {
        Self::builder().environment(environment).build()
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stream_timeout(&self) -> Duration {
        self.stream_timeout
    }

    fn request(
        &self,
        method: Method,
        endpoint: &str,
        credentials: &Credentials,
    ) -> reqwest::RequestBuilder {
        let url = self
            .resolver
            .workspace_url(&credentials.workspace_id, endpoint);
        let request = match method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
        };
        add_auth_headers(request, &credentials.api_key)
    }

    /// Issue one authenticated request and classify the response.
    ///
    /// The body, when given, is sent JSON-encoded; otherwise the request has
    /// no body at all. There are no retries.
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        credentials: &Credentials,
        body: Option<&Value>,
    ) -> Result<RawResponse> {
        let mut request = self
            .request(method, endpoint, credentials)
            .timeout(self.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, endpoint, has_body = body.is_some(), "Sending API request");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%method, endpoint, %status, "Received API response");

        let target = RequestTarget {
            method,
            workspace_id: &credentials.workspace_id,
            endpoint,
        };
        classify(RawResponse::new(status, text), target)
    }

    /// Open a streamed GET and return the live response.
    ///
    /// Classified failures on the initial status are returned as errors; the
    /// body is left unread otherwise.
    pub async fn open_stream(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<reqwest::Response> {
        let response = self
            .request(Method::Get, endpoint, credentials)
            .timeout(self.stream_timeout)
            .send()
            .await?;

        let status = response.status();
        if let Some(failure) = Failure::from_status(status) {
            let body = response.text().await.unwrap_or_default();
            failure.report(RequestTarget {
                method: Method::Get,
                workspace_id: &credentials.workspace_id,
                endpoint,
            });
            return Err(failure.into_error(body));
        }

        debug!(endpoint, %status, "Opened event stream");
        Ok(response)
    }
}

/// Builder for [`DustClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    resolver: EndpointResolver,
    timeout: Duration,
    stream_timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            resolver: EndpointResolver::default(),
            timeout: DEFAULT_TIMEOUT,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            user_agent: None,
        }
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.resolver = EndpointResolver::new(environment);
        self
    }

    /// Point the client at an arbitrary origin (self-hosted or a test server).
    pub fn origin(mut self, origin: &str) -> Self {
        self.resolver = EndpointResolver::with_origin(origin);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<DustClient> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("dust-cli/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(DustClient {
            http,
            resolver: self.resolver,
            timeout: self.timeout,
            stream_timeout: self.stream_timeout,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> RequestTarget<'static> {
        RequestTarget {
            method: Method::Post,
            workspace_id: "ws",
            endpoint: "assistant/conversations",
        }
    }

    #[test]
    fn ok_passes_through_unchanged() {
        let response = RawResponse::new(StatusCode::OK, r#"{"a":1}"#);
        let classified = classify(response.clone(), target()).unwrap();
        assert_eq!(classified, response);
    }

    #[test]
    fn classified_statuses_carry_the_body() {
        let body = r#"{"error":{"message":"nope"}}"#;
        let cases = [
            (StatusCode::UNAUTHORIZED, "auth"),
            (StatusCode::NOT_FOUND, "not_found"),
            (StatusCode::METHOD_NOT_ALLOWED, "method"),
        ];

        for (status, kind) in cases {
            let err = classify(RawResponse::new(status, body), target()).unwrap_err();
            let matched = match (&err, kind) {
                (ApiError::Authentication(_), "auth") => true,
                (ApiError::NotFound(_), "not_found") => true,
                (ApiError::MethodNotAllowed(_), "method") => true,
                _ => false,
            };
            assert!(matched, "status {status} produced {err:?}");
            assert_eq!(err.to_string(), body);
        }
    }

    #[test]
    fn other_statuses_are_not_classified() {
        for status in [
            StatusCode::CREATED,
            StatusCode::BAD_REQUEST,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let response = RawResponse::new(status, "body");
            assert_eq!(classify(response.clone(), target()).unwrap(), response);
        }
    }

    #[test]
    fn raw_response_json_decodes_body() {
        let response = RawResponse::new(StatusCode::OK, r#"{"conversation":{"sId":"c1"}}"#);
        let value: Value = response.json().unwrap();
        assert_eq!(value["conversation"]["sId"], "c1");

        let broken = RawResponse::new(StatusCode::OK, "<html>");
        assert!(matches!(broken.json::<Value>(), Err(ApiError::Json(_))));
    }

    #[test]
    fn credentials_debug_redacts_key() {
        let creds = Credentials::new("sk-secret", "ws1");
        let printed = format!("{creds:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("ws1"));
    }

    #[test]
    fn builder_defaults() {
        let client = DustClient::builder().build().unwrap();
        assert_eq!(client.resolver().base_url(), "https://dust.tt/api/v1/w");
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.stream_timeout(), DEFAULT_STREAM_TIMEOUT);

        let dev = DustClient::new(Environment::Development).unwrap();
        assert_eq!(dev.resolver().base_url(), "http://localhost:3000/api/v1/w");
    }
}
