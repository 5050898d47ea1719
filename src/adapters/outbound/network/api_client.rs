use crate::shared::error::HarborError;
use crate::shared::Result;
use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Connection settings for a Harbor instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub harbor_url: String,
    pub api_version: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Skip TLS certificate verification
    pub insecure: bool,
}

/// Blocking HTTP client for the Harbor REST API
///
/// Every request goes to `{harbor_url}/api/{api_version}{path}` with
/// `Accept: application/json`. Basic auth is sent only when both a username
/// and a password are configured.
///
/// # Security
/// - Implements timeout (30 seconds)
/// - Does not retry failed requests
/// - Certificate verification is disabled only with `insecure`
pub struct HarborClient {
    http: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl HarborClient {
    const TIMEOUT_SECONDS: u64 = 30;

    pub fn new(options: &ClientOptions) -> Result<Self> {
        let user_agent = format!("hrbcli/{}", env!("CARGO_PKG_VERSION"));
        let http = Client::builder()
            .timeout(Duration::from_secs(Self::TIMEOUT_SECONDS))
            .user_agent(user_agent)
            .danger_accept_invalid_certs(options.insecure)
            .build()
            .context("failed to build HTTP client")?;

        let credentials = match (&options.username, &options.password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some((user.clone(), pass.clone()))
            }
            _ => None,
        };

        Ok(Self {
            http,
            base_url: format!(
                "{}/api/{}",
                options.harbor_url.trim_end_matches('/'),
                options.api_version
            ),
            credentials,
        })
    }

    /// API root every path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GETs `path` and decodes the JSON body into `T`
    ///
    /// # Arguments
    /// * `what` - Name of the resource, used in decode errors
    pub fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let body = self.send(Method::GET, path, None)?;
        decode(&body, what)
    }

    /// GETs `path` as untyped JSON; an empty body yields `null`
    pub fn get_value(&self, path: &str, what: &str) -> Result<serde_json::Value> {
        let body = self.send(Method::GET, path, None)?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        decode(&body, what)
    }

    pub fn post(&self, path: &str, body: Option<&serde_json::Value>) -> Result<()> {
        self.send(Method::POST, path, body).map(|_| ())
    }

    /// POSTs a create request and returns the id from the `Location` header
    ///
    /// Harbor answers `201 Created` with an empty body and
    /// `Location: /api/v2.0/<resource>/<id>`.
    ///
    /// # Errors
    /// `Decode` when the header is missing or does not end in a numeric id
    pub fn create(&self, path: &str, body: &serde_json::Value, what: &str) -> Result<i64> {
        let reply = self.send_raw(Method::POST, path, Some(body))?;
        let location = reply.location.ok_or_else(|| HarborError::Decode {
            what: format!("created {}", what),
            details: "no Location header in response".to_string(),
        })?;
        location_id(&location).ok_or_else(|| {
            HarborError::Decode {
                what: format!("created {}", what),
                details: format!("cannot read an id from Location {}", location),
            }
            .into()
        })
    }

    pub fn put(&self, path: &str, body: &serde_json::Value) -> Result<()> {
        self.send(Method::PUT, path, Some(body)).map(|_| ())
    }

    pub fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None).map(|_| ())
    }

    /// HEADs `path`; a 404 means the resource does not exist
    pub fn exists(&self, path: &str) -> Result<bool> {
        match self.send(Method::HEAD, path, None) {
            Ok(_) => Ok(true),
            Err(e)
                if e.downcast_ref::<HarborError>()
                    .is_some_and(HarborError::is_not_found) =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<String> {
        self.send_raw(method, path, body).map(|reply| reply.body)
    }

    fn send_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Reply> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, url = %url, "sending request");

        let mut request = self
            .http
            .request(method, &url)
            .header(ACCEPT, "application/json");
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }
        if let Some(body) = body {
            tracing::debug!(body = %redact(body), "request body");
            request = request.json(body);
        }

        let response = request.send().map_err(|e| HarborError::Transport {
            url: url.clone(),
            details: describe_transport_error(&e),
        })?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().map_err(|e| HarborError::Transport {
            url: url.clone(),
            details: describe_transport_error(&e),
        })?;
        tracing::debug!(status, body = %text, "received response");

        if status >= 400 {
            return Err(api_error(status, &text).into());
        }
        Ok(Reply {
            body: text,
            location,
        })
    }
}

struct Reply {
    body: String,
    location: Option<String>,
}

/// Copy of a request body with password fields masked for logging
fn redact(body: &serde_json::Value) -> serde_json::Value {
    match body {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                let value = if matches!(key.as_str(), "password" | "access_secret") {
                    serde_json::Value::String("********".to_string())
                } else {
                    redact(value)
                };
                (key.clone(), value)
            })
            .collect(),
        other => other.clone(),
    }
}

/// Trailing numeric segment of a `Location` header
pub(crate) fn location_id(location: &str) -> Option<i64> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|id| id.parse().ok())
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        HarborError::Decode {
            what: what.to_string(),
            details: e.to_string(),
        }
        .into()
    })
}

/// Flattens a reqwest error and its sources into one line
fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return format!("request timed out after {}s", HarborClient::TIMEOUT_SECONDS);
    }

    let mut details = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        details.push_str(": ");
        details.push_str(&cause.to_string());
        source = cause.source();
    }
    if details.contains("certificate") {
        details.push_str(" (use --insecure to skip TLS verification)");
    }
    details
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorMessage>,
    #[serde(default)]
    message: String,
}

/// Builds an `Api` error from a failed response
///
/// Harbor answers with `{"errors":[{"code","message"}]}`; older endpoints
/// use a flat `{"code","message"}`. Anything else is passed through raw.
fn api_error(status: u16, body: &str) -> HarborError {
    let decoded = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| {
            let mut messages: Vec<String> = envelope
                .errors
                .into_iter()
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .collect();
            if messages.is_empty() && !envelope.message.is_empty() {
                messages.push(envelope.message);
            }
            messages.join("; ")
        })
        .filter(|m| !m.is_empty());

    HarborError::Api {
        status,
        message: decoded.unwrap_or_else(|| body.trim().to_string()),
    }
}

/// Escapes one path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// `/projects/{p}/repositories/{r}`
///
/// Harbor expects repository names double-encoded so that `a/b` survives
/// routing as a single segment.
pub(crate) fn repository_path(project: &str, repository: &str) -> String {
    format!(
        "/projects/{}/repositories/{}",
        segment(project),
        urlencoding::encode(&segment(repository))
    )
}

pub(crate) fn artifact_path(project: &str, repository: &str, reference: &str) -> String {
    format!(
        "{}/artifacts/{}",
        repository_path(project, repository),
        segment(reference)
    )
}

/// Appends an encoded query string; empty params leave the path unchanged
pub(crate) fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();
    format!("{}?{}", path, query.join("&"))
}
