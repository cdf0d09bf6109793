//! HTTP client wrapper

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::instrument;

use crate::error::{HttpError, TimeoutPhase};
use crate::options::{ClientOptions, Timeouts};
use crate::request::{RequestBuilder, RequestOptions};
use crate::response::{Response, ResponseBody};

/// HTTP client wrapper.
///
/// Owns the connection pool and the three request deadlines. Cloning is cheap
/// and clones share the pool, so one client can back many
/// [`RequestBuilder`]s.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    timeouts: Timeouts,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default timeouts and no proxy
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, like
    /// `reqwest::Client::new`.
    pub fn new() -> Self {
        HttpClientBuilder::default()
            .build()
            .expect("TLS backend cannot be initialized")
    }

    /// Create a new HTTP client builder
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create an HTTP client from configuration
    pub fn from_options(options: &ClientOptions) -> Response<Self> {
        HttpClientBuilder::default().options(options.clone()).build()
    }

    /// Create an HttpClient from a reqwest::Client.
    ///
    /// Connect timeout and proxy are whatever `client` was built with; the
    /// response header and total deadlines from `timeouts` still apply.
    pub fn from_reqwest(client: reqwest::Client, timeouts: Timeouts) -> Self {
        Self {
            inner: client,
            timeouts,
        }
    }

    /// Deadlines applied to every request
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Start a request builder sharing this client's pool
    pub fn request(&self) -> RequestBuilder {
        RequestBuilder::from_client(self.clone())
    }

    /// Send a prepared request.
    ///
    /// Connect is bounded by the transport, the wait for response headers by
    /// whichever of the header and total deadlines comes first. The returned
    /// body keeps the total deadline for its reads. Non-2xx statuses are
    /// returned as [`HttpError::Status`] with the response text as message.
    ///
    /// The response header deadline counts from the start of the call, so it
    /// includes connection setup. With a header timeout shorter than the
    /// connect timeout, a slow connect fails as
    /// [`TimeoutPhase::ResponseHeader`].
    ///
    /// Header names and values are checked before anything is sent; a bad one
    /// fails with [`HttpError::InvalidHeader`].
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: RequestOptions) -> Response<ResponseBody> {
        let RequestOptions {
            method,
            url,
            headers,
            params,
            body,
        } = request;

        let started = Instant::now();
        let header_deadline = started + self.timeouts.response_header;
        let total_deadline = started + self.timeouts.total;
        let target = url.to_string();

        let mut builder = self.inner.request(method.into(), url);
        if !params.is_empty() {
            builder = builder.query(&params);
        }
        for (key, value) in &headers {
            let (name, value) = header_pair(key, value, &target)?;
            builder = builder.header(name, value);
        }
        if !body.is_empty() {
            builder = builder.body(body);
        }

        tracing::debug!(
            "Sending request with {} headers and {} params",
            headers.len(),
            params.len()
        );

        let response = tokio::select! {
            result = builder.send() => result.map_err(HttpError::from)?,
            _ = sleep_until(header_deadline) => {
                tracing::warn!(
                    "No response headers from {} within {}ms",
                    target,
                    self.timeouts.response_header.as_millis()
                );
                return Err(HttpError::Timeout {
                    phase: TimeoutPhase::ResponseHeader,
                    url: target,
                });
            }
            _ = sleep_until(total_deadline) => {
                tracing::warn!(
                    "Request to {} exceeded {}ms",
                    target,
                    self.timeouts.total.as_millis()
                );
                return Err(HttpError::Timeout {
                    phase: TimeoutPhase::Total,
                    url: target,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = match timeout_at(total_deadline, response.text()).await {
                Ok(Ok(text)) => text,
                _ => String::new(),
            };
            tracing::warn!("Request to {} returned {}", target, status);
            return Err(HttpError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(ResponseBody::new(response, total_deadline))
    }
}

/// HTTP client builder for configuring timeouts and proxy
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    options: ClientOptions,
}

impl HttpClientBuilder {
    /// Bound on establishing the connection
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout_ms = as_millis(timeout);
        self
    }

    /// Bound on waiting for response headers
    pub fn response_header_timeout(mut self, timeout: Duration) -> Self {
        self.options.response_header_timeout_ms = as_millis(timeout);
        self
    }

    /// Bound on the whole request, body included
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.options.total_timeout_ms = as_millis(timeout);
        self
    }

    /// Set a proxy URL
    pub fn proxy(mut self, url: url::Url) -> Self {
        self.options.proxy = Some(url.to_string());
        self
    }

    /// Replace all settings at once
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the HTTP client
    pub fn build(self) -> Response<HttpClient> {
        let timeouts = self.options.timeouts();

        let mut builder = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.total);

        match self.options.proxy.as_deref() {
            Some(proxy) if !proxy.is_empty() => {
                let proxy_url = url::Url::parse(proxy)
                    .map_err(|e| HttpError::Proxy(format!("Invalid proxy url {}: {}", proxy, e)))?;
                let proxy =
                    reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| HttpError::Proxy(e.to_string()))?;
                builder = builder.proxy(proxy);
            }
            _ => builder = builder.no_proxy(),
        }

        let client = builder
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(HttpClient {
            inner: client,
            timeouts,
        })
    }
}

fn header_pair(name: &str, value: &str, url: &str) -> Response<(HeaderName, HeaderValue)> {
    let invalid = |reason: String| {
        tracing::warn!("Refusing header {} for {}: {}", name, url, reason);
        HttpError::InvalidHeader {
            name: name.to_string(),
            url: url.to_string(),
            reason,
        }
    };

    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((header_name, header_value))
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = HttpClient::new();
        assert_eq!(client.timeouts(), Timeouts::default());
    }

    #[test]
    fn test_client_default() {
        let client = HttpClient::default();
        let _ = format!("{:?}", client);
    }

    #[test]
    fn test_builder_build() {
        let result = HttpClientBuilder::default().build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_builder_timeouts() {
        let client = HttpClient::builder()
            .connect_timeout(Duration::from_millis(100))
            .response_header_timeout(Duration::from_millis(200))
            .total_timeout(Duration::from_secs(1))
            .build()
            .expect("Valid timeouts");

        let timeouts = client.timeouts();
        assert_eq!(timeouts.connect, Duration::from_millis(100));
        assert_eq!(timeouts.response_header, Duration::from_millis(200));
        assert_eq!(timeouts.total, Duration::from_secs(1));
    }

    #[test]
    fn test_builder_proxy() {
        let proxy_url = url::Url::parse("http://localhost:8080").expect("Valid proxy URL");
        let result = HttpClientBuilder::default().proxy(proxy_url).build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_from_options_invalid_proxy() {
        let options = ClientOptions::new(1_000, 1_000, 1_000, "not a url");
        let result = HttpClient::from_options(&options);

        if let Err(HttpError::Proxy(msg)) = result {
            assert!(msg.contains("Invalid proxy url"));
        } else {
            panic!("Expected HttpError::Proxy");
        }
    }

    #[test]
    fn test_from_options_empty_proxy_is_direct() {
        let mut options = ClientOptions::default();
        options.proxy = Some(String::new());
        assert!(HttpClient::from_options(&options).is_ok());
    }

    #[test]
    fn test_from_reqwest() {
        let client = HttpClient::from_reqwest(reqwest::Client::new(), Timeouts::default());
        assert_eq!(client.timeouts(), Timeouts::default());
    }

    #[test]
    fn test_header_pair() {
        let (name, value) =
            header_pair("X-Trace", "abc", "http://localhost/").expect("Valid header");
        assert_eq!(name.as_str(), "x-trace");
        assert_eq!(value, "abc");

        match header_pair("bad header", "v", "http://localhost/") {
            Err(HttpError::InvalidHeader { name, url, .. }) => {
                assert_eq!(name, "bad header");
                assert_eq!(url, "http://localhost/");
            }
            other => panic!("Expected HttpError::InvalidHeader, got {:?}", other),
        }

        assert!(matches!(
            header_pair("x-ok", "line\nbreak", "http://localhost/"),
            Err(HttpError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_as_millis_saturates() {
        assert_eq!(as_millis(Duration::from_millis(42)), 42);
        assert_eq!(as_millis(Duration::MAX), u64::MAX);
    }
}
