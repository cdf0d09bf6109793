//! Fluent HTTP request builder

use std::collections::{BTreeMap, HashMap};
use std::mem;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::client::HttpClient;
use crate::error::HttpError;
use crate::json_path;
use crate::method::Method;
use crate::options::ClientOptions;
use crate::response::{Response, ResponseBody};

/// Shortest URL accepted, the length of `http://` plus one character
const MIN_URL_LEN: usize = "http://".len() + 1;

/// Everything one request needs, taken out of a [`RequestBuilder`].
///
/// Headers and params are moved here, so the builder no longer has them;
/// method and body are copied and stay on the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Validated verb
    pub method: Method,
    /// Validated target
    pub url: Url,
    /// Headers, sent with the names as given
    pub headers: HashMap<String, String>,
    /// Query parameters, appended to the URL sorted by key
    pub params: BTreeMap<String, String>,
    /// Raw body; empty means no body
    pub body: String,
}

/// Fluent HTTP request builder.
///
/// Method and body persist across executions. Headers and params are one-shot:
/// each execution that passes validation consumes them.
///
/// ```no_run
/// use fluent_http::RequestBuilder;
///
/// async fn example() -> fluent_http::Response<()> {
///     let mut builder = RequestBuilder::new()
///         .get()
///         .add_header("accept", "application/json")
///         .add_param("q", "ip");
///
///     let origin = builder
///         .response_get_json_field("http://httpbin.org/get", &["origin"])
///         .await?;
///     println!("{}", String::from_utf8_lossy(&origin));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    client: HttpClient,
    method: String,
    body: String,
    headers: HashMap<String, String>,
    params: BTreeMap<String, String>,
    error: Option<HttpError>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Builder with default timeouts and a direct connection
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, see [`HttpClient::new`].
    pub fn new() -> Self {
        Self::from_client(HttpClient::new())
    }

    /// Builder with explicit timeouts in milliseconds and a proxy.
    ///
    /// An empty `proxy` connects directly. Anything else must be a valid URL,
    /// otherwise no builder is produced.
    pub fn with_options(
        connect_timeout_ms: u64,
        response_header_timeout_ms: u64,
        total_timeout_ms: u64,
        proxy: &str,
    ) -> Response<Self> {
        Self::from_options(&ClientOptions::new(
            connect_timeout_ms,
            response_header_timeout_ms,
            total_timeout_ms,
            proxy,
        ))
    }

    /// Builder from configuration
    pub fn from_options(options: &ClientOptions) -> Response<Self> {
        HttpClient::from_options(options).map(Self::from_client)
    }

    /// Builder on top of an existing client, sharing its pool
    pub fn from_client(client: HttpClient) -> Self {
        Self {
            client,
            method: String::new(),
            body: String::new(),
            headers: HashMap::new(),
            params: BTreeMap::new(),
            error: None,
        }
    }

    /// Set the HTTP method; checked when the request is executed
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the HTTP method to GET
    pub fn get(self) -> Self {
        self.method(Method::Get.as_str())
    }

    /// Set the HTTP method to POST
    pub fn post(self) -> Self {
        self.method(Method::Post.as_str())
    }

    /// Add a header, replacing any earlier value for the same name
    pub fn add_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add several headers
    pub fn add_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a query parameter, replacing any earlier value for the same key
    pub fn add_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add several query parameters
    pub fn add_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Replace the body verbatim
    pub fn set_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.error = None;
        self
    }

    /// Use `value` serialized as JSON as the body.
    ///
    /// If serialization fails the body is cleared and the error is returned
    /// by the next execution.
    pub fn set_json_body<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => {
                self.body = body;
                self.error = None;
            }
            Err(e) => {
                self.body.clear();
                self.error = Some(HttpError::from(e));
            }
        }
        self
    }

    /// Method as currently set
    pub fn method_name(&self) -> &str {
        &self.method
    }

    /// Current body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Headers waiting for the next execution
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Params waiting for the next execution
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Client the builder sends through
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Validate `url` and the method, then take the one-shot state.
    ///
    /// On a validation error nothing is taken. A deferred JSON body error is
    /// returned (and dropped) after validation, also without taking anything.
    pub fn take_request(&mut self, url: &str) -> Response<RequestOptions> {
        let url = validate_url(url)?;
        let method: Method = self.method.parse()?;

        if let Some(err) = self.error.take() {
            tracing::warn!("Discarding request to {}: {}", url, err);
            return Err(err);
        }

        Ok(RequestOptions {
            method,
            url,
            headers: mem::take(&mut self.headers),
            params: mem::take(&mut self.params),
            body: self.body.clone(),
        })
    }

    /// Send the request and return the unread body.
    ///
    /// Dropping the returned value releases the connection.
    #[instrument(skip(self))]
    pub async fn fetch_body(&mut self, url: &str) -> Response<ResponseBody> {
        let request = self.take_request(url)?;
        self.client.execute(request).await
    }

    /// Send the request and read the whole body as text
    pub async fn response_to_string(&mut self, url: &str) -> Response<String> {
        self.fetch_body(url).await?.text().await
    }

    /// Send the request and return the value at `key_path` in the JSON body.
    ///
    /// Strings come back unquoted, other values as their raw JSON text.
    pub async fn response_get_json_field<K: AsRef<str>>(
        &mut self,
        url: &str,
        key_path: &[K],
    ) -> Response<Vec<u8>> {
        let data = self.fetch_body(url).await?.bytes().await?;
        json_path::get(&data, key_path)?.to_bytes()
    }

    /// Send the request and decode the JSON body into `T`
    pub async fn response_to_struct<T: DeserializeOwned>(&mut self, url: &str) -> Response<T> {
        self.fetch_body(url).await?.json().await
    }

    /// Send the request and decode the value at `key_path` into `T`
    pub async fn response_field_to_struct<T: DeserializeOwned, K: AsRef<str>>(
        &mut self,
        url: &str,
        key_path: &[K],
    ) -> Response<T> {
        let data = self.fetch_body(url).await?.bytes().await?;
        json_path::get(&data, key_path)?.deserialize()
    }
}

/// Pre-flight URL check.
///
/// At least `MIN_URL_LEN` characters starting with `http`, and it must parse
/// with an `http` or `https` scheme.
pub(crate) fn validate_url(url: &str) -> Response<Url> {
    if url.len() < MIN_URL_LEN || url.get(..4) != Some("http") {
        return Err(HttpError::InvalidUrl(url.to_string()));
    }

    let parsed = Url::parse(url).map_err(|_| HttpError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(HttpError::InvalidUrl(url.to_string())),
    }
}
