//! Fluent HTTP request builder
//!
//! Configure method, headers, query parameters and body on a
//! [`RequestBuilder`], send it under connect, response header and total
//! timeouts, and read the response as text, as a single JSON field picked by
//! key path, or as a decoded structure.
//!
//! Headers and params are one-shot: an execution consumes them. Method and
//! body stay on the builder for the next request.
//!
//! # Example
//!
//! ```no_run
//! use fluent_http::{RequestBuilder, Response};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Echo {
//!     origin: String,
//! }
//!
//! async fn example() -> Response<()> {
//!     let mut builder = RequestBuilder::with_options(5_000, 5_000, 10_000, "")?
//!         .get()
//!         .add_header("a", "b")
//!         .add_param("c", "d");
//!
//!     let echo: Echo = builder.response_to_struct("http://httpbin.org/get").await?;
//!     println!("{}", echo.origin);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod json_path;
mod method;
mod options;
mod request;
mod response;

pub use client::{HttpClient, HttpClientBuilder};
pub use error::{ErrorKind, HttpError, TimeoutPhase};
pub use json_path::{JsonField, JsonValueType};
pub use method::Method;
pub use options::{
    ClientOptions, Timeouts, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_RESPONSE_HEADER_TIMEOUT_MS,
    DEFAULT_TOTAL_TIMEOUT_MS, ENV_FLUENT_HTTP_CONNECT_TIMEOUT_MS, ENV_FLUENT_HTTP_PROXY,
    ENV_FLUENT_HTTP_RESPONSE_HEADER_TIMEOUT_MS, ENV_FLUENT_HTTP_TOTAL_TIMEOUT_MS,
};
pub use request::{RequestBuilder, RequestOptions};
pub use response::{Response, ResponseBody};
