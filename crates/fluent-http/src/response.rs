//! HTTP response types

use serde::de::DeserializeOwned;
use tokio::time::{timeout_at, Instant};

use crate::error::{HttpError, TimeoutPhase};

/// HTTP Response type - generic over the body type R and error type E
/// This is the primary return type for all HTTP operations
pub type Response<R, E = HttpError> = Result<R, E>;

/// Live response whose body has not been read yet.
///
/// Every read is bounded by the total deadline of the request that produced
/// it. Dropping the value releases the underlying connection, so partial
/// reads followed by an early return do not leak it.
#[derive(Debug)]
pub struct ResponseBody {
    status: u16,
    deadline: Instant,
    inner: reqwest::Response,
}

impl ResponseBody {
    pub(crate) fn new(response: reqwest::Response, deadline: Instant) -> Self {
        Self {
            status: response.status().as_u16(),
            deadline,
            inner: response,
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response headers
    pub fn headers(&self) -> &reqwest::header::HeaderMap {
        self.inner.headers()
    }

    /// Final URL of the response
    pub fn url(&self) -> &url::Url {
        self.inner.url()
    }

    /// Read the next chunk of the body, `None` once it is exhausted
    pub async fn chunk(&mut self) -> Response<Option<Vec<u8>>> {
        let deadline = self.deadline;
        let url = self.inner.url().to_string();
        let chunk = timeout_at(deadline, self.inner.chunk())
            .await
            .map_err(|_| total_timeout(url))??;
        Ok(chunk.map(|b| b.to_vec()))
    }

    /// Get the response body as bytes
    pub async fn bytes(self) -> Response<Vec<u8>> {
        let url = self.inner.url().to_string();
        let bytes = timeout_at(self.deadline, self.inner.bytes())
            .await
            .map_err(|_| total_timeout(url))??;
        Ok(bytes.to_vec())
    }

    /// Get the response body as text
    pub async fn text(self) -> Response<String> {
        let url = self.inner.url().to_string();
        timeout_at(self.deadline, self.inner.text())
            .await
            .map_err(|_| total_timeout(url))?
            .map_err(HttpError::from)
    }

    /// Get the response body as JSON
    pub async fn json<T: DeserializeOwned>(self) -> Response<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(HttpError::from)
    }
}

fn total_timeout(url: String) -> HttpError {
    tracing::warn!("Total timeout elapsed while reading body from {}", url);
    HttpError::Timeout {
        phase: TimeoutPhase::Total,
        url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ResponseBody tests need a live response, see tests/integration.rs

    #[test]
    fn test_response_type_is_result() {
        let success: Response<i32> = Ok(42);
        assert!(matches!(success, Ok(42)));

        let error: Response<i32> = Err(total_timeout("http://localhost/".to_string()));
        assert!(matches!(
            error,
            Err(HttpError::Timeout {
                phase: TimeoutPhase::Total,
                ..
            })
        ));
    }
}
