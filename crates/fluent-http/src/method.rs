//! Supported HTTP verbs

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HttpError;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// HEAD
    Head,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
}

impl Method {
    /// Standard spelling of the verb
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = HttpError;

    /// Matching is case-sensitive: `get` is not a valid verb.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "HEAD" => Ok(Method::Head),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(HttpError::InvalidMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Head => reqwest::Method::HEAD,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_methods() {
        for name in ["GET", "POST", "HEAD", "PUT", "DELETE", "OPTIONS"] {
            let method = Method::from_str(name).expect("allowed verb");
            assert_eq!(method.as_str(), name);
            assert_eq!(method.to_string(), name);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_lowercase() {
        for name in ["PATCH", "", "get", "TRACE", "CONNECT"] {
            let err = Method::from_str(name).expect_err("verb should be rejected");
            assert!(matches!(err, HttpError::InvalidMethod(ref m) if m == name));
        }
    }

    #[test]
    fn test_serde_uppercase() {
        let json = serde_json::to_string(&Method::Options).expect("serialize");
        assert_eq!(json, "\"OPTIONS\"");
        let method: Method = serde_json::from_str("\"DELETE\"").expect("deserialize");
        assert_eq!(method, Method::Delete);
    }

    #[test]
    fn test_into_reqwest_method() {
        let method: reqwest::Method = Method::Head.into();
        assert_eq!(method, reqwest::Method::HEAD);
    }
}
