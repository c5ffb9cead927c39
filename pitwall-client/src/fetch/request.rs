//! Request and response values passed through the fetch layer
//!
//! Both are plain owned data so a request can be replayed on every retry and
//! a scripted transport can build responses without a live server.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::policy::is_retryable_status;
use crate::error::{FetchError, FetchResult};

/// Outbound request: method, target, headers and optional body
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Add or replace a header
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a raw body
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body and set `Content-Type`
    pub fn json<B: Serialize + ?Sized>(mut self, value: &B) -> FetchResult<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| FetchError::InvalidRequest(format!("JSON body: {}", e)))?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body);
        Ok(self)
    }
}

/// Raw response: status, headers and fully-read body
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response with no headers and an empty body
    pub fn with_status(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new(), Vec::new())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 502, 503 or 504
    pub fn is_retryable(&self) -> bool {
        is_retryable_status(self.status)
    }

    /// Body as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON regardless of status
    pub fn json<T: DeserializeOwned>(&self) -> FetchResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Turn a non-success status into an error, keeping success responses
    ///
    /// 401 and 403 map to [`FetchError::Unauthorized`]; anything else
    /// outside 2xx maps to [`FetchError::Status`] carrying the body text.
    pub fn error_for_status(self) -> FetchResult<Self> {
        let status = self.status.as_u16();
        match self.status {
            s if s.is_success() => Ok(self),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(FetchError::Unauthorized { status })
            }
            _ => Err(FetchError::Status {
                status,
                body: self.text(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Driver {
        crs_score: f64,
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let request = ApiRequest::post("http://localhost/api/incidents")
            .json(&serde_json::json!({"lap": 3}))
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(request.body.as_deref(), Some(&b"{\"lap\":3}"[..]));
    }

    #[test]
    fn test_response_json_and_text() {
        let response = ApiResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            br#"{"crs_score": 81.5}"#.to_vec(),
        );

        assert!(response.is_success());
        assert!(!response.is_retryable());
        assert_eq!(response.json::<Driver>().unwrap(), Driver { crs_score: 81.5 });
        assert!(response.text().contains("81.5"));
    }

    #[test]
    fn test_response_json_decode_error() {
        let response = ApiResponse::new(StatusCode::OK, HeaderMap::new(), b"<html>".to_vec());
        assert!(matches!(response.json::<Driver>(), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_error_for_status() {
        assert!(ApiResponse::with_status(StatusCode::NO_CONTENT)
            .error_for_status()
            .is_ok());

        assert!(matches!(
            ApiResponse::with_status(StatusCode::FORBIDDEN).error_for_status(),
            Err(FetchError::Unauthorized { status: 403 })
        ));

        let err = ApiResponse::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            HeaderMap::new(),
            b"missing field".to_vec(),
        )
        .error_for_status()
        .unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "missing field");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
