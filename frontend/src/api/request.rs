use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::error::ApiError;

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(format!("Unsupported HTTP method: {}", other)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved outgoing request, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[test]
    fn test_method_parsing() {
        assert_eq!("post".parse::<Method>(), Ok(Method::Post));
        assert_eq!("DELETE".parse::<Method>(), Ok(Method::Delete));
        assert!("TRACE".parse::<Method>().is_err());
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = ApiRequest {
            method: Method::Get,
            url: "https://api.example.com/api/v1/items".to_string(),
            headers: vec![(CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string())],
            timeout: Duration::from_secs(1),
            body: None,
        };
        assert_eq!(request.header("content-type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(request.header("authorization"), None);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn test_response_json() {
        let response = ApiResponse::new(200, r#"{"id": 7}"#);
        assert!(response.is_success());
        assert_eq!(response.json::<Item>().unwrap(), Item { id: 7 });

        let broken = ApiResponse::new(200, "<html>");
        assert!(matches!(broken.json::<Item>(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_success_range() {
        assert!(ApiResponse::new(204, "").is_success());
        assert!(!ApiResponse::new(301, "").is_success());
        assert!(!ApiResponse::new(404, "").is_success());
        assert!(!ApiResponse::new(199, "").is_success());
    }
}
