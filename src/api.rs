//! Decoding of backend responses. Transport is left to the caller: anything
//! that can produce a status code and a body can drive a [`TreeSource`].

use crate::model::TreeResponse;
use crate::session::Session;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const TEAM_TREE_PATH: &str = "/api/v1/user/team/tree";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

const INVALID_RESPONSE: &str = "The server returned an invalid response.";
const LOGGED_BODY_LIMIT: usize = 500;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("{msg}", msg = INVALID_RESPONSE)]
    InvalidResponse { status: u16 },
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::InvalidResponse { status } | ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Anything able to fetch the viewer's team tree.
pub trait TreeSource {
    fn fetch_tree(&self, session: &Session) -> Result<TreeResponse, ApiError>;
}

/// Blocking GET used by [`ApiClient`]; returns the status code and body text.
pub trait Transport {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<(u16, String), ApiError>;
}

/// [`TreeSource`] that fetches the team tree endpoint through a [`Transport`].
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, transport)
    }

    pub fn with_base_url(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl<T: Transport> TreeSource for ApiClient<T> {
    fn fetch_tree(&self, session: &Session) -> Result<TreeResponse, ApiError> {
        let url = endpoint_url(&self.base_url, TEAM_TREE_PATH);
        log::debug!("GET {url}");
        let (status, body) = self.transport.get(&url, &auth_headers(session, true))?;
        decode_tree_response(status, &body)
    }
}

pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Header pairs for an authenticated request.
pub fn auth_headers(session: &Session, json: bool) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    if let Some(token) = session.token() {
        headers.push(("Authorization".to_string(), format!("Bearer {token}")));
    }
    if json {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    headers
}

/// Turns a raw response into `T`. An empty body counts as `{}`; a failed
/// request surfaces the server's `message` when it sent one.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if status == 401 {
        log::warn!("API request returned 401 Unauthorized.");
    }

    let value: serde_json::Value = if body.trim().is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        match serde_json::from_str(body) {
            Ok(value) => value,
            Err(err) => {
                log::error!(
                    "API Error: Failed to parse response as JSON ({err}). Status: {status}. Response: {}...",
                    truncate_for_log(body)
                );
                return Err(ApiError::InvalidResponse { status });
            }
        }
    };

    if !(200..300).contains(&status) {
        log::error!("API Error: Status: {status}. Response: {value}");
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        return Err(ApiError::Status { status, message });
    }

    serde_json::from_value(value).map_err(|err| {
        log::error!("API Error: unexpected response shape: {err}");
        ApiError::InvalidResponse { status }
    })
}

pub fn decode_tree_response(status: u16, body: &str) -> Result<TreeResponse, ApiError> {
    decode_response(status, body)
}

fn truncate_for_log(body: &str) -> String {
    body.chars().take(LOGGED_BODY_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn decodes_successful_tree() {
        let body = r#"{"tree":{"userId":"me","fullName":"Me","packageUSD":10,"children":[]},"parent":{"userId":"s","fullName":"S"}}"#;
        let response = decode_tree_response(200, body).expect("tree");
        assert_eq!(response.tree.user_id, "me");
        assert_eq!(response.parent.map(|p| p.full_name), Some("S".to_string()));
    }

    #[test]
    fn non_json_body_is_invalid_response() {
        let err = decode_tree_response(502, "<html>Bad gateway</html>").unwrap_err();
        assert_eq!(err, ApiError::InvalidResponse { status: 502 });
        assert_eq!(err.to_string(), INVALID_RESPONSE);
    }

    #[test]
    fn error_status_prefers_server_message() {
        let err = decode_tree_response(403, r#"{"message":"Account suspended"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Account suspended");
        assert_eq!(err.status(), Some(403));

        let err = decode_tree_response(500, "").unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 500");

        let err = decode_tree_response(401, "{}").unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn empty_success_body_with_wrong_shape_is_invalid() {
        let err = decode_tree_response(200, "").unwrap_err();
        assert_eq!(err, ApiError::InvalidResponse { status: 200 });
    }

    #[test]
    fn headers_carry_bearer_token() {
        let mut session = Session::new();
        assert_eq!(
            auth_headers(&session, true),
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        session.login("tok");
        let headers = auth_headers(&session, false);
        assert_eq!(headers, vec![("Authorization".to_string(), "Bearer tok".to_string())]);
    }

    struct CannedTransport {
        status: u16,
        body: &'static str,
        requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for &CannedTransport {
        fn get(&self, url: &str, headers: &[(String, String)]) -> Result<(u16, String), ApiError> {
            self.requests.borrow_mut().push((url.to_string(), headers.to_vec()));
            Ok((self.status, self.body.to_string()))
        }
    }

    #[test]
    fn client_fetches_tree_with_bearer_token() {
        let transport = CannedTransport::new(200, r#"{"tree":{"userId":"me","fullName":"Me"}}"#);
        let client = ApiClient::new(&transport);
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        let mut session = Session::new();
        session.login("tok");

        let response = client.fetch_tree(&session).expect("tree");
        assert_eq!(response.tree.user_id, "me");

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "http://localhost:8080/api/v1/user/team/tree");
        assert!(requests[0]
            .1
            .contains(&("Authorization".to_string(), "Bearer tok".to_string())));
    }

    #[test]
    fn client_surfaces_server_message() {
        let transport = CannedTransport::new(401, r#"{"message":"Token expired"}"#);
        let client = ApiClient::with_base_url("https://api.example/", &transport);
        let err = client.fetch_tree(&Session::new()).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Token expired");
        assert_eq!(transport.requests.borrow()[0].0, "https://api.example/api/v1/user/team/tree");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint_url("http://api.example/", TEAM_TREE_PATH),
            "http://api.example/api/v1/user/team/tree"
        );
        assert_eq!(
            endpoint_url(DEFAULT_BASE_URL, TEAM_TREE_PATH),
            "http://localhost:8080/api/v1/user/team/tree"
        );
    }
}
