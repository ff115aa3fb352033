//! API client for the Smart Intercom GraphQL endpoint.
//!
//! All requests are JSON POSTs against a single endpoint. The client
//! re-reads the token store before every dispatch so a token written by
//! one operation is carried by the next without rebuilding the client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::auth::TokenStore;

use super::ApiError;

/// HTTP request timeout in seconds.
/// The intercom service answers quickly; 30s fails fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Login mutation. The server answers with an opaque bearer token string,
/// or null when the call is a no-op.
const LOGIN_QUERY: &str = "\
mutation login($isRemember: Boolean!, $password: String!) {
  login(input: {isRemember: $isRemember, password: $password})
}";

/// Refresh query. Takes no arguments; the session to renew is identified
/// by the authorization header.
const REFRESH_QUERY: &str = "query refresh { refreshToken }";

#[derive(Serialize)]
struct ApiRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<ResponseError>,
}

#[derive(Deserialize)]
struct ResponseError {
    message: String,
}

/// API client for the intercom service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    /// Create the single request client for the process lifetime.
    pub fn new(endpoint: String, tokens: Arc<TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            tokens,
        })
    }

    /// Authenticate with a password. Returns the issued token, or `None`
    /// when the server answered without one.
    pub async fn login(
        &self,
        is_remember: bool,
        password: &str,
    ) -> Result<Option<String>, ApiError> {
        let variables = serde_json::json!({
            "isRemember": is_remember,
            "password": password,
        });
        self.execute(LOGIN_QUERY, variables, "login").await
    }

    /// Exchange the stored (possibly stale) token for a renewed one.
    pub async fn refresh_token(&self) -> Result<Option<String>, ApiError> {
        self.execute(REFRESH_QUERY, Value::Null, "refreshToken")
            .await
    }

    async fn execute(
        &self,
        query: &str,
        variables: Value,
        field: &str,
    ) -> Result<Option<String>, ApiError> {
        let result = self.dispatch(query, variables, field).await;
        // Diagnostic logging only; interpreting the failure is the
        // caller's responsibility.
        if let Err(ref e) = result {
            error!(operation = field, error = %e, "API request failed");
        }
        result
    }

    async fn dispatch(
        &self,
        query: &str,
        variables: Value,
        field: &str,
    ) -> Result<Option<String>, ApiError> {
        // Fresh lookup on every outgoing request so a token change takes
        // effect on the next call. Empty value when no token is stored.
        let auth_value = match self.tokens.load() {
            Some(token) => format!("Bearer {}", token),
            None => String::new(),
        };

        debug!(operation = field, "Dispatching API request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, auth_value)
            .json(&ApiRequest { query, variables })
            .send()
            .await
            .map_err(ApiError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;

        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let parsed: ApiResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::ParseFailure(e.to_string()))?;

        if let Some(first) = parsed.errors.into_iter().next() {
            return Err(ApiError::Rejected(first.message));
        }

        let token = parsed
            .data
            .as_ref()
            .and_then(|data| data.get(field))
            .and_then(Value::as_str)
            .map(str::to_string);

        // An empty token string is a no-op success, same as null
        Ok(token.filter(|t| !t.is_empty()))
    }
}
