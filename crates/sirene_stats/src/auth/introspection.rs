//! OAuth2 token introspection client (RFC 7662)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::{Error, Result};

/// Authorization scheme expected in front of the token.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Settings for reaching the introspection endpoint.
#[derive(Debug, Clone)]
pub struct IntrospectionConfig {
    /// Introspection endpoint URL.
    pub url: String,
    /// Client identifier used for HTTP Basic authentication.
    pub client_id: String,
    /// Client secret used for HTTP Basic authentication.
    pub client_secret: String,
    /// Upper bound on one introspection round trip.
    pub timeout: Duration,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            url: "http://oauth2-server:4000/oauth/introspect".to_string(),
            client_id: "spark-api-client".to_string(),
            client_secret: "spark_api_secret".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Introspection result for an accepted token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Whether the authorization server considers the token valid
    #[serde(default)]
    pub active: bool,
    /// Every other claim returned by the server
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl TokenInfo {
    /// The `client_id` claim, if present.
    pub fn client_id(&self) -> Option<&str> {
        self.claims.get("client_id").and_then(Value::as_str)
    }

    /// The `scope` claim, if present.
    pub fn scope(&self) -> Option<&str> {
        self.claims.get("scope").and_then(Value::as_str)
    }
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str> {
    authorization
        .and_then(|header| header.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
        .ok_or(Error::MissingToken)
}

/// Validates bearer tokens against a remote introspection endpoint.
///
/// Every call goes to the server; results are not cached.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    config: IntrospectionConfig,
    http: reqwest::Client,
}

impl TokenValidator {
    /// Create a validator for the given endpoint.
    pub fn new(config: IntrospectionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    /// The endpoint settings.
    pub fn config(&self) -> &IntrospectionConfig {
        &self.config
    }

    /// Validate a raw `Authorization` header value.
    pub async fn validate(&self, authorization: Option<&str>) -> Result<TokenInfo> {
        let token = bearer_token(authorization)?;
        self.introspect(token).await
    }

    /// Ask the authorization server about `token`.
    ///
    /// Fails with [`Error::InvalidToken`] when the server reports the token
    /// inactive, and with [`Error::IntrospectionUnavailable`] when no usable
    /// answer could be obtained.
    pub async fn introspect(&self, token: &str) -> Result<TokenInfo> {
        let response = self
            .http
            .post(&self.config.url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| Error::IntrospectionUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::IntrospectionUnavailable(format!(
                "introspection endpoint returned {}",
                status
            )));
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            Error::IntrospectionUnavailable(format!("unreadable introspection response: {}", e))
        })?;

        if !info.active {
            return Err(Error::InvalidToken);
        }

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = IntrospectionConfig::default();
        assert_eq!(config.url, "http://oauth2-server:4000/oauth/introspect");
        assert_eq!(config.client_id, "spark-api-client");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(Error::MissingToken)));
        assert!(matches!(
            bearer_token(Some("Basic abc")),
            Err(Error::MissingToken)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer ")),
            Err(Error::MissingToken)
        ));
    }

    #[test]
    fn test_token_info_claims() {
        let info: TokenInfo = serde_json::from_value(json!({
            "active": true,
            "client_id": "frontend-client",
            "scope": "read",
            "exp": 1700000000
        }))
        .unwrap();

        assert!(info.active);
        assert_eq!(info.client_id(), Some("frontend-client"));
        assert_eq!(info.scope(), Some("read"));
        assert_eq!(info.claims["exp"], 1700000000);
    }

    #[test]
    fn test_missing_active_means_inactive() {
        let info: TokenInfo = serde_json::from_value(json!({})).unwrap();
        assert!(!info.active);
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let validator = TokenValidator::new(IntrospectionConfig {
            url: format!("http://{}/oauth/introspect", addr),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        match validator.validate(Some("Bearer abc")).await {
            Err(Error::IntrospectionUnavailable(_)) => {}
            other => panic!("expected IntrospectionUnavailable, got {:?}", other),
        }
    }
}
