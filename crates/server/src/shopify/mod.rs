//! Shopify Admin API client.
//!
//! # Architecture
//!
//! - Raw GraphQL over reqwest: queries are inline strings with serde types
//!   per operation, so no schema codegen step is needed for the handful of
//!   operations this app performs
//! - One client per (shop, token) pair - the app is multi-tenant and builds
//!   a client per request from the shop's stored offline token
//!
//! # Operations
//!
//! - `customers` - lookup by email, marketing-consent update, creation
//! - `discounts` - percentage sync and provisioning of the tier codes

pub mod customers;
mod discounts;

pub use customers::{CustomerMatch, MarketingState};

use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use popgames_core::ShopDomain;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the API.
    #[error("Admin API request failed: {0}")]
    Api(String),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {0}")]
    GraphQL(String),

    /// User error from a mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The response carried no data for the requested operation.
    #[error("Missing data in response: {0}")]
    MissingData(String),
}

/// A user error attached to a mutation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserError {
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Join mutation user errors into a single display string.
pub(crate) fn join_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| {
            let field = e.field.as_ref().map_or_else(String::new, |f| f.join("."));
            format!("{}: {}", field, e.message)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphQL plumbing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GraphQLRequest {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
}

impl<T> GraphQLResponse<T> {
    fn into_result(self) -> Result<T, ShopifyError> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ShopifyError::GraphQL(messages.join("; ")));
        }

        self.data
            .ok_or_else(|| ShopifyError::MissingData("no data in response".to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin Client
// ─────────────────────────────────────────────────────────────────────────────

/// Shopify Admin API GraphQL client for a single shop.
///
/// Cheaply cloneable; the underlying reqwest client is shared application
/// state so connection pools are reused across shops.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    shop: ShopDomain,
    api_version: String,
    access_token: String,
}

impl AdminClient {
    /// Create a new Admin API client for a shop.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared reqwest client
    /// * `shop` - Shop domain the token belongs to
    /// * `access_token` - Offline Admin API token for the shop
    /// * `api_version` - Admin API version (e.g. 2026-01)
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        shop: ShopDomain,
        access_token: String,
        api_version: &str,
    ) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client,
                shop,
                api_version: api_version.to_string(),
                access_token,
            }),
        }
    }

    /// Get the shop this client is bound to.
    #[must_use]
    pub fn shop(&self) -> &ShopDomain {
        &self.inner.shop
    }

    /// Execute a GraphQL operation against the Admin API.
    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<T, ShopifyError> {
        let endpoint = format!(
            "https://{}/admin/api/{}/graphql.json",
            self.inner.shop, self.inner.api_version
        );

        let request = GraphQLRequest {
            query: query.to_string(),
            variables,
        };

        let response = self
            .inner
            .client
            .post(&endpoint)
            .header("X-Shopify-Access-Token", &self.inner.access_token)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Api(format!("({status}): {text}")));
        }

        let gql_response: GraphQLResponse<T> = response.json().await?;
        gql_response.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_join_user_errors() {
        let errors = vec![
            UserError {
                field: Some(vec!["input".to_string(), "email".to_string()]),
                message: "Email has already been taken".to_string(),
            },
            UserError {
                field: None,
                message: "Something else".to_string(),
            },
        ];
        assert_eq!(
            join_user_errors(&errors),
            "input.email: Email has already been taken; : Something else"
        );
    }

    #[test]
    fn test_graphql_response_surfaces_errors() {
        let response: GraphQLResponse<serde_json::Value> = serde_json::from_str(
            r#"{"data": null, "errors": [{"message": "Field not found"}, {"message": "Invalid ID"}]}"#,
        )
        .unwrap();

        let err = response.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_response_missing_data() {
        let response: GraphQLResponse<serde_json::Value> =
            serde_json::from_str(r#"{"data": null}"#).unwrap();

        assert!(matches!(
            response.into_result(),
            Err(ShopifyError::MissingData(_))
        ));
    }

    #[test]
    fn test_graphql_response_data_passthrough() {
        let response: GraphQLResponse<serde_json::Value> =
            serde_json::from_str(r#"{"data": {"ok": true}}"#).unwrap();

        let data = response.into_result().unwrap();
        assert_eq!(data, serde_json::json!({"ok": true}));
    }
}
