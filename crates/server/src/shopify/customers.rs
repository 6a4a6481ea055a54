//! Customer operations for the Admin API.
//!
//! Covers the three calls the consent resolver needs: lookup by email,
//! marketing-consent update, and creation with consent pre-set.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use popgames_core::Email;

use super::{AdminClient, ShopifyError, UserError, join_user_errors};

/// Marketing consent state of a Shopify customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketingState {
    Subscribed,
    NotSubscribed,
    Unsubscribed,
    Pending,
    Invalid,
    Redacted,
    /// States added by Shopify after this enum was written.
    #[serde(other)]
    Unknown,
}

impl MarketingState {
    /// Whether this state should trigger a consent update on opt-in.
    #[must_use]
    pub const fn needs_opt_in(self) -> bool {
        matches!(self, Self::NotSubscribed | Self::Unsubscribed)
    }
}

/// A customer matched by email lookup.
#[derive(Debug, Clone)]
pub struct CustomerMatch {
    /// Shopify customer GID.
    pub id: String,
    /// Current consent state; `None` when the customer has no consent record.
    pub marketing_state: Option<MarketingState>,
}

/// Payload of the `customerEmailMarketingConsentUpdate` mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentUpdatePayload {
    pub customer: Option<CustomerIdRef>,
    #[serde(rename = "userErrors")]
    pub user_errors: Vec<UserError>,
}

/// Payload of the `customerCreate` mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreatePayload {
    pub customer: Option<CustomerEmailRef>,
    #[serde(rename = "userErrors")]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerIdRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerEmailRef {
    pub email: Option<String>,
}

impl AdminClient {
    /// Find a customer by email address.
    ///
    /// Shopify email search can return several matches; the first one wins,
    /// no de-duplication is attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(shop = %self.shop()))]
    pub async fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<CustomerMatch>, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            customers: Connection,
        }

        #[derive(Deserialize)]
        struct Connection {
            edges: Vec<Edge>,
        }

        #[derive(Deserialize)]
        struct Edge {
            node: Node,
        }

        #[derive(Deserialize)]
        struct Node {
            id: String,
            #[serde(rename = "emailMarketingConsent")]
            email_marketing_consent: Option<Consent>,
        }

        #[derive(Deserialize)]
        struct Consent {
            #[serde(rename = "marketingState")]
            marketing_state: MarketingState,
        }

        const QUERY: &str = r"
            query queryCustomers($query: String!) {
                customers(first: 10, query: $query) {
                    edges {
                        node {
                            id
                            emailMarketingConsent {
                                marketingState
                            }
                        }
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "query": format!("email:{email}") });
        let response: Response = self.query(QUERY, Some(variables)).await?;

        Ok(response.customers.edges.into_iter().next().map(|e| {
            CustomerMatch {
                id: e.node.id,
                marketing_state: e.node.email_marketing_consent.map(|c| c.marketing_state),
            }
        }))
    }

    /// Set an existing customer's email marketing consent to `SUBSCRIBED`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or if there are user errors.
    #[instrument(skip(self), fields(shop = %self.shop(), customer_id = %customer_id))]
    pub async fn update_marketing_consent(
        &self,
        customer_id: &str,
    ) -> Result<ConsentUpdatePayload, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "customerEmailMarketingConsentUpdate")]
            consent_update: Option<ConsentUpdatePayload>,
        }

        const QUERY: &str = r"
            mutation customerEmailMarketingConsentUpdate($input: CustomerEmailMarketingConsentUpdateInput!) {
                customerEmailMarketingConsentUpdate(input: $input) {
                    customer {
                        id
                    }
                    userErrors {
                        field
                        message
                    }
                }
            }
        ";

        let variables = serde_json::json!({
            "input": {
                "customerId": customer_id,
                "emailMarketingConsent": {
                    "marketingState": "SUBSCRIBED",
                    "marketingOptInLevel": "SINGLE_OPT_IN"
                }
            }
        });

        let response: Response = self.query(QUERY, Some(variables)).await?;

        let payload = response
            .consent_update
            .ok_or_else(|| ShopifyError::MissingData("no consent update returned".to_string()))?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(join_user_errors(
                &payload.user_errors,
            )));
        }

        Ok(payload)
    }

    /// Create a new customer with marketing consent pre-set to `SUBSCRIBED`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or if there are user errors.
    #[instrument(skip(self), fields(shop = %self.shop()))]
    pub async fn create_customer(
        &self,
        email: &Email,
    ) -> Result<CustomerCreatePayload, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "customerCreate")]
            customer_create: Option<CustomerCreatePayload>,
        }

        const QUERY: &str = r"
            mutation customerCreate($input: CustomerInput!) {
                customerCreate(input: $input) {
                    customer {
                        email
                    }
                    userErrors {
                        field
                        message
                    }
                }
            }
        ";

        let variables = serde_json::json!({
            "input": {
                "email": email,
                "emailMarketingConsent": {
                    "marketingState": "SUBSCRIBED",
                    "marketingOptInLevel": "SINGLE_OPT_IN"
                }
            }
        });

        let response: Response = self.query(QUERY, Some(variables)).await?;

        let payload = response
            .customer_create
            .ok_or_else(|| ShopifyError::MissingData("no customer returned".to_string()))?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(join_user_errors(
                &payload.user_errors,
            )));
        }

        Ok(payload)
    }
}
