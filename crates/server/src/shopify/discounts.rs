//! Discount operations for the Admin API.
//!
//! Each tier is backed by one basic discount code. Provisioning creates the
//! three codes at install time; the settings save syncs percentage changes
//! into them.

use serde::Deserialize;
use tracing::instrument;

use super::{AdminClient, ShopifyError, UserError, join_user_errors};

#[derive(Debug, Deserialize)]
struct DiscountCodePayload {
    #[serde(rename = "codeDiscountNode")]
    code_discount_node: Option<NodeRef>,
    #[serde(rename = "userErrors")]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct NodeRef {
    id: String,
}

impl AdminClient {
    /// Create a basic percentage discount code.
    ///
    /// # Arguments
    ///
    /// * `title` - Internal discount title
    /// * `code` - Customer-facing discount code
    /// * `percentage` - Discount fraction (0.0-1.0)
    ///
    /// # Returns
    ///
    /// Returns the created discount node's GID on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self), fields(shop = %self.shop()))]
    pub async fn create_discount_code(
        &self,
        title: &str,
        code: &str,
        percentage: f64,
    ) -> Result<String, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "discountCodeBasicCreate")]
            discount_create: Option<DiscountCodePayload>,
        }

        const QUERY: &str = r"
            mutation discountCodeBasicCreate($basicCodeDiscount: DiscountCodeBasicInput!) {
                discountCodeBasicCreate(basicCodeDiscount: $basicCodeDiscount) {
                    codeDiscountNode {
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
            "basicCodeDiscount": {
                "title": title,
                "code": code,
                "startsAt": chrono::Utc::now().to_rfc3339(),
                "customerSelection": { "all": true },
                "customerGets": {
                    "value": { "percentage": percentage },
                    "items": { "all": true }
                },
                "appliesOncePerCustomer": false
            }
        });

        let response: Response = self.query(QUERY, Some(variables)).await?;

        let payload = response
            .discount_create
            .ok_or_else(|| ShopifyError::MissingData("no discount returned".to_string()))?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(join_user_errors(
                &payload.user_errors,
            )));
        }

        payload
            .code_discount_node
            .map(|n| n.id)
            .ok_or_else(|| ShopifyError::MissingData("no discount returned".to_string()))
    }

    /// Set the percentage of an existing basic discount code.
    ///
    /// # Arguments
    ///
    /// * `discount_id` - Discount node GID backing the tier
    /// * `percentage` - New discount fraction (0.0-1.0)
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self), fields(shop = %self.shop(), discount_id = %discount_id))]
    pub async fn update_discount_percentage(
        &self,
        discount_id: &str,
        percentage: f64,
    ) -> Result<(), ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "discountCodeBasicUpdate")]
            discount_update: Option<DiscountCodePayload>,
        }

        const QUERY: &str = r"
            mutation discountCodeBasicUpdate($id: ID!, $basicCodeDiscount: DiscountCodeBasicInput!) {
                discountCodeBasicUpdate(id: $id, basicCodeDiscount: $basicCodeDiscount) {
                    codeDiscountNode {
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
            "id": discount_id,
            "basicCodeDiscount": {
                "customerGets": {
                    "value": { "percentage": percentage },
                    "items": { "all": true }
                }
            }
        });

        let response: Response = self.query(QUERY, Some(variables)).await?;

        let payload = response
            .discount_update
            .ok_or_else(|| ShopifyError::MissingData("no discount returned".to_string()))?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(join_user_errors(
                &payload.user_errors,
            )));
        }

        Ok(())
    }
}
