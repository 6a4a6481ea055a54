//! Marketing-consent resolution for player emails.
//!
//! The pop-up asks players for an email before they play; this service makes
//! sure a Shopify customer exists for it with marketing consent `SUBSCRIBED`,
//! and reports whether a new opt-in actually happened (the widget only awards
//! a prize code for a fresh opt-in).

use serde::Serialize;
use tracing::instrument;

use popgames_core::Email;

use crate::shopify::{AdminClient, CustomerMatch, ShopifyError};

/// What the resolver decided to do for an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentAction {
    /// Customer exists but has not opted in; update their consent.
    Subscribe { customer_id: String },
    /// Customer exists and is already subscribed (or in a state we must not
    /// override, e.g. pending double opt-in); leave them alone.
    LeaveAlone,
    /// No customer for this email; create one with consent pre-set.
    Create,
}

/// Result of consent resolution, as returned to the widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentOutcome {
    /// Serialized Shopify mutation payload, when a call was made.
    pub customer_response: Option<String>,
    /// Whether a new opt-in action was taken for this email.
    pub valid_email_given: bool,
}

/// Decide what to do for a lookup result.
#[must_use]
pub fn action_for(existing: Option<&CustomerMatch>) -> ConsentAction {
    match existing {
        Some(customer) => {
            if customer.marketing_state.is_some_and(|s| s.needs_opt_in()) {
                ConsentAction::Subscribe {
                    customer_id: customer.id.clone(),
                }
            } else {
                ConsentAction::LeaveAlone
            }
        }
        None => ConsentAction::Create,
    }
}

/// Resolve marketing consent for an email against the shop's customer base.
///
/// # Errors
///
/// Returns `ShopifyError` if any Admin API call fails.
#[instrument(skip(client), fields(shop = %client.shop()))]
pub async fn resolve(client: &AdminClient, email: &Email) -> Result<ConsentOutcome, ShopifyError> {
    let existing = client.find_customer_by_email(email).await?;

    match action_for(existing.as_ref()) {
        ConsentAction::Subscribe { customer_id } => {
            let payload = client.update_marketing_consent(&customer_id).await?;
            tracing::info!(customer_id = %customer_id, "marketing consent updated");
            Ok(ConsentOutcome {
                customer_response: serde_json::to_string(&payload).ok(),
                valid_email_given: true,
            })
        }
        ConsentAction::LeaveAlone => Ok(ConsentOutcome {
            customer_response: None,
            valid_email_given: false,
        }),
        ConsentAction::Create => {
            let payload = client.create_customer(email).await?;
            tracing::info!("customer created with marketing consent");
            Ok(ConsentOutcome {
                customer_response: serde_json::to_string(&payload).ok(),
                valid_email_given: true,
            })
        }
    }
}
