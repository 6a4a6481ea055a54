//! First-visit store provisioning.
//!
//! A store row is created the first time a merchant opens the settings page:
//! the three tier discount codes are created in Shopify and their ids stored
//! alongside the default configuration. Deletion is an uninstall concern and
//! never happens here.

use tracing::instrument;

use popgames_core::{ShopDomain, Tier};

use crate::db::stores::StoreConfig;
use crate::db::{RepositoryError, StoreRepository};
use crate::error::AppError;
use crate::state::AppState;

/// Default percentage-off for a freshly provisioned tier.
const fn default_pct_off(tier: Tier) -> f64 {
    match tier {
        Tier::Low => 0.10,
        Tier::Mid => 0.15,
        Tier::High => 0.25,
    }
}

/// Default probability-of-occurrence for a freshly provisioned tier.
///
/// Sums to 1 across the three tiers.
const fn default_prob(tier: Tier) -> f64 {
    match tier {
        Tier::Low => 0.60,
        Tier::Mid => 0.30,
        Tier::High => 0.10,
    }
}

/// Load a shop's store row, provisioning it on first visit.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the shop has no stored session,
/// `AppError::Shopify` if discount creation fails, or `AppError::Database`
/// if a query fails.
#[instrument(skip(state))]
pub async fn get_or_create_store(
    state: &AppState,
    shop: &ShopDomain,
) -> Result<StoreConfig, AppError> {
    let repo = StoreRepository::new(state.pool());

    if let Some(store) = repo.get(shop).await? {
        return Ok(store);
    }

    tracing::info!(shop = %shop, "provisioning store on first visit");

    let client = state.admin_client(shop).await?;
    let mut discount_ids = Vec::with_capacity(Tier::ALL.len());
    for tier in Tier::ALL {
        let id = client
            .create_discount_code(
                &format!("PopGames {} Tier", tier.label()),
                tier.discount_code(),
                default_pct_off(tier),
            )
            .await?;
        discount_ids.push(id);
    }

    let mut ids = discount_ids.into_iter();
    let store = StoreConfig {
        shop: shop.clone(),
        low_pct_off: default_pct_off(Tier::Low),
        mid_pct_off: default_pct_off(Tier::Mid),
        high_pct_off: default_pct_off(Tier::High),
        low_prob: default_prob(Tier::Low),
        mid_prob: default_prob(Tier::Mid),
        high_prob: default_prob(Tier::High),
        low_discount_id: ids.next().unwrap_or_default(),
        mid_discount_id: ids.next().unwrap_or_default(),
        high_discount_id: ids.next().unwrap_or_default(),
        use_word_game: true,
        use_bird_game: true,
        billing_id: None,
        next_period: None,
        total_sales: 0.0,
        curr_sales: 0.0,
        currency_code: None,
        has_coupon: false,
    };

    match repo.create(&store).await {
        Ok(()) => Ok(store),
        // Two first visits raced; the other one won, read its row back
        Err(RepositoryError::Conflict(_)) => repo
            .get(shop)
            .await?
            .ok_or_else(|| AppError::Internal("store vanished after conflict".to_string())),
        Err(e) => Err(e.into()),
    }
}
