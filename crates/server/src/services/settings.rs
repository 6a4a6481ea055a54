//! Tier-configuration validation and persistence.
//!
//! A settings save is all-or-nothing: the proposed changes are merged into a
//! candidate, the candidate is validated as a whole, changed percentages are
//! synced to their Shopify discount codes, and only then is the merged record
//! written - in one transaction holding a row lock on the shop, so concurrent
//! saves serialise instead of losing updates.
//!
//! A failed discount sync aborts the save without rolling back tiers that
//! were already synced; the store record is left untouched, so the next
//! successful save resynchronises every changed tier.

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use popgames_core::{ShopDomain, Tier};

use crate::db::stores::StoreConfig;
use crate::db::{RepositoryError, StoreRepository};
use crate::error::AppError;
use crate::shopify::AdminClient;

/// Merchant-proposed field updates. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TierSettingsUpdate {
    pub low_pct_off: Option<f64>,
    pub mid_pct_off: Option<f64>,
    pub high_pct_off: Option<f64>,
    pub low_prob: Option<f64>,
    pub mid_prob: Option<f64>,
    pub high_prob: Option<f64>,
    pub use_word_game: Option<bool>,
    pub use_bird_game: Option<bool>,
}

/// Result of a settings save, as returned to the merchant UI.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsOutcome {
    pub success: bool,
    pub message: String,
}

impl SettingsOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            message: "Updated successfully".to_string(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// A validation rejection; the display string is the merchant-facing message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsRejection {
    #[error("Probabilities must add up to 100%")]
    ProbabilitySum,
    #[error(
        "Higher tier discounts must provide a larger percentage off than the tiers below them"
    )]
    TierOrdering,
}

/// Merge proposed updates over the stored configuration.
#[must_use]
pub fn merge(current: &StoreConfig, update: &TierSettingsUpdate) -> StoreConfig {
    let mut candidate = current.clone();

    if let Some(v) = update.low_pct_off {
        candidate.low_pct_off = v;
    }
    if let Some(v) = update.mid_pct_off {
        candidate.mid_pct_off = v;
    }
    if let Some(v) = update.high_pct_off {
        candidate.high_pct_off = v;
    }
    if let Some(v) = update.low_prob {
        candidate.low_prob = v;
    }
    if let Some(v) = update.mid_prob {
        candidate.mid_prob = v;
    }
    if let Some(v) = update.high_prob {
        candidate.high_prob = v;
    }
    if let Some(v) = update.use_word_game {
        candidate.use_word_game = v;
    }
    if let Some(v) = update.use_bird_game {
        candidate.use_bird_game = v;
    }

    candidate
}

/// Validate a merged candidate configuration.
///
/// Checks run in rejection-message order: probability sum first, then tier
/// ordering. The probability check only fires when the update touched a
/// probability (a stored config already satisfies the invariant).
///
/// # Errors
///
/// Returns the first failing [`SettingsRejection`].
pub fn validate(
    candidate: &StoreConfig,
    update: &TierSettingsUpdate,
) -> Result<(), SettingsRejection> {
    let touches_probabilities =
        update.low_prob.is_some() || update.mid_prob.is_some() || update.high_prob.is_some();

    if touches_probabilities {
        let sum = candidate.low_prob + candidate.mid_prob + candidate.high_prob;
        if (sum - 1.0).abs() > f64::EPSILON {
            return Err(SettingsRejection::ProbabilitySum);
        }
    }

    if !(candidate.low_pct_off < candidate.mid_pct_off
        && candidate.mid_pct_off < candidate.high_pct_off)
    {
        return Err(SettingsRejection::TierOrdering);
    }

    Ok(())
}

/// Tiers whose percentage differs between the stored and candidate configs.
#[must_use]
pub fn changed_tiers(current: &StoreConfig, candidate: &StoreConfig) -> Vec<Tier> {
    Tier::ALL
        .into_iter()
        .filter(|&tier| (current.pct_off(tier) - candidate.pct_off(tier)).abs() > f64::EPSILON)
        .collect()
}

/// Validate, sync, and persist a settings update for a shop.
///
/// Validation rejections and sync failures are merchant-facing outcomes, not
/// errors; only infrastructure failures (database, missing shop) surface as
/// `AppError`.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the shop has no store row, or
/// `AppError::Database` if a query fails.
pub async fn apply_update(
    pool: &PgPool,
    client: &AdminClient,
    shop: &ShopDomain,
    update: &TierSettingsUpdate,
) -> Result<SettingsOutcome, AppError> {
    let mut tx = pool.begin().await.map_err(RepositoryError::Database)?;

    let Some(current) = StoreRepository::get_for_update(&mut tx, shop).await? else {
        return Err(AppError::NotFound(format!("no store for shop {shop}")));
    };

    let candidate = merge(&current, update);

    if let Err(rejection) = validate(&candidate, update) {
        // Dropping the transaction rolls back; nothing was written
        return Ok(SettingsOutcome::rejected(rejection.to_string()));
    }

    for tier in changed_tiers(&current, &candidate) {
        if let Err(e) = client
            .update_discount_percentage(current.discount_id(tier), candidate.pct_off(tier))
            .await
        {
            tracing::warn!(
                shop = %shop,
                tier = %tier,
                error = %e,
                "discount sync failed, aborting settings save"
            );
            return Ok(SettingsOutcome::rejected("Update failed"));
        }
    }

    StoreRepository::save_tier_settings(&mut tx, &candidate).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    tracing::info!(shop = %shop, "settings updated");
    Ok(SettingsOutcome::ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn base_config() -> StoreConfig {
        StoreConfig {
            shop: ShopDomain::parse("test.myshopify.com").unwrap(),
            low_pct_off: 0.10,
            mid_pct_off: 0.15,
            high_pct_off: 0.25,
            low_prob: 0.60,
            mid_prob: 0.30,
            high_prob: 0.10,
            low_discount_id: "gid://shopify/DiscountCodeNode/1".to_string(),
            mid_discount_id: "gid://shopify/DiscountCodeNode/2".to_string(),
            high_discount_id: "gid://shopify/DiscountCodeNode/3".to_string(),
            use_word_game: true,
            use_bird_game: true,
            billing_id: None,
            next_period: None,
            total_sales: 0.0,
            curr_sales: 0.0,
            currency_code: None,
            has_coupon: false,
        }
    }

    #[test]
    fn test_merge_absent_fields_unchanged() {
        let current = base_config();
        let candidate = merge(&current, &TierSettingsUpdate::default());

        assert_eq!(candidate.low_pct_off, current.low_pct_off);
        assert_eq!(candidate.high_prob, current.high_prob);
        assert_eq!(candidate.use_word_game, current.use_word_game);
    }

    #[test]
    fn test_merge_applies_supplied_fields() {
        let current = base_config();
        let update = TierSettingsUpdate {
            mid_pct_off: Some(0.20),
            use_bird_game: Some(false),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert_eq!(candidate.mid_pct_off, 0.20);
        assert!(!candidate.use_bird_game);
        assert_eq!(candidate.low_pct_off, 0.10);
    }

    #[test]
    fn test_validate_accepts_valid_update() {
        let current = base_config();
        let update = TierSettingsUpdate {
            low_pct_off: Some(0.05),
            mid_pct_off: Some(0.10),
            high_pct_off: Some(0.30),
            low_prob: Some(0.5),
            mid_prob: Some(0.3),
            high_prob: Some(0.2),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert_eq!(validate(&candidate, &update), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_probability_sum() {
        let current = base_config();
        let update = TierSettingsUpdate {
            low_prob: Some(0.3),
            mid_prob: Some(0.3),
            high_prob: Some(0.3),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert_eq!(
            validate(&candidate, &update),
            Err(SettingsRejection::ProbabilitySum)
        );
    }

    #[test]
    fn test_validate_probability_check_before_ordering() {
        // Both invariants violated; the probability message wins
        let current = base_config();
        let update = TierSettingsUpdate {
            low_pct_off: Some(0.2),
            mid_pct_off: Some(0.1),
            high_pct_off: Some(0.3),
            low_prob: Some(0.3),
            mid_prob: Some(0.3),
            high_prob: Some(0.3),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert_eq!(
            validate(&candidate, &update),
            Err(SettingsRejection::ProbabilitySum)
        );
    }

    #[test]
    fn test_validate_rejects_unordered_tiers() {
        let current = base_config();
        let update = TierSettingsUpdate {
            low_pct_off: Some(0.2),
            mid_pct_off: Some(0.1),
            high_pct_off: Some(0.3),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert_eq!(
            validate(&candidate, &update),
            Err(SettingsRejection::TierOrdering)
        );
    }

    #[test]
    fn test_validate_rejects_equal_tiers() {
        // Ordering is strict
        let current = base_config();
        let update = TierSettingsUpdate {
            low_pct_off: Some(0.15),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert_eq!(
            validate(&candidate, &update),
            Err(SettingsRejection::TierOrdering)
        );
    }

    #[test]
    fn test_validate_skips_probability_check_when_untouched() {
        // Stored probabilities already sum to 1, and the update leaves them
        // alone; a flags-only change must pass
        let current = base_config();
        let update = TierSettingsUpdate {
            use_word_game: Some(false),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert_eq!(validate(&candidate, &update), Ok(()));
    }

    #[test]
    fn test_validate_partial_probability_update_checks_merged_sum() {
        // Only one probability supplied: the merged sum (0.5 + 0.3 + 0.1)
        // no longer reaches 1, so the save is rejected
        let current = base_config();
        let update = TierSettingsUpdate {
            low_prob: Some(0.5),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert_eq!(
            validate(&candidate, &update),
            Err(SettingsRejection::ProbabilitySum)
        );
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            SettingsRejection::ProbabilitySum.to_string(),
            "Probabilities must add up to 100%"
        );
        assert_eq!(
            SettingsRejection::TierOrdering.to_string(),
            "Higher tier discounts must provide a larger percentage off than the tiers below them"
        );
    }

    #[test]
    fn test_changed_tiers_empty_when_identical() {
        let current = base_config();
        assert!(changed_tiers(&current, &current).is_empty());
    }

    #[test]
    fn test_changed_tiers_detects_differences() {
        let current = base_config();
        let update = TierSettingsUpdate {
            low_pct_off: Some(0.12),
            high_pct_off: Some(0.35),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert_eq!(
            changed_tiers(&current, &candidate),
            vec![Tier::Low, Tier::High]
        );
    }

    #[test]
    fn test_changed_tiers_ignores_probability_changes() {
        let current = base_config();
        let update = TierSettingsUpdate {
            low_prob: Some(0.5),
            mid_prob: Some(0.4),
            high_prob: Some(0.1),
            ..Default::default()
        };

        let candidate = merge(&current, &update);
        assert!(changed_tiers(&current, &candidate).is_empty());
    }
}
