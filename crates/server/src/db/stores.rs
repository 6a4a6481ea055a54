//! Store configuration repository.
//!
//! One row per merchant shop, keyed by shop domain. Only the tier settings
//! and game flags are mutated here; billing linkage and sales aggregates are
//! written by other parts of the system and carried along read-only.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use popgames_core::{ShopDomain, Tier};

use super::RepositoryError;

/// Per-shop pop-up configuration.
///
/// Invariants maintained by the settings service: `low_pct_off < mid_pct_off
/// < high_pct_off` and the three probabilities sum to 1.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub shop: ShopDomain,

    pub low_pct_off: f64,
    pub mid_pct_off: f64,
    pub high_pct_off: f64,

    pub low_prob: f64,
    pub mid_prob: f64,
    pub high_prob: f64,

    /// Shopify discount-node GIDs backing each tier.
    pub low_discount_id: String,
    pub mid_discount_id: String,
    pub high_discount_id: String,

    pub use_word_game: bool,
    pub use_bird_game: bool,

    /// Subscription line-item id, set by the billing flow.
    pub billing_id: Option<String>,
    /// End of the current billing period.
    pub next_period: Option<DateTime<Utc>>,

    /// Display aggregates, produced by the sales tracking job.
    pub total_sales: f64,
    pub curr_sales: f64,
    pub currency_code: Option<String>,
    pub has_coupon: bool,
}

impl StoreConfig {
    /// Percentage-off for a tier.
    #[must_use]
    pub const fn pct_off(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Low => self.low_pct_off,
            Tier::Mid => self.mid_pct_off,
            Tier::High => self.high_pct_off,
        }
    }

    /// Shopify discount id backing a tier.
    #[must_use]
    pub fn discount_id(&self, tier: Tier) -> &str {
        match tier {
            Tier::Low => &self.low_discount_id,
            Tier::Mid => &self.mid_discount_id,
            Tier::High => &self.high_discount_id,
        }
    }
}

/// The six fields the storefront widget needs to pick a prize.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiscountOptions {
    pub low_pct_off: f64,
    pub mid_pct_off: f64,
    pub high_pct_off: f64,
    pub low_prob: f64,
    pub mid_prob: f64,
    pub high_prob: f64,
}

/// Which mini-games the merchant has enabled.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GameOptions {
    pub use_word_game: bool,
    pub use_bird_game: bool,
}

const STORE_COLUMNS: &str = "shop, \
     low_pct_off, mid_pct_off, high_pct_off, \
     low_prob, mid_prob, high_prob, \
     low_discount_id, mid_discount_id, high_discount_id, \
     use_word_game, use_bird_game, \
     billing_id, next_period, \
     total_sales, curr_sales, currency_code, has_coupon";

/// Repository for store configuration rows.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a store's configuration by shop domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, shop: &ShopDomain) -> Result<Option<StoreConfig>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreConfig>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE shop = $1"
        ))
        .bind(shop)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Insert a freshly provisioned store row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the shop already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, store: &StoreConfig) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO stores \
                 (shop, \
                  low_pct_off, mid_pct_off, high_pct_off, \
                  low_prob, mid_prob, high_prob, \
                  low_discount_id, mid_discount_id, high_discount_id, \
                  use_word_game, use_bird_game) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&store.shop)
        .bind(store.low_pct_off)
        .bind(store.mid_pct_off)
        .bind(store.high_pct_off)
        .bind(store.low_prob)
        .bind(store.mid_prob)
        .bind(store.high_prob)
        .bind(&store.low_discount_id)
        .bind(&store.mid_discount_id)
        .bind(&store.high_discount_id)
        .bind(store.use_word_game)
        .bind(store.use_bird_game)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("shop already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// Get the discount options projection for the widget.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn discount_options(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<DiscountOptions>, RepositoryError> {
        let row = sqlx::query_as::<_, DiscountOptions>(
            "SELECT low_pct_off, mid_pct_off, high_pct_off, \
                    low_prob, mid_prob, high_prob \
             FROM stores WHERE shop = $1",
        )
        .bind(shop)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Get the game-flags projection for the widget.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn game_options(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<GameOptions>, RepositoryError> {
        let row = sqlx::query_as::<_, GameOptions>(
            "SELECT use_word_game, use_bird_game FROM stores WHERE shop = $1",
        )
        .bind(shop)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Lock and load a store row inside a transaction.
    ///
    /// Concurrent settings saves for the same shop serialise on this lock,
    /// so the read-validate-sync-write sequence cannot lose updates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_update(
        conn: &mut PgConnection,
        shop: &ShopDomain,
    ) -> Result<Option<StoreConfig>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreConfig>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE shop = $1 FOR UPDATE"
        ))
        .bind(shop)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Persist the merged tier settings in one write.
    ///
    /// Only the merchant-editable fields are touched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop row disappeared.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn save_tier_settings(
        conn: &mut PgConnection,
        store: &StoreConfig,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE stores SET \
                 low_pct_off = $2, mid_pct_off = $3, high_pct_off = $4, \
                 low_prob = $5, mid_prob = $6, high_prob = $7, \
                 use_word_game = $8, use_bird_game = $9, \
                 updated_at = NOW() \
             WHERE shop = $1",
        )
        .bind(&store.shop)
        .bind(store.low_pct_off)
        .bind(store.mid_pct_off)
        .bind(store.high_pct_off)
        .bind(store.low_prob)
        .bind(store.mid_prob)
        .bind(store.high_prob)
        .bind(store.use_word_game)
        .bind(store.use_bird_game)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
