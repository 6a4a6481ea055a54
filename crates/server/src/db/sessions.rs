//! Shopify session token lookup.
//!
//! The external OAuth layer persists one offline Admin API token per shop at
//! install time. This repository only reads them; creating and refreshing
//! sessions is out of scope here.

use sqlx::PgPool;

use popgames_core::ShopDomain;

use super::RepositoryError;

/// Repository for per-shop Shopify sessions.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the offline Admin API access token for a shop, if installed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn offline_token(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<String>, RepositoryError> {
        let token = sqlx::query_scalar::<_, String>(
            "SELECT access_token FROM shopify_sessions WHERE shop = $1",
        )
        .bind(shop)
        .fetch_optional(self.pool)
        .await?;

        Ok(token)
    }
}
