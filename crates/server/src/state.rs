//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use popgames_core::ShopDomain;

use crate::config::ServerConfig;
use crate::db::SessionRepository;
use crate::error::AppError;
use crate::shopify::AdminClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    http: reqwest::Client,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                http: reqwest::Client::new(),
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Build an Admin API client for a shop from its stored offline token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the shop has no stored session (the
    /// app is not installed there), or `AppError::Database` if the token
    /// lookup fails.
    pub async fn admin_client(&self, shop: &ShopDomain) -> Result<AdminClient, AppError> {
        let token = SessionRepository::new(self.pool())
            .offline_token(shop)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no session for shop {shop}")))?;

        Ok(AdminClient::new(
            self.inner.http.clone(),
            shop.clone(),
            token,
            &self.inner.config.shopify.api_version,
        ))
    }
}
