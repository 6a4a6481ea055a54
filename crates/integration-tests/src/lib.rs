//! Integration tests for PopGames.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p popgames-cli -- migrate
//!
//! # Seed a development shop
//! cargo run -p popgames-cli -- seed -s dev-shop.myshopify.com -t <token>
//!
//! # Start the server
//! cargo run -p popgames-server
//!
//! # Run integration tests
//! cargo test -p popgames-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `POPGAMES_BASE_URL` - Server base URL (default: `http://localhost:3000`)
//! - `POPGAMES_TEST_SHOP` - Seeded shop domain (default:
//!   `dev-shop.myshopify.com`)
//!
//! Tests touching the consent resolver additionally need valid Shopify
//! credentials seeded for the test shop.

/// Base URL for the server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("POPGAMES_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Shop domain used by the tests (configurable via environment).
#[must_use]
pub fn test_shop() -> String {
    std::env::var("POPGAMES_TEST_SHOP").unwrap_or_else(|_| "dev-shop.myshopify.com".to_string())
}
