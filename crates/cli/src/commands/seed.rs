//! Development seeding command.
//!
//! Inserts the session token the OAuth layer would normally write, plus a
//! store row with placeholder discount ids, so the server can be exercised
//! locally without going through an install flow. Discount sync calls will
//! still hit the real Admin API for the given token.

use secrecy::SecretString;
use tracing::info;

use popgames_core::{ShopDomain, Tier};
use popgames_server::db;

/// Seed a development shop: session token + store row.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the shop domain is
/// invalid, or database operations fail.
pub async fn dev_shop(shop: &str, token: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let shop = ShopDomain::parse(shop)?;

    let database_url = std::env::var("POPGAMES_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "POPGAMES_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    sqlx::query(
        "INSERT INTO shopify_sessions (shop, access_token) \
         VALUES ($1, $2) \
         ON CONFLICT (shop) DO UPDATE SET access_token = $2, updated_at = NOW()",
    )
    .bind(&shop)
    .bind(token)
    .execute(&pool)
    .await?;
    info!(shop = %shop, "Session token seeded");

    let inserted = sqlx::query(
        "INSERT INTO stores \
             (shop, low_discount_id, mid_discount_id, high_discount_id) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (shop) DO NOTHING",
    )
    .bind(&shop)
    .bind(placeholder_discount_id(Tier::Low))
    .bind(placeholder_discount_id(Tier::Mid))
    .bind(placeholder_discount_id(Tier::High))
    .execute(&pool)
    .await?
    .rows_affected();

    if inserted > 0 {
        info!(shop = %shop, "Store row seeded with defaults");
    } else {
        info!(shop = %shop, "Store row already exists, left unchanged");
    }

    Ok(())
}

/// Placeholder GID for a seeded tier; real ids come from provisioning.
fn placeholder_discount_id(tier: Tier) -> String {
    format!("gid://shopify/DiscountCodeNode/seed-{}", tier.label())
}
