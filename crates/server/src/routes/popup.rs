//! Storefront widget route handler.
//!
//! One endpoint serves the whole pop-up: the request body's shape decides the
//! operation. The shape is resolved once at the boundary into a
//! [`PopupRequest`] variant; bodies matching none of the known shapes are
//! rejected by the extractor with 422 rather than falling through silently.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use tracing::instrument;

use popgames_core::{Email, GameKind};

use crate::db::players::GameStats;
use crate::db::{PlayerRepository, StoreRepository};
use crate::error::AppError;
use crate::services::consent;
use crate::state::AppState;

use super::ShopQuery;

/// Marker that only deserializes from the JSON literal `true`.
///
/// The widget sends its operation flags as `true`; anything else makes the
/// variant mismatch instead of silently selecting the wrong operation.
#[derive(Debug, Clone, Copy)]
pub struct True;

impl<'de> Deserialize<'de> for True {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if bool::deserialize(deserializer)? {
            Ok(Self)
        } else {
            Err(serde::de::Error::custom("expected `true`"))
        }
    }
}

/// One recorded play of a game.
#[derive(Debug, Deserialize)]
pub struct PlayRecord {
    pub game: GameKind,
    pub score: i64,
}

/// `{email, setUserStats: {game, score}}` - record a play.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SetStatsRequest {
    pub email: Email,
    pub set_user_stats: PlayRecord,
}

/// `{email, getUserStats: true}` - read a player's counters.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct GetStatsRequest {
    pub email: Email,
    pub get_user_stats: True,
}

/// `{getDiscountOptions: true}` - read the tier configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DiscountOptionsRequest {
    pub get_discount_options: True,
}

/// `{getGameOptions: true}` - read the game flags.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct GameOptionsRequest {
    pub get_game_options: True,
}

/// `{email}` - resolve marketing consent.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsentRequest {
    pub email: Email,
}

/// Every request shape the widget sends, decided once at the boundary.
///
/// Variants are tried in declaration order, most specific first, so a stats
/// request is never mistaken for a bare consent request.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PopupRequest {
    SetStats(SetStatsRequest),
    GetStats(GetStatsRequest),
    DiscountOptions(DiscountOptionsRequest),
    GameOptions(GameOptionsRequest),
    Consent(ConsentRequest),
}

/// Handle a storefront widget request.
#[instrument(skip(state, query, request), fields(shop = %query.shop))]
pub async fn handle(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
    Json(request): Json<PopupRequest>,
) -> Result<Json<Value>, AppError> {
    let shop = query.domain()?;

    match request {
        PopupRequest::SetStats(req) => {
            let stats = PlayerRepository::new(state.pool())
                .record_play(&req.email, req.set_user_stats.game, req.set_user_stats.score)
                .await?;
            Ok(Json(updated_stats_body(req.set_user_stats.game, stats)))
        }
        PopupRequest::GetStats(req) => {
            let stats = PlayerRepository::new(state.pool()).get(&req.email).await?;
            Ok(Json(json!({ "userStats": stats })))
        }
        PopupRequest::DiscountOptions(_) => {
            let options = StoreRepository::new(state.pool())
                .discount_options(&shop)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("no store for shop {shop}")))?;
            Ok(Json(json!({ "discountOptions": options })))
        }
        PopupRequest::GameOptions(_) => {
            let options = StoreRepository::new(state.pool())
                .game_options(&shop)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("no store for shop {shop}")))?;
            Ok(Json(json!({ "gameOptions": options })))
        }
        PopupRequest::Consent(req) => {
            let client = state.admin_client(&shop).await?;
            let outcome = consent::resolve(&client, &req.email).await?;
            Ok(Json(json!({
                "email": req.email,
                "customerResponse": outcome.customer_response,
                "validEmailGiven": outcome.valid_email_given,
            })))
        }
    }
}

/// Build the `updatedUserStats` body with the keys for the played game.
fn updated_stats_body(game: GameKind, stats: GameStats) -> Value {
    let counters = match game {
        GameKind::WordGame => json!({
            "wordGamesPlayed": stats.played,
            "wordGamesTotal": stats.total,
            "wordGameBest": stats.best,
        }),
        GameKind::BirdGame => json!({
            "birdGamesPlayed": stats.played,
            "birdGamesTotal": stats.total,
            "birdGameBest": stats.best,
        }),
    };

    json!({ "updatedUserStats": counters })
}
