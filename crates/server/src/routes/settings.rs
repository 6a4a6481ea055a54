//! Merchant settings route handlers.
//!
//! The embedded admin UI posts the whole form on save; absent fields mean
//! "leave unchanged". The response message is carried in the JSON payload
//! for the UI to toast, rather than through any client-side global.

use axum::extract::{Form, Query, State};
use axum::response::Json;
use serde::Deserialize;
use tracing::instrument;

use crate::db::stores::StoreConfig;
use crate::error::AppError;
use crate::services::provision;
use crate::services::settings::{SettingsOutcome, TierSettingsUpdate, apply_update};
use crate::state::AppState;

use super::ShopQuery;

/// Form fields posted by the settings page.
///
/// Percentages and probabilities arrive as fractions (the UI divides by 100
/// before submitting); flags arrive as `"true"`/`"false"`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    pub low_pct_off: Option<f64>,
    pub mid_pct_off: Option<f64>,
    pub high_pct_off: Option<f64>,
    pub low_prob: Option<f64>,
    pub mid_prob: Option<f64>,
    pub high_prob: Option<f64>,
    pub use_word_game: Option<bool>,
    pub use_bird_game: Option<bool>,
}

impl From<SettingsForm> for TierSettingsUpdate {
    fn from(form: SettingsForm) -> Self {
        Self {
            low_pct_off: form.low_pct_off,
            mid_pct_off: form.mid_pct_off,
            high_pct_off: form.high_pct_off,
            low_prob: form.low_prob,
            mid_prob: form.mid_prob,
            high_prob: form.high_prob,
            use_word_game: form.use_word_game,
            use_bird_game: form.use_bird_game,
        }
    }
}

/// Get the store configuration, provisioning it on first visit.
#[instrument(skip(state, query), fields(shop = %query.shop))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<StoreConfig>, AppError> {
    let shop = query.domain()?;
    let store = provision::get_or_create_store(&state, &shop).await?;
    Ok(Json(store))
}

/// Save the tier configuration.
///
/// Validation rejections come back as `{"success": false, "message": ...}`
/// with a 200 status; only infrastructure failures produce error statuses.
#[instrument(skip(state, query, form), fields(shop = %query.shop))]
pub async fn update(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
    Form(form): Form<SettingsForm>,
) -> Result<Json<SettingsOutcome>, AppError> {
    let shop = query.domain()?;
    let client = state.admin_client(&shop).await?;
    let outcome = apply_update(state.pool(), &client, &shop, &form.into()).await?;
    Ok(Json(outcome))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_form_field_names_are_camel_case() {
        let form: SettingsForm = serde_json::from_str(
            r#"{
                "lowPctOff": 0.1,
                "midPctOff": 0.15,
                "highPctOff": 0.25,
                "lowProb": 0.6,
                "midProb": 0.3,
                "highProb": 0.1,
                "useWordGame": true,
                "useBirdGame": false
            }"#,
        )
        .unwrap();

        assert_eq!(form.low_pct_off, Some(0.1));
        assert_eq!(form.high_prob, Some(0.1));
        assert_eq!(form.use_word_game, Some(true));
        assert_eq!(form.use_bird_game, Some(false));
    }

    #[test]
    fn test_absent_fields_deserialize_to_none() {
        let form: SettingsForm = serde_json::from_str(r#"{"useWordGame": true}"#).unwrap();
        assert!(form.low_pct_off.is_none());
        assert!(form.use_bird_game.is_none());
        assert_eq!(form.use_word_game, Some(true));
    }

    #[test]
    fn test_form_converts_to_update() {
        let form = SettingsForm {
            mid_pct_off: Some(0.2),
            use_bird_game: Some(true),
            ..Default::default()
        };

        let update = TierSettingsUpdate::from(form);
        assert_eq!(update.mid_pct_off, Some(0.2));
        assert_eq!(update.use_bird_game, Some(true));
        assert!(update.low_prob.is_none());
    }
}
