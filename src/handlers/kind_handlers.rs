use axum::{extract::State, Json};
use tracing::{instrument, debug, info};

use crate::dto::KindDto;
use crate::errors::ApiError;
use crate::AppState;

/// Handler for listing the enabled rating strategy kinds
///
/// This function handles GET requests to `/kinds/strategies`. Kinds are
/// returned in the engine configuration's declaration order, each carrying
/// the stable id clients use in submissions.
///
/// ### Arguments
///
/// * `state` - The shared application state
///
/// ### Returns
///
/// A list of strategy kind descriptors as JSON
#[instrument(skip(state), fields(config = %state.registry.config_name()))]
pub async fn list_strategy_kinds_handler(
    // Extract the shared application state
    State(state): State<AppState>,
) -> Result<Json<Vec<KindDto>>, ApiError> {
    debug!("Listing strategy kinds");

    let mut kinds = Vec::new();
    for kind in state.registry.strategy_kinds() {
        kinds.push(KindDto {
            kind_id: state.registry.strategy_kind_id(*kind)?,
            model: kind.model_name().to_string(),
            name: kind.display_name().to_string(),
        });
    }

    info!("Retrieved {} strategy kinds", kinds.len());
    Ok(Json(kinds))
}

/// Handler for listing the enabled media kinds
///
/// This function handles GET requests to `/kinds/media`.
///
/// ### Arguments
///
/// * `state` - The shared application state
///
/// ### Returns
///
/// A list of media kind descriptors as JSON
#[instrument(skip(state), fields(config = %state.registry.config_name()))]
pub async fn list_media_kinds_handler(
    // Extract the shared application state
    State(state): State<AppState>,
) -> Result<Json<Vec<KindDto>>, ApiError> {
    debug!("Listing media kinds");

    let mut kinds = Vec::new();
    for kind in state.registry.media_kinds() {
        kinds.push(KindDto {
            kind_id: state.registry.media_kind_id(*kind)?,
            model: kind.model_name().to_string(),
            name: kind.display_name().to_string(),
        });
    }

    info!("Retrieved {} media kinds", kinds.len());
    Ok(Json(kinds))
}
