use axum::{extract::State, Json};
use tracing::{instrument, debug, info, warn};

use crate::dto::SettingsDto;
use crate::errors::ApiError;
use crate::principal::Principal;
use crate::quota;
use crate::repo;
use crate::AppState;

/// Handler for getting the caller's settings and quota usage
///
/// This function handles GET requests to `/settings`. A settings row is
/// created with the default limits the first time a user asks for it.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `principal` - The acting principal resolved from the request headers
///
/// ### Returns
///
/// The caller's settings and current quota usage as JSON
#[instrument(skip(state, principal), fields(user = principal.user_id.as_deref().unwrap_or("anonymous")))]
pub async fn get_settings_handler(
    // Extract the shared application state
    State(state): State<AppState>,
    // Resolve the acting principal from the request headers
    principal: Principal,
) -> Result<Json<SettingsDto>, ApiError> {
    debug!("Retrieving settings");

    let Some(user_id) = principal.user_id else {
        warn!("Anonymous caller has no settings");
        return Err(ApiError::Unauthorized(
            "Authentication required.".to_string(),
        ));
    };

    let (settings, reviews_used, media_items_used) =
        repo::get_settings_snapshot(&state.pool, &user_id).map_err(ApiError::Database)?;

    info!("Retrieved settings for user: {}", user_id);
    Ok(Json(SettingsDto {
        user_id: settings.get_user_id(),
        review_limit: settings.get_review_limit(),
        media_item_limit: settings.get_media_item_limit(),
        reviews_used,
        reviews_remaining: quota::remaining(settings.get_review_limit(), reviews_used),
        media_items_used,
        media_items_remaining: quota::remaining(settings.get_media_item_limit(), media_items_used),
        can_create_review: quota::can_create(settings.get_review_limit(), reviews_used),
        can_create_media_item: quota::can_create(settings.get_media_item_limit(), media_items_used),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Review;
    use crate::repo;
    use crate::test_utils::setup_engine;
    use axum::extract::State;

    #[tokio::test]
    async fn test_get_settings_handler_requires_auth() {
        let (pool, registry) = setup_engine();
        let state = AppState::new(pool, registry);

        let result = get_settings_handler(State(state), Principal::anonymous()).await;

        assert!(matches!(result.unwrap_err(), ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_get_settings_handler_counts_usage() {
        let (pool, registry) = setup_engine();
        let state = AppState::new(pool, registry);

        let conn = &mut state.pool.get().unwrap();
        repo::insert_review(conn, &Review::new(Some("alice".to_string()))).unwrap();
        repo::insert_review(conn, &Review::new(Some("alice".to_string()))).unwrap();
        repo::insert_review(conn, &Review::new(Some("bob".to_string()))).unwrap();

        let settings = get_settings_handler(State(state.clone()), Principal::user("alice"))
            .await
            .unwrap()
            .0;

        assert_eq!(settings.user_id, "alice");
        assert_eq!(settings.reviews_used, 2);
        assert_eq!(settings.media_items_used, 0);

        // Fresh settings rows carry no limits
        assert_eq!(settings.review_limit, None);
        assert_eq!(settings.reviews_remaining, "Unlimited");
        assert!(settings.can_create_review);
        assert!(settings.can_create_media_item);
    }
}
