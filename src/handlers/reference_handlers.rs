use axum::{extract::State, Json};
use tracing::{instrument, debug, info};

use crate::errors::ApiError;
use crate::models::{Country, Genre};
use crate::repo;
use crate::AppState;

/// Handler for listing all genres
///
/// This function handles GET requests to `/genres`. The reference set is
/// shared by every caller, so no principal is involved.
///
/// ### Arguments
///
/// * `state` - The shared application state
///
/// ### Returns
///
/// A list of genres as JSON, ordered by name
#[instrument(skip(state))]
pub async fn list_genres_handler(
    // Extract the shared application state
    State(state): State<AppState>,
) -> Result<Json<Vec<Genre>>, ApiError> {
    debug!("Listing genres");

    let genres = repo::get_genres(&state.pool).map_err(ApiError::Database)?;

    info!("Retrieved {} genres", genres.len());
    Ok(Json(genres))
}

/// Handler for listing all countries
///
/// This function handles GET requests to `/countries`.
///
/// ### Arguments
///
/// * `state` - The shared application state
///
/// ### Returns
///
/// A list of countries as JSON, ordered by name
#[instrument(skip(state))]
pub async fn list_countries_handler(
    // Extract the shared application state
    State(state): State<AppState>,
) -> Result<Json<Vec<Country>>, ApiError> {
    debug!("Listing countries");

    let countries = repo::get_countries(&state.pool).map_err(ApiError::Database)?;

    info!("Retrieved {} countries", countries.len());
    Ok(Json(countries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_engine;
    use axum::extract::State;

    #[tokio::test]
    async fn test_list_genres_handler() {
        let (pool, registry) = setup_engine();
        let state = AppState::new(pool, registry);

        let genres = list_genres_handler(State(state)).await.unwrap().0;

        // The migrations seed the shared genre set, sorted by name
        assert!(!genres.is_empty());
        let names: Vec<String> = genres.iter().map(|g| g.get_name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_list_countries_handler() {
        let (pool, registry) = setup_engine();
        let state = AppState::new(pool, registry);

        let countries = list_countries_handler(State(state)).await.unwrap().0;

        assert!(!countries.is_empty());
        let names: Vec<String> = countries.iter().map(|c| c.get_name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
