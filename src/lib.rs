/// Marginalia: A Multi-Tenant Media Review Engine Library
///
/// This library provides the core functionality for a media review engine,
/// including pluggable rating strategies, reviewable media catalogues,
/// per-user quotas, and a web API.
///
/// The name "Marginalia" refers to the notes readers leave in the margins of
/// their books, which is fitting for an engine built around personal reviews.
///
/// ### Modules
///
/// - `config`: Configuration loading and precedence
/// - `db`: Database connection management
/// - `dto`: Data transfer objects for the web API
/// - `errors`: Engine and API error types
/// - `forms`: Submission cleaning and the review form group
/// - `handlers`: Web API request handlers
/// - `models`: Data structures representing reviews, ratings, and media
/// - `permissions`: Ownership and visibility rules
/// - `principal`: The acting principal and its extractor
/// - `quota`: Per-user creation limits
/// - `registry`: Engine configurations and kind resolution
/// - `repo`: Repository layer for database operations
/// - `schema`: Database schema definitions
///
/// ### Web API
///
/// The library exposes a RESTful API using Axum with the following endpoints:
///
/// - `POST /reviews`: Create a review from a form submission
/// - `GET /reviews`: List the reviews visible to the caller
/// - `GET /reviews/{id}`: Get a specific review by ID
/// - `PUT /reviews/{id}`: Update a review from a form submission
/// - `DELETE /reviews/{id}`: Delete a review and its rating
/// - `GET /media`: List the media items visible to the caller
/// - `GET /media/{kind_id}/autocomplete`: Suggest media items for a term
/// - `DELETE /media/{kind_id}/{id}`: Delete a media item
/// - `GET /kinds/strategies`: List the enabled rating strategy kinds
/// - `GET /kinds/media`: List the enabled media kinds
/// - `GET /genres`: List the shared genre reference set
/// - `GET /countries`: List the shared country reference set
/// - `GET /settings`: Get the caller's settings and quota usage

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Data transfer objects module
pub mod dto;

/// Error types module
pub mod errors;

/// Form cleaning and validation module
pub mod forms;

/// Web API handlers module
pub mod handlers;

/// Data models module
pub mod models;

/// Ownership and visibility rules module
pub mod permissions;

/// Acting principal module
pub mod principal;

/// Per-user creation limits module
pub mod quota;

/// Engine configuration registry module
pub mod registry;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Shared test helpers and proptest strategies
#[cfg(test)]
pub mod test_utils;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use handlers::*;

/// Shared state handed to every handler
///
/// Both parts are behind `Arc`s, so cloning the state per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool
    pub pool: Arc<db::DbPool>,

    /// The resolved engine registry
    pub registry: Arc<registry::Registry>,
}

impl AppState {
    /// Creates the application state from its shared parts
    pub fn new(pool: Arc<db::DbPool>, registry: Arc<registry::Registry>) -> Self {
        Self { pool, registry }
    }
}

/// Creates the application router with all routes
///
/// This function sets up the Axum router with all the API endpoints.
///
/// ### Arguments
///
/// * `state` - The application state to be shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes and the shared state
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Route for creating and listing reviews
        .route("/reviews", post(create_review_handler).get(list_reviews_handler))
        // Route for getting, updating, and deleting a specific review by ID
        .route(
            "/reviews/{id}",
            get(get_review_handler)
                .put(update_review_handler)
                .delete(delete_review_handler),
        )
        // Route for listing media items
        .route("/media", get(list_media_handler))
        // Route for media autocomplete suggestions
        .route("/media/{kind_id}/autocomplete", get(autocomplete_media_handler))
        // Route for deleting a specific media item
        .route("/media/{kind_id}/{id}", delete(delete_media_handler))
        // Route for listing the enabled rating strategy kinds
        .route("/kinds/strategies", get(list_strategy_kinds_handler))
        // Route for listing the enabled media kinds
        .route("/kinds/media", get(list_media_kinds_handler))
        // Route for listing the shared genre reference set
        .route("/genres", get(list_genres_handler))
        // Route for listing the shared country reference set
        .route("/countries", get(list_countries_handler))
        // Route for the caller's settings and quota usage
        .route("/settings", get(get_settings_handler))
        // Allow browser clients from any origin
        .layer(CorsLayer::permissive())
        // Add the shared state to the application
        .with_state(state)
}

/// Runs the embedded migrations
///
/// This function applies all database migrations to set up the schema.
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Panics
///
/// This function will panic if the migrations fail to run
pub fn run_migrations(conn: &mut diesel::SqliteConnection) {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    // Define the embedded migrations
    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    // Run all pending migrations
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_engine;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use diesel::Connection;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Tests that migrations run cleanly on a fresh connection
    #[test]
    fn test_run_migrations() {
        let mut conn = diesel::SqliteConnection::establish(":memory:")
            .expect("Failed to create in-memory database");

        run_migrations(&mut conn);
    }

    /// Tests that the router serves the kind listings
    #[tokio::test]
    async fn test_create_app_serves_kind_listings() {
        let (pool, registry) = setup_engine();
        let app = create_app(AppState::new(pool, registry));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/kinds/media")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let kinds: Value = serde_json::from_slice(&body).unwrap();
        let kinds = kinds.as_array().unwrap();

        // The default configuration enables both media kinds
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds[0]["model"], "book");
        assert_eq!(kinds[1]["model"], "film");
    }

    /// Tests that anonymous callers get the default configuration's empty
    /// demo listing rather than other users' reviews
    #[tokio::test]
    async fn test_create_app_anonymous_review_listing_is_empty() {
        let (pool, registry) = setup_engine();
        let app = create_app(AppState::new(pool, registry));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/reviews")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let reviews: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(reviews.as_array().unwrap().len(), 0);
    }
}
