use crate::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::RunQueryDsl;
use proptest::prelude::*;
use std::sync::Arc;
use tower::ServiceExt;

/// Sets up a test database with migrations applied
///
/// This function:
/// 1. Creates an in-memory SQLite database
/// 2. Enables foreign key constraints
/// 3. Runs all migrations to set up the schema
///
/// ### Returns
///
/// An Arc-wrapped database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<db::DbPool> {
    // Use a unique shared in-memory database for each test.
    // Plain ":memory:" gives each connection its own separate database,
    // so migrations run on one connection wouldn't be visible on others.
    // By using a unique URI with cache=shared, all connections in this pool
    // share the same in-memory database while remaining isolated from other tests.
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url);

    // Get a connection from the pool
    let mut conn = pool.get().expect("Failed to get connection");

    // Enable foreign key constraints for SQLite
    conn.batch_execute("PRAGMA foreign_keys = ON").unwrap();

    // Run all migrations to set up the schema
    run_migrations(&mut conn);

    // Wrap the pool in an Arc for thread-safe sharing
    Arc::new(pool)
}

/// Sets up a test database together with a resolved registry
///
/// Most engine-level tests need both; the registry is resolved from the
/// "default" configuration against the fresh database.
pub fn setup_engine() -> (Arc<db::DbPool>, Arc<registry::Registry>) {
    let pool = setup_test_db();
    let mut conn = pool.get().expect("Failed to get connection");
    let registry = registry::Registry::ready_named(&mut conn, "default")
        .expect("Failed to resolve the default configuration");
    drop(conn);
    (pool, Arc::new(registry))
}

/// Builds a submission payload from a JSON literal
pub fn submission(value: serde_json::Value) -> dto::ReviewSubmissionDto {
    serde_json::from_value(value).expect("Failed to build submission payload")
}

use diesel::sql_types::Text;
use diesel::QueryableByName;

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Tests the setup_test_db function
///
/// This test verifies that:
/// 1. The test database can be created and connected to
/// 2. The database has the expected tables
/// 3. The database can be queried successfully
#[tokio::test]
async fn test_setup_test_db() {
    let pool = setup_test_db();
    assert!(pool.get().is_ok());

    // Check that all migrations were run, i.e. the tables were created
    let mut conn = pool.get().unwrap();
    let table_names: Vec<TableName> =
        diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
            .load(&mut conn)
            .expect("Failed to load table names");

    let expected_tables = vec![
        "kinds",
        "genres",
        "countries",
        "books",
        "films",
        "book_genres",
        "film_genres",
        "film_countries",
        "ebert_ratings",
        "goodreads_ratings",
        "imdb_ratings",
        "letterboxd_ratings",
        "thumb_ratings",
        "tomato_ratings",
        "reviews",
        "user_settings",
        "__diesel_schema_migrations", // Diesel's migration tracking table
    ];

    for table in expected_tables {
        let exists = table_names.iter().any(|t| t.name == table);
        assert!(exists, "Table '{}' not found in database", table);

        // Test a simple query on each table
        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(
            result.is_ok(),
            "Failed to query table '{}': {:?}",
            table,
            result.err()
        );
    }

    drop(conn);

    // test interacting with the app
    let (pool, registry) = setup_engine();
    let app = create_app(AppState::new(pool, registry));

    let request = Request::builder()
        .uri("/kinds/strategies")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Response status is not OK (err: {:?})",
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    );
}

/// Generates an arbitrary DateTime<Utc> within 2020-01-01 to 2030-01-01
pub fn arb_datetime_utc() -> impl Strategy<Value = DateTime<Utc>> {
    (1_577_836_800i64..1_893_456_000i64)
        .prop_map(|ts| DateTime::from_timestamp(ts, 0).unwrap())
}

/// Generates an optional arbitrary DateTime<Utc>
pub fn arb_optional_datetime_utc() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop_oneof![Just(None), arb_datetime_utc().prop_map(Some),]
}

/// Generates arbitrary strings including unicode, whitespace and empties
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(String::from("   ")),
        "[a-zA-Z0-9 ]{1,40}",
        "\\PC{1,20}",
    ]
}

/// Generates an optional messy string
pub fn arb_optional_string() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), arb_messy_string().prop_map(Some),]
}
