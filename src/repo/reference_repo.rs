use anyhow::Result;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::db::DbPool;
use crate::models::{Country, Genre};
use crate::schema::{countries, genres};

/// Loads every genre, ordered by name
pub fn list_genres(conn: &mut SqliteConnection) -> QueryResult<Vec<Genre>> {
    genres::table
        .order(genres::name.asc())
        .select(Genre::as_select())
        .load(conn)
}

/// Loads every country, ordered by name
pub fn list_countries(conn: &mut SqliteConnection) -> QueryResult<Vec<Country>> {
    countries::table
        .order(countries::name.asc())
        .select(Country::as_select())
        .load(conn)
}

/// Checks which of the requested genre ids do not exist
pub fn missing_genre_ids(
    conn: &mut SqliteConnection,
    requested: &[String],
) -> QueryResult<Vec<String>> {
    if requested.is_empty() {
        return Ok(Vec::new());
    }
    let found: HashSet<String> = genres::table
        .filter(genres::id.eq_any(requested))
        .select(genres::id)
        .load::<String>(conn)?
        .into_iter()
        .collect();

    let mut missing = Vec::new();
    for id in requested {
        if !found.contains(id) && !missing.contains(id) {
            missing.push(id.clone());
        }
    }
    Ok(missing)
}

/// Checks which of the requested country ids do not exist
pub fn missing_country_ids(
    conn: &mut SqliteConnection,
    requested: &[String],
) -> QueryResult<Vec<String>> {
    if requested.is_empty() {
        return Ok(Vec::new());
    }
    let found: HashSet<String> = countries::table
        .filter(countries::id.eq_any(requested))
        .select(countries::id)
        .load::<String>(conn)?
        .into_iter()
        .collect();

    let mut missing = Vec::new();
    for id in requested {
        if !found.contains(id) && !missing.contains(id) {
            missing.push(id.clone());
        }
    }
    Ok(missing)
}

/// Retrieves every genre
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
#[instrument(skip(pool))]
pub fn get_genres(pool: &DbPool) -> Result<Vec<Genre>> {
    debug!("Retrieving all genres");
    let conn = &mut pool.get()?;
    Ok(list_genres(conn)?)
}

/// Retrieves every country
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
#[instrument(skip(pool))]
pub fn get_countries(pool: &DbPool) -> Result<Vec<Country>> {
    debug!("Retrieving all countries");
    let conn = &mut pool.get()?;
    Ok(list_countries(conn)?)
}
