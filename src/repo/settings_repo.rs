use anyhow::Result;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::{debug, instrument};

use crate::db::DbPool;
use crate::models::UserSettings;
use crate::schema::user_settings;

use super::{count_media_by_owner, count_reviews_by_owner};

/// Loads a user's settings row, creating the unlimited default on first
/// contact
pub fn get_or_create_settings(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> QueryResult<UserSettings> {
    let existing = user_settings::table
        .find(user_id)
        .select(UserSettings::as_select())
        .first(conn)
        .optional()?;

    match existing {
        Some(settings) => Ok(settings),
        None => {
            let settings = UserSettings::new(user_id.to_string());
            diesel::insert_into(user_settings::table)
                .values(&settings)
                .execute(conn)?;
            Ok(settings)
        }
    }
}

/// Writes back a settings row
pub fn update_settings(conn: &mut SqliteConnection, settings: &UserSettings) -> QueryResult<()> {
    diesel::update(user_settings::table.find(settings.get_user_id()))
        .set(settings)
        .execute(conn)?;
    Ok(())
}

/// Retrieves a user's settings together with their current usage counts
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The user the settings belong to
///
/// ### Returns
///
/// A Result containing the settings, the number of reviews the user owns,
/// and the number of media items the user owns
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn get_settings_snapshot(pool: &DbPool, user_id: &str) -> Result<(UserSettings, i64, i64)> {
    debug!("Retrieving settings and usage");
    let conn = &mut pool.get()?;
    let settings = get_or_create_settings(conn, user_id)?;
    let reviews_used = count_reviews_by_owner(conn, user_id)?;
    let media_used = count_media_by_owner(conn, user_id)?;
    Ok((settings, reviews_used, media_used))
}
