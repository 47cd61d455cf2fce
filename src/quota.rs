use diesel::sqlite::SqliteConnection;
use tracing::debug;

use crate::errors::EngineError;
use crate::repo;

/// Message attached to a refused review creation
pub const REVIEW_QUOTA_MESSAGE: &str = "You have reached your limit of reviews.";

/// Message attached to a refused media item creation
pub const MEDIA_QUOTA_MESSAGE: &str = "You have reached your limit of media items.";

/// Decides whether one more entity may be created under the given limit
///
/// A `None` limit means unlimited. The comparison is against the count
/// before the new entity exists, so a user at exactly their limit is still
/// allowed one more creation.
pub fn can_create(limit: Option<i32>, current_count: i64) -> bool {
    match limit {
        None => true,
        Some(limit) => current_count <= i64::from(limit),
    }
}

/// Renders how many more entities the user may create
///
/// Returns `"Unlimited"` when no limit is set. The value can go negative
/// when a limit was lowered after the fact; it is reported as-is.
pub fn remaining(limit: Option<i32>, used: i64) -> String {
    match limit {
        None => "Unlimited".to_string(),
        Some(limit) => (i64::from(limit) - used).to_string(),
    }
}

/// Refuses review creation for users over their review quota
///
/// ### Arguments
///
/// * `conn` - A connection, typically inside the save transaction
/// * `user_id` - The ID of the user about to create a review
pub fn check_review_quota(conn: &mut SqliteConnection, user_id: &str) -> Result<(), EngineError> {
    let settings = repo::get_or_create_settings(conn, user_id)?;
    let count = repo::count_reviews_by_owner(conn, user_id)?;

    if can_create(settings.get_review_limit(), count) {
        Ok(())
    } else {
        debug!("Review quota reached for user {}", user_id);
        Err(EngineError::QuotaExceeded(REVIEW_QUOTA_MESSAGE.to_string()))
    }
}

/// Refuses media item creation for users over their media quota
pub fn check_media_quota(conn: &mut SqliteConnection, user_id: &str) -> Result<(), EngineError> {
    let settings = repo::get_or_create_settings(conn, user_id)?;
    let count = repo::count_media_by_owner(conn, user_id)?;

    if can_create(settings.get_media_item_limit(), count) {
        Ok(())
    } else {
        debug!("Media quota reached for user {}", user_id);
        Err(EngineError::QuotaExceeded(MEDIA_QUOTA_MESSAGE.to_string()))
    }
}
