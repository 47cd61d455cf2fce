use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user settings, including creation quotas
///
/// A `None` limit means the user is not limited for that entity kind.
/// Settings rows are created on first touch, so absence of a row is
/// equivalent to the default of no limits.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::user_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct UserSettings {
    /// The ID of the user these settings belong to
    user_id: String,

    /// Maximum number of reviews this user may create, if limited
    review_limit: Option<i32>,

    /// Maximum number of media items this user may create, if limited
    media_item_limit: Option<i32>,

    /// When these settings were created
    created_at: NaiveDateTime,

    /// When these settings were last updated
    updated_at: NaiveDateTime,
}

impl UserSettings {
    /// Creates default settings for a user, with no limits
    pub fn new(user_id: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            user_id,
            review_limit: None,
            media_item_limit: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates settings with all fields specified
    pub fn new_with_fields(
        user_id: String,
        review_limit: Option<i32>,
        media_item_limit: Option<i32>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            review_limit,
            media_item_limit,
            created_at: created_at.naive_utc(),
            updated_at: updated_at.naive_utc(),
        }
    }

    /// Gets the ID of the user these settings belong to
    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    /// Gets the review creation limit, if any
    pub fn get_review_limit(&self) -> Option<i32> {
        self.review_limit
    }

    /// Sets the review creation limit
    pub fn set_review_limit(&mut self, review_limit: Option<i32>) {
        self.review_limit = review_limit;
    }

    /// Gets the media item creation limit, if any
    pub fn get_media_item_limit(&self) -> Option<i32> {
        self.media_item_limit
    }

    /// Sets the media item creation limit
    pub fn set_media_item_limit(&mut self, media_item_limit: Option<i32>) {
        self.media_item_limit = media_item_limit;
    }

    /// Gets the settings' creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the settings' last update timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }

    /// Refreshes the last update timestamp to now
    pub fn refresh_updated_at(&mut self) {
        self.updated_at = Utc::now().naive_utc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_settings_new_has_no_limits() {
        let settings = UserSettings::new("user-1".to_string());

        assert_eq!(settings.get_user_id(), "user-1");
        assert_eq!(settings.get_review_limit(), None);
        assert_eq!(settings.get_media_item_limit(), None);
    }

    #[test]
    fn test_user_settings_set_limits() {
        let mut settings = UserSettings::new("user-1".to_string());

        settings.set_review_limit(Some(10));
        settings.set_media_item_limit(Some(5));

        assert_eq!(settings.get_review_limit(), Some(10));
        assert_eq!(settings.get_media_item_limit(), Some(5));
    }
}
