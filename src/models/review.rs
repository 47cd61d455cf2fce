use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a review of a media item
///
/// A review may reference one media item and one rating strategy, both
/// through tagged `(kind_id, ref)` pairs resolved by the kind resolver.
/// Either reference may be absent: a review can exist without a media item
/// and without a rating. The approximate completion date is stored as three
/// independent nullable columns so that "1999", "Mar 1999" and
/// "04 Mar 1999" are all representable.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::reviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct Review {
    /// Unique identifier for the review (UUID v4 as string)
    id: String,

    /// The ID of the user who wrote this review, if any
    owner_id: Option<String>,

    /// Day component of the approximate completion date
    completed_at_day: Option<i32>,

    /// Month component of the approximate completion date
    completed_at_month: Option<i32>,

    /// Year component of the approximate completion date
    completed_at_year: Option<i32>,

    /// The text body of the review
    text: String,

    /// Whether this review is part of the validated (publicly visible) set
    validated: bool,

    /// Kind id of the rating strategy this review uses, if any
    strategy_kind: Option<i32>,

    /// ID of the rating row for the strategy kind, if any
    strategy_ref: Option<String>,

    /// Kind id of the media item this review is about, if any
    media_kind: Option<i32>,

    /// ID of the media item row for the media kind, if any
    media_ref: Option<String>,

    /// When this review was created
    created_at: NaiveDateTime,

    /// When this review was last updated
    updated_at: NaiveDateTime,
}

impl Review {
    /// Creates a new empty review owned by the given user
    ///
    /// ### Arguments
    ///
    /// * `owner_id` - The ID of the user writing the review, if any
    ///
    /// ### Returns
    ///
    /// A new `Review` with no media or strategy reference, an empty text
    /// body, and fresh timestamps
    pub fn new(owner_id: Option<String>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            completed_at_day: None,
            completed_at_month: None,
            completed_at_year: None,
            text: String::new(),
            validated: false,
            strategy_kind: None,
            strategy_ref: None,
            media_kind: None,
            media_ref: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new review with all fields specified
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_fields(
        id: String,
        owner_id: Option<String>,
        completed_at_day: Option<i32>,
        completed_at_month: Option<i32>,
        completed_at_year: Option<i32>,
        text: String,
        validated: bool,
        strategy_kind: Option<i32>,
        strategy_ref: Option<String>,
        media_kind: Option<i32>,
        media_ref: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            completed_at_day,
            completed_at_month,
            completed_at_year,
            text,
            validated,
            strategy_kind,
            strategy_ref,
            media_kind,
            media_ref,
            created_at: created_at.naive_utc(),
            updated_at: updated_at.naive_utc(),
        }
    }

    /// Gets the review's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the user who wrote this review, if any
    pub fn get_owner_id(&self) -> Option<String> {
        self.owner_id.clone()
    }

    /// Sets the owner of this review
    pub fn set_owner_id(&mut self, owner_id: Option<String>) {
        self.owner_id = owner_id;
    }

    /// Gets the day component of the approximate completion date
    pub fn get_completed_at_day(&self) -> Option<i32> {
        self.completed_at_day
    }

    /// Gets the month component of the approximate completion date
    pub fn get_completed_at_month(&self) -> Option<i32> {
        self.completed_at_month
    }

    /// Gets the year component of the approximate completion date
    pub fn get_completed_at_year(&self) -> Option<i32> {
        self.completed_at_year
    }

    /// Sets the approximate completion date
    ///
    /// ### Arguments
    ///
    /// * `day` - The day component, if given
    /// * `month` - The month component, if given
    /// * `year` - The year component, if given
    pub fn set_completed_at(&mut self, day: Option<i32>, month: Option<i32>, year: Option<i32>) {
        self.completed_at_day = day;
        self.completed_at_month = month;
        self.completed_at_year = year;
    }

    /// Gets the text body of the review
    pub fn get_text(&self) -> String {
        self.text.clone()
    }

    /// Sets the text body of the review
    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    /// Gets whether this review is part of the validated set
    pub fn get_validated(&self) -> bool {
        self.validated
    }

    /// Sets whether this review is part of the validated set
    pub fn set_validated(&mut self, validated: bool) {
        self.validated = validated;
    }

    /// Gets the kind id of the rating strategy, if any
    pub fn get_strategy_kind(&self) -> Option<i32> {
        self.strategy_kind
    }

    /// Gets the ID of the rating row, if any
    pub fn get_strategy_ref(&self) -> Option<String> {
        self.strategy_ref.clone()
    }

    /// Points this review at a rating row
    pub fn set_strategy(&mut self, kind_id: i32, reference: String) {
        self.strategy_kind = Some(kind_id);
        self.strategy_ref = Some(reference);
    }

    /// Removes the rating reference from this review
    pub fn clear_strategy(&mut self) {
        self.strategy_kind = None;
        self.strategy_ref = None;
    }

    /// Gets the kind id of the media item, if any
    pub fn get_media_kind(&self) -> Option<i32> {
        self.media_kind
    }

    /// Gets the ID of the media item row, if any
    pub fn get_media_ref(&self) -> Option<String> {
        self.media_ref.clone()
    }

    /// Points this review at a media item
    pub fn set_media(&mut self, kind_id: i32, reference: String) {
        self.media_kind = Some(kind_id);
        self.media_ref = Some(reference);
    }

    /// Removes the media reference from this review
    pub fn clear_media(&mut self) {
        self.media_kind = None;
        self.media_ref = None;
    }

    /// Gets the review's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the review's last update timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }

    /// Refreshes the last update timestamp to now
    ///
    /// The creation timestamp is never touched after the first save.
    pub fn refresh_updated_at(&mut self) {
        self.updated_at = Utc::now().naive_utc();
    }
}
