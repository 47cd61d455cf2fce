use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Data transfer object for the review section of a submission
///
/// Fields arrive loosely typed and are coerced by the form group, so each
/// one is kept as raw JSON here.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ReviewFieldsDto {
    /// The day of the month the media was finished, if known
    pub completed_at_day: Option<Value>,

    /// The month the media was finished, if known
    pub completed_at_month: Option<Value>,

    /// The year the media was finished, if known
    pub completed_at_year: Option<Value>,

    /// The review text
    pub text: Option<Value>,

    /// The kind id of the rating strategy
    pub strategy_kind: Option<Value>,

    /// The kind id of the reviewed media, if any
    pub media_kind: Option<Value>,

    /// The id of an existing media item to review
    pub media_ref: Option<Value>,
}

/// Data transfer object for creating or updating a review
///
/// The strategy and media sections are keyed by kind id, mirroring the
/// one-form-per-kind layout the engine presents to clients.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ReviewSubmissionDto {
    /// The review fields
    pub review: ReviewFieldsDto,

    /// Whether to create new media or select an existing item
    pub create_new_media: Option<Value>,

    /// Per-kind rating payloads, keyed by strategy kind id
    pub strategy: BTreeMap<i32, Value>,

    /// Per-kind media payloads, keyed by media kind id
    pub media: BTreeMap<i32, Value>,
}

/// Data transfer object for a media item in listings and lookups
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MediaSummaryDto {
    /// The media kind id
    pub kind: i32,

    /// The media item ID
    pub id: String,

    /// The bare title
    pub title: String,

    /// The title annotated for display, e.g. "Title (Author, Year)"
    pub label: String,
}

/// Data transfer object for returning a review with its rating and media
/// context resolved
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReviewDto {
    /// The review ID
    pub id: String,

    /// The owning user, if any
    pub owner_id: Option<String>,

    /// The day component of the approximate completion date
    pub completed_at_day: Option<i32>,

    /// The month component of the approximate completion date
    pub completed_at_month: Option<i32>,

    /// The year component of the approximate completion date
    pub completed_at_year: Option<i32>,

    /// The approximate completion date rendered for display
    pub completed_at: String,

    /// The review text
    pub text: String,

    /// Whether the review is visible to everyone
    pub validated: bool,

    /// The kind id of the rating strategy
    pub strategy_kind: Option<i32>,

    /// The id of the rating row
    pub strategy_ref: Option<String>,

    /// The rating rendered by its strategy kind
    pub rating: Option<String>,

    /// The kind id of the reviewed media
    pub media_kind: Option<i32>,

    /// The id of the media row
    pub media_ref: Option<String>,

    /// The reviewed media item, when it still exists
    pub media: Option<MediaSummaryDto>,

    /// When the review was created
    pub created_at: DateTime<Utc>,

    /// When the review was last updated
    pub updated_at: DateTime<Utc>,
}

/// Data transfer object for a registered kind
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KindDto {
    /// The stable kind id assigned by the registry
    pub kind_id: i32,

    /// The model name the id is pinned to
    pub model: String,

    /// The human-readable kind name
    pub name: String,
}

/// Data transfer object for autocomplete queries
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct MediaSearchQueryDto {
    /// The search term, either a media id or a title fragment
    pub q: Option<String>,
}

/// Data transfer object for a user's quota settings and usage
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SettingsDto {
    /// The user the settings belong to
    pub user_id: String,

    /// The review quota, if one is set
    pub review_limit: Option<i32>,

    /// The media item quota, if one is set
    pub media_item_limit: Option<i32>,

    /// How many reviews the user currently owns
    pub reviews_used: i64,

    /// Reviews left under the quota, or "Unlimited"
    pub reviews_remaining: String,

    /// How many media items the user currently owns
    pub media_items_used: i64,

    /// Media items left under the quota, or "Unlimited"
    pub media_items_remaining: String,

    /// Whether the user may create another review
    pub can_create_review: bool,

    /// Whether the user may create another media item
    pub can_create_media_item: bool,
}
