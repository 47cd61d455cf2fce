use anyhow::Result;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::SqliteConnection;
use tracing::{debug, instrument};

use crate::db::DbPool;
use crate::errors::EngineError;
use crate::models::Review;
use crate::principal::Principal;
use crate::registry::Registry;
use crate::schema::reviews;

use super::rating_repo;

/// Listing order for reviews: most recently completed first, undated
/// reviews at the end, ties broken by creation time
pub const VISIBLE_REVIEW_ORDER: &str = "completed_at_year DESC NULLS LAST, \
    completed_at_month DESC NULLS LAST, \
    completed_at_day DESC NULLS LAST, \
    created_at DESC";

/// Inserts a review row
pub fn insert_review(conn: &mut SqliteConnection, review: &Review) -> QueryResult<()> {
    diesel::insert_into(reviews::table)
        .values(review)
        .execute(conn)?;
    Ok(())
}

/// Writes back every column of an existing review row
pub fn update_review(conn: &mut SqliteConnection, review: &Review) -> QueryResult<()> {
    diesel::update(reviews::table.find(review.get_id()))
        .set(review)
        .execute(conn)?;
    Ok(())
}

/// Looks up a review by id
pub fn find_review(conn: &mut SqliteConnection, review_id: &str) -> QueryResult<Option<Review>> {
    reviews::table
        .find(review_id)
        .select(Review::as_select())
        .first(conn)
        .optional()
}

/// Counts the reviews a user owns, for quota checks
pub fn count_reviews_by_owner(conn: &mut SqliteConnection, user_id: &str) -> QueryResult<i64> {
    reviews::table
        .filter(reviews::owner_id.eq(user_id))
        .count()
        .get_result(conn)
}

/// Loads the reviews a principal may see, in listing order
///
/// Admins see everything. Users see the validated set plus their own
/// rows, validated or not. Anonymous callers see the validated set; the
/// listing endpoint substitutes the engine configuration's demo set for
/// them instead of calling this.
pub fn list_visible_reviews(
    conn: &mut SqliteConnection,
    principal: &Principal,
) -> QueryResult<Vec<Review>> {
    let order = sql::<Bool>(VISIBLE_REVIEW_ORDER);
    match (&principal.user_id, principal.admin) {
        (_, true) => reviews::table
            .order(order)
            .select(Review::as_select())
            .load(conn),
        (Some(user_id), false) => reviews::table
            .filter(reviews::validated.eq(true).or(reviews::owner_id.eq(user_id)))
            .order(order)
            .select(Review::as_select())
            .load(conn),
        (None, false) => reviews::table
            .filter(reviews::validated.eq(true))
            .order(order)
            .select(Review::as_select())
            .load(conn),
    }
}

/// Loads the reviews pointing at one media item
pub fn reviews_referencing_media(
    conn: &mut SqliteConnection,
    media_kind_id: i32,
    media_id: &str,
) -> QueryResult<Vec<Review>> {
    reviews::table
        .filter(reviews::media_kind.eq(media_kind_id))
        .filter(reviews::media_ref.eq(media_id))
        .select(Review::as_select())
        .load(conn)
}

/// Clears the media reference on every review pointing at one media item
pub fn detach_media_refs(
    conn: &mut SqliteConnection,
    media_kind_id: i32,
    media_id: &str,
) -> QueryResult<usize> {
    diesel::update(
        reviews::table
            .filter(reviews::media_kind.eq(media_kind_id))
            .filter(reviews::media_ref.eq(media_id)),
    )
    .set((
        reviews::media_kind.eq(None::<i32>),
        reviews::media_ref.eq(None::<String>),
    ))
    .execute(conn)
}

/// Deletes a review and the rating row it references, in one transaction
///
/// The rating row has no life of its own once the review stops pointing
/// at it, so the two always go together.
pub fn delete_review_cascade(
    conn: &mut SqliteConnection,
    registry: &Registry,
    review: &Review,
) -> Result<(), EngineError> {
    conn.transaction::<_, EngineError, _>(|conn| {
        if let (Some(kind_id), Some(rating_ref)) =
            (review.get_strategy_kind(), review.get_strategy_ref())
        {
            let kind = registry.strategy_kind_from_id(kind_id)?;
            rating_repo::delete_rating(conn, kind, &rating_ref)?;
        }
        diesel::delete(reviews::table.find(review.get_id())).execute(conn)?;
        Ok(())
    })
}

/// Retrieves a review from the database by its ID
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `review_id` - The ID of the review to retrieve
///
/// ### Returns
///
/// A Result containing an Option with the Review if found, or None if not
/// found
#[instrument(skip(pool), fields(review_id = %review_id))]
pub fn get_review(pool: &DbPool, review_id: &str) -> Result<Option<Review>> {
    debug!("Retrieving review by id");
    let conn = &mut pool.get()?;
    Ok(find_review(conn, review_id)?)
}

/// Retrieves the reviews a principal may see
///
/// Anonymous callers get the engine configuration's demo set; everyone
/// else gets the validated set plus their own reviews.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `registry` - The resolved engine registry
/// * `principal` - The caller the listing is for
#[instrument(skip(pool, registry, principal), fields(config = %registry.config_name()))]
pub fn list_reviews(
    pool: &DbPool,
    registry: &Registry,
    principal: &Principal,
) -> Result<Vec<Review>> {
    let conn = &mut pool.get()?;
    if principal.is_anonymous() {
        debug!("Listing demo reviews for anonymous caller");
        return Ok(registry.demo_reviews(conn)?);
    }
    debug!("Listing visible reviews");
    Ok(list_visible_reviews(conn, principal)?)
}

/// Deletes a review and its rating row
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `registry` - The resolved engine registry
/// * `review` - The review to delete
#[instrument(skip(pool, registry, review), fields(review_id = %review.get_id()))]
pub fn delete_review(
    pool: &DbPool,
    registry: &Registry,
    review: &Review,
) -> Result<(), EngineError> {
    debug!("Deleting review");
    let conn = &mut pool.get()?;
    delete_review_cascade(conn, registry, review)
}
