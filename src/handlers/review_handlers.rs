use axum::{
    extract::{Path, State},
    Json,
};
use diesel::SqliteConnection;
use tracing::{instrument, debug, info, warn};

use crate::dto::{MediaSummaryDto, ReviewDto, ReviewSubmissionDto};
use crate::errors::ApiError;
use crate::forms::{partial_date, ReviewFormGroup};
use crate::models::Review;
use crate::permissions::{self, Action};
use crate::principal::Principal;
use crate::registry::Registry;
use crate::repo;
use crate::AppState;

/// Builds the enriched API view of a review
///
/// The rating is rendered through its strategy kind and the media reference
/// is resolved to a summary. Both lookups are tolerant: a kind id that is no
/// longer enabled, or a row that has since been deleted, renders as `null`
/// rather than failing the whole listing.
fn present_review(
    conn: &mut SqliteConnection,
    registry: &Registry,
    review: &Review,
) -> Result<ReviewDto, ApiError> {
    let rating = match (review.get_strategy_kind(), review.get_strategy_ref()) {
        (Some(kind_id), Some(rating_ref)) => match registry.strategy_kind_from_id(kind_id) {
            Ok(kind) => repo::render_rating(conn, kind, &rating_ref)
                .map_err(anyhow::Error::from)?,
            Err(_) => None,
        },
        _ => None,
    };

    let media = match (review.get_media_kind(), review.get_media_ref()) {
        (Some(kind_id), Some(media_ref)) => match registry.media_kind_from_id(kind_id) {
            Ok(kind) => repo::find_media(conn, kind, &media_ref)
                .map_err(anyhow::Error::from)?
                .map(|record| MediaSummaryDto {
                    kind: kind_id,
                    id: record.id(),
                    title: record.title(),
                    label: record.label(),
                }),
            Err(_) => None,
        },
        _ => None,
    };

    Ok(ReviewDto {
        id: review.get_id(),
        owner_id: review.get_owner_id(),
        completed_at_day: review.get_completed_at_day(),
        completed_at_month: review.get_completed_at_month(),
        completed_at_year: review.get_completed_at_year(),
        completed_at: partial_date::format_completed_at(
            review.get_completed_at_day(),
            review.get_completed_at_month(),
            review.get_completed_at_year(),
        ),
        text: review.get_text(),
        validated: review.get_validated(),
        strategy_kind: review.get_strategy_kind(),
        strategy_ref: review.get_strategy_ref(),
        rating,
        media_kind: review.get_media_kind(),
        media_ref: review.get_media_ref(),
        media,
        created_at: review.get_created_at(),
        updated_at: review.get_updated_at(),
    })
}

/// Handler for creating a review
///
/// This function handles POST requests to `/reviews`. The submission is
/// bound into a review form group, validated as a whole, and saved in a
/// single transaction.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `principal` - The acting principal resolved from the request headers
/// * `payload` - The request payload containing the review fields and the
///   per-kind strategy and media sections
///
/// ### Returns
///
/// The newly created review, enriched for display, as JSON
#[instrument(skip(state, principal, payload), fields(user = principal.user_id.as_deref().unwrap_or("anonymous")))]
pub async fn create_review_handler(
    // Extract the shared application state
    State(state): State<AppState>,
    // Resolve the acting principal from the request headers
    principal: Principal,
    // Extract and deserialize the JSON request body
    Json(payload): Json<ReviewSubmissionDto>,
) -> Result<Json<ReviewDto>, ApiError> {
    info!("Creating new review");

    if !permissions::may_add(&principal) {
        warn!("Anonymous caller may not create reviews");
        return Err(ApiError::Unauthorized(
            "Authentication required.".to_string(),
        ));
    }

    let conn = &mut state.pool.get().map_err(anyhow::Error::from)?;

    let mut group = ReviewFormGroup::bind(state.registry.clone(), payload, None, principal);
    if !group.is_valid(conn)? {
        debug!("Review submission failed validation");
        return Err(ApiError::Validation(group.errors()));
    }

    let review = group.save(conn)?;
    info!("Successfully created review with id: {}", review.get_id());

    Ok(Json(present_review(conn, &state.registry, &review)?))
}

/// Handler for listing the reviews visible to the caller
///
/// This function handles GET requests to `/reviews`. Anonymous callers get
/// the engine configuration's demo set; authenticated callers get every
/// validated review plus their own.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `principal` - The acting principal resolved from the request headers
///
/// ### Returns
///
/// A list of enriched reviews as JSON, newest completion first
#[instrument(skip(state, principal), fields(user = principal.user_id.as_deref().unwrap_or("anonymous")))]
pub async fn list_reviews_handler(
    // Extract the shared application state
    State(state): State<AppState>,
    // Resolve the acting principal from the request headers
    principal: Principal,
) -> Result<Json<Vec<ReviewDto>>, ApiError> {
    debug!("Listing reviews");

    let reviews = repo::list_reviews(&state.pool, &state.registry, &principal)
        .map_err(ApiError::Database)?;

    let conn = &mut state.pool.get().map_err(anyhow::Error::from)?;
    let mut enriched = Vec::with_capacity(reviews.len());
    for review in &reviews {
        enriched.push(present_review(conn, &state.registry, review)?);
    }

    info!("Retrieved {} reviews", enriched.len());
    Ok(Json(enriched))
}

/// Handler for getting a single review by ID
///
/// This function handles GET requests to `/reviews/{review_id}`. Reviews the
/// caller may not view are reported as not found rather than as forbidden.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `principal` - The acting principal resolved from the request headers
/// * `review_id` - The ID of the review to retrieve
///
/// ### Returns
///
/// The enriched review as JSON
#[instrument(skip(state, principal), fields(review_id = %review_id))]
pub async fn get_review_handler(
    // Extract the shared application state
    State(state): State<AppState>,
    // Resolve the acting principal from the request headers
    principal: Principal,
    // Extract the review ID from the URL path
    Path(review_id): Path<String>,
) -> Result<Json<ReviewDto>, ApiError> {
    debug!("Retrieving review");

    let review = repo::get_review(&state.pool, &review_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    if !permissions::may(&principal, &review, Action::View) {
        debug!("Review is not visible to the caller");
        return Err(ApiError::NotFound);
    }

    let conn = &mut state.pool.get().map_err(anyhow::Error::from)?;
    Ok(Json(present_review(conn, &state.registry, &review)?))
}

/// Handler for updating a review
///
/// This function handles PUT requests to `/reviews/{review_id}`. The
/// submission is rebound over the stored review, so a changed strategy kind
/// replaces the old rating row while the review keeps its identity and
/// creation time.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `principal` - The acting principal resolved from the request headers
/// * `review_id` - The ID of the review to update
/// * `payload` - The request payload containing the review fields and the
///   per-kind strategy and media sections
///
/// ### Returns
///
/// The updated review, enriched for display, as JSON
#[instrument(skip(state, principal, payload), fields(review_id = %review_id))]
pub async fn update_review_handler(
    // Extract the shared application state
    State(state): State<AppState>,
    // Resolve the acting principal from the request headers
    principal: Principal,
    // Extract the review ID from the URL path
    Path(review_id): Path<String>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<ReviewSubmissionDto>,
) -> Result<Json<ReviewDto>, ApiError> {
    info!("Updating review");

    let review = repo::get_review(&state.pool, &review_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    if !permissions::may(&principal, &review, Action::View) {
        debug!("Review is not visible to the caller");
        return Err(ApiError::NotFound);
    }

    if !permissions::may(&principal, &review, Action::Change) {
        warn!("Caller may not change this review");
        if principal.is_anonymous() {
            return Err(ApiError::Unauthorized(
                "Authentication required.".to_string(),
            ));
        }
        return Err(ApiError::Forbidden(
            "You do not own this review.".to_string(),
        ));
    }

    let conn = &mut state.pool.get().map_err(anyhow::Error::from)?;

    let mut group =
        ReviewFormGroup::bind(state.registry.clone(), payload, Some(review), principal);
    if !group.is_valid(conn)? {
        debug!("Review submission failed validation");
        return Err(ApiError::Validation(group.errors()));
    }

    let review = group.save(conn)?;
    info!("Successfully updated review with id: {}", review.get_id());

    Ok(Json(present_review(conn, &state.registry, &review)?))
}

/// Handler for deleting a review
///
/// This function handles DELETE requests to `/reviews/{review_id}`. The
/// review's rating row is deleted along with it.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `principal` - The acting principal resolved from the request headers
/// * `review_id` - The ID of the review to delete
///
/// ### Returns
///
/// An empty JSON body on success
#[instrument(skip(state, principal), fields(review_id = %review_id))]
pub async fn delete_review_handler(
    // Extract the shared application state
    State(state): State<AppState>,
    // Resolve the acting principal from the request headers
    principal: Principal,
    // Extract the review ID from the URL path
    Path(review_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    info!("Deleting review");

    let review = repo::get_review(&state.pool, &review_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    if !permissions::may(&principal, &review, Action::View) {
        debug!("Review is not visible to the caller");
        return Err(ApiError::NotFound);
    }

    if !permissions::may(&principal, &review, Action::Delete) {
        warn!("Caller may not delete this review");
        if principal.is_anonymous() {
            return Err(ApiError::Unauthorized(
                "Authentication required.".to_string(),
            ));
        }
        return Err(ApiError::Forbidden(
            "You do not own this review.".to_string(),
        ));
    }

    repo::delete_review(&state.pool, &state.registry, &review)?;
    info!("Successfully deleted review with id: {}", review_id);

    Ok(Json(()))
}
