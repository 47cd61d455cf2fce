use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;
use tracing::{instrument, debug, info, warn};

use crate::dto::{MediaSearchQueryDto, MediaSummaryDto};
use crate::errors::ApiError;
use crate::permissions::{self, Action};
use crate::principal::Principal;
use crate::registry::{MediaSummary, Registry};
use crate::repo;
use crate::AppState;

/// Maps media summaries to their API form, resolving each kind to its id
fn present_summaries(
    registry: &Registry,
    summaries: Vec<MediaSummary>,
) -> Result<Vec<MediaSummaryDto>, ApiError> {
    let mut media = Vec::with_capacity(summaries.len());
    for summary in summaries {
        media.push(MediaSummaryDto {
            kind: registry.media_kind_id(summary.kind)?,
            id: summary.id,
            title: summary.title,
            label: summary.label,
        });
    }
    Ok(media)
}

/// Handler for listing the media items visible to the caller
///
/// This function handles GET requests to `/media`. Anonymous callers get
/// the engine configuration's demo set; authenticated callers get every
/// validated item plus their own.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `principal` - The acting principal resolved from the request headers
///
/// ### Returns
///
/// A list of media summaries as JSON, ordered by title
#[instrument(skip(state, principal), fields(user = principal.user_id.as_deref().unwrap_or("anonymous")))]
pub async fn list_media_handler(
    // Extract the shared application state
    State(state): State<AppState>,
    // Resolve the acting principal from the request headers
    principal: Principal,
) -> Result<Json<Vec<MediaSummaryDto>>, ApiError> {
    debug!("Listing media");

    let summaries = repo::list_media(&state.pool, &state.registry, &principal)
        .map_err(ApiError::Database)?;
    let media = present_summaries(&state.registry, summaries)?;

    info!("Retrieved {} media items", media.len());
    Ok(Json(media))
}

/// Handler for media autocomplete suggestions
///
/// This function handles GET requests to
/// `/media/{kind_id}/autocomplete?q=term`. A term that parses as a UUID is
/// looked up as an exact id; anything else matches titles as an escaped
/// substring. At most twenty suggestions are returned, ordered by title.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `principal` - The acting principal resolved from the request headers
/// * `kind_id` - The media kind id to search within
/// * `query` - Query parameters carrying the optional search term
///
/// ### Returns
///
/// A list of media summaries matching the term as JSON
#[instrument(skip(state, principal, query), fields(kind_id = %kind_id))]
pub async fn autocomplete_media_handler(
    // Extract the shared application state
    State(state): State<AppState>,
    // Resolve the acting principal from the request headers
    principal: Principal,
    // Extract the media kind id from the URL path
    Path(kind_id): Path<i32>,
    // Extract and parse query parameters
    Query(query): Query<MediaSearchQueryDto>,
) -> Result<Json<Vec<MediaSummaryDto>>, ApiError> {
    debug!("Autocompleting media with term: {:?}", query.q);

    let kind = state.registry.media_kind_from_id(kind_id)?;
    let summaries = repo::search_media(&state.pool, kind, &principal, query.q.as_deref())
        .map_err(ApiError::Database)?;
    let media = present_summaries(&state.registry, summaries)?;

    info!("Retrieved {} media suggestions", media.len());
    Ok(Json(media))
}

/// Handler for deleting a media item
///
/// This function handles DELETE requests to `/media/{kind_id}/{media_id}`.
/// The caller's own reviews are detached from the item first; the deletion
/// is refused while reviews belonging to anyone else still reference it.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `principal` - The acting principal resolved from the request headers
/// * `kind_id` - The media kind id of the item
/// * `media_id` - The ID of the media item to delete
///
/// ### Returns
///
/// An empty JSON body on success
#[instrument(skip(state, principal), fields(kind_id = %kind_id, media_id = %media_id))]
pub async fn delete_media_handler(
    // Extract the shared application state
    State(state): State<AppState>,
    // Resolve the acting principal from the request headers
    principal: Principal,
    // Extract the media kind id and item ID from the URL path
    Path((kind_id, media_id)): Path<(i32, String)>,
) -> Result<Json<()>, ApiError> {
    info!("Deleting media item");

    let kind = state.registry.media_kind_from_id(kind_id)?;
    let record = repo::get_media_record(&state.pool, kind, &media_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    if !permissions::may(&principal, &record, Action::View) {
        debug!("Media item is not visible to the caller");
        return Err(ApiError::NotFound);
    }

    if !permissions::may(&principal, &record, Action::Delete) {
        warn!("Caller may not delete this media item");
        if principal.is_anonymous() {
            return Err(ApiError::Unauthorized(
                "Authentication required.".to_string(),
            ));
        }
        return Err(ApiError::Forbidden(
            "You do not own this media item.".to_string(),
        ));
    }

    repo::delete_media(&state.pool, &state.registry, &record)?;
    info!("Successfully deleted media item with id: {}", media_id);

    Ok(Json(()))
}
