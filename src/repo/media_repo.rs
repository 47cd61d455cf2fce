use anyhow::Result;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::{debug, instrument};

use crate::db::DbPool;
use crate::errors::EngineError;
use crate::models::{Book, Film};
use crate::permissions::Ownable;
use crate::principal::Principal;
use crate::registry::{MediaKind, MediaSummary, Registry};
use crate::schema::{books, films};

use super::review_repo;

/// How many suggestions an autocomplete lookup returns at most
const SUGGESTION_LIMIT: i64 = 20;

/// Reported when deleting media that other people's reviews still point at
pub const DEPENDENT_REVIEWS_MESSAGE: &str =
    "This media item is still referenced by reviews that do not belong to you.";

/// One media item of any kind
///
/// The review table references media through a kind id and a row id, so
/// most call sites do not care which concrete kind they loaded. This sum
/// carries the row together with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaRecord {
    Book(Book),
    Film(Film),
}

impl MediaRecord {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaRecord::Book(_) => MediaKind::Book,
            MediaRecord::Film(_) => MediaKind::Film,
        }
    }

    pub fn id(&self) -> String {
        match self {
            MediaRecord::Book(book) => book.get_id(),
            MediaRecord::Film(film) => film.get_id(),
        }
    }

    pub fn title(&self) -> String {
        match self {
            MediaRecord::Book(book) => book.get_title(),
            MediaRecord::Film(film) => film.get_title(),
        }
    }

    /// The annotated display label for listings
    pub fn label(&self) -> String {
        match self {
            MediaRecord::Book(book) => book.label(),
            MediaRecord::Film(film) => film.label(),
        }
    }

    pub fn owner(&self) -> Option<String> {
        match self {
            MediaRecord::Book(book) => book.get_owner_id(),
            MediaRecord::Film(film) => film.get_owner_id(),
        }
    }

    pub fn validated(&self) -> bool {
        match self {
            MediaRecord::Book(book) => book.get_validated(),
            MediaRecord::Film(film) => film.get_validated(),
        }
    }

    pub fn summary(&self) -> MediaSummary {
        MediaSummary {
            kind: self.kind(),
            id: self.id(),
            title: self.title(),
            label: self.label(),
        }
    }
}

impl Ownable for MediaRecord {
    fn owner(&self) -> Option<String> {
        MediaRecord::owner(self)
    }

    fn validated(&self) -> bool {
        MediaRecord::validated(self)
    }
}

/// Inserts a book row
pub fn insert_book(conn: &mut SqliteConnection, book: &Book) -> QueryResult<()> {
    diesel::insert_into(books::table)
        .values(book)
        .execute(conn)?;
    Ok(())
}

/// Inserts a film row
pub fn insert_film(conn: &mut SqliteConnection, film: &Film) -> QueryResult<()> {
    diesel::insert_into(films::table)
        .values(film)
        .execute(conn)?;
    Ok(())
}

/// Looks up one media item by kind and id
pub fn find_media(
    conn: &mut SqliteConnection,
    kind: MediaKind,
    media_id: &str,
) -> QueryResult<Option<MediaRecord>> {
    match kind {
        MediaKind::Book => Ok(books::table
            .find(media_id)
            .select(Book::as_select())
            .first(conn)
            .optional()?
            .map(MediaRecord::Book)),
        MediaKind::Film => Ok(films::table
            .find(media_id)
            .select(Film::as_select())
            .first(conn)
            .optional()?
            .map(MediaRecord::Film)),
    }
}

/// Counts the media items a user owns across every kind, for quota checks
pub fn count_media_by_owner(conn: &mut SqliteConnection, user_id: &str) -> QueryResult<i64> {
    let book_count: i64 = books::table
        .filter(books::owner_id.eq(user_id))
        .count()
        .get_result(conn)?;
    let film_count: i64 = films::table
        .filter(films::owner_id.eq(user_id))
        .count()
        .get_result(conn)?;
    Ok(book_count + film_count)
}

/// Loads the media summaries a principal may see, books first, each kind
/// ordered by title
pub fn list_visible_media(
    conn: &mut SqliteConnection,
    principal: &Principal,
) -> QueryResult<Vec<MediaSummary>> {
    let mut book_query = books::table
        .select(Book::as_select())
        .order(books::title.asc())
        .into_boxed();
    let mut film_query = films::table
        .select(Film::as_select())
        .order(films::title.asc())
        .into_boxed();

    if !principal.admin {
        match &principal.user_id {
            Some(user_id) => {
                book_query = book_query
                    .filter(books::validated.eq(true).or(books::owner_id.eq(user_id.clone())));
                film_query = film_query
                    .filter(films::validated.eq(true).or(films::owner_id.eq(user_id.clone())));
            }
            None => {
                book_query = book_query.filter(books::validated.eq(true));
                film_query = film_query.filter(films::validated.eq(true));
            }
        }
    }

    let mut summaries = Vec::new();
    for book in book_query.load::<Book>(conn)? {
        summaries.push(MediaRecord::Book(book).summary());
    }
    for film in film_query.load::<Film>(conn)? {
        summaries.push(MediaRecord::Film(film).summary());
    }
    Ok(summaries)
}

/// Escapes LIKE wildcards so a search term only matches itself
fn like_escape(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Finds media suggestions for an autocomplete query
///
/// A term that parses as a UUID is treated as an exact id lookup; anything
/// else matches as a case-insensitive title fragment. Visibility follows
/// the usual validated-or-own rule, and at most twenty suggestions come
/// back, ordered by title.
pub fn autocomplete_media(
    conn: &mut SqliteConnection,
    kind: MediaKind,
    principal: &Principal,
    term: Option<&str>,
) -> QueryResult<Vec<MediaSummary>> {
    match kind {
        MediaKind::Book => {
            let mut query = books::table
                .select(Book::as_select())
                .order(books::title.asc())
                .limit(SUGGESTION_LIMIT)
                .into_boxed();

            if !principal.admin {
                query = match &principal.user_id {
                    Some(user_id) => query
                        .filter(books::validated.eq(true).or(books::owner_id.eq(user_id.clone()))),
                    None => query.filter(books::validated.eq(true)),
                };
            }

            if let Some(term) = term {
                if uuid::Uuid::parse_str(term).is_ok() {
                    query = query.filter(books::id.eq(term.to_string()));
                } else {
                    let pattern = format!("%{}%", like_escape(term));
                    query = query.filter(books::title.like(pattern).escape('\\'));
                }
            }

            let rows = query.load::<Book>(conn)?;
            Ok(rows
                .into_iter()
                .map(|book| MediaRecord::Book(book).summary())
                .collect())
        }
        MediaKind::Film => {
            let mut query = films::table
                .select(Film::as_select())
                .order(films::title.asc())
                .limit(SUGGESTION_LIMIT)
                .into_boxed();

            if !principal.admin {
                query = match &principal.user_id {
                    Some(user_id) => query
                        .filter(films::validated.eq(true).or(films::owner_id.eq(user_id.clone()))),
                    None => query.filter(films::validated.eq(true)),
                };
            }

            if let Some(term) = term {
                if uuid::Uuid::parse_str(term).is_ok() {
                    query = query.filter(films::id.eq(term.to_string()));
                } else {
                    let pattern = format!("%{}%", like_escape(term));
                    query = query.filter(films::title.like(pattern).escape('\\'));
                }
            }

            let rows = query.load::<Film>(conn)?;
            Ok(rows
                .into_iter()
                .map(|film| MediaRecord::Film(film).summary())
                .collect())
        }
    }
}

/// Deletes a media item unless other people's reviews still point at it
///
/// Reviews owned by the media's owner lose their media reference; a
/// referencing review owned by anyone else, or by nobody, blocks the
/// delete. Genre and country links go with the row.
pub fn delete_media_cascade(
    conn: &mut SqliteConnection,
    registry: &Registry,
    record: &MediaRecord,
) -> Result<(), EngineError> {
    let kind_id = registry.media_kind_id(record.kind())?;
    let media_id = record.id();

    conn.transaction::<_, EngineError, _>(|conn| {
        let referencing = review_repo::reviews_referencing_media(conn, kind_id, &media_id)?;
        let blocked = referencing
            .iter()
            .any(|review| match review.get_owner_id() {
                None => true,
                Some(review_owner) => Some(review_owner) != record.owner(),
            });
        if blocked {
            return Err(EngineError::DependencyConflict(
                DEPENDENT_REVIEWS_MESSAGE.to_string(),
            ));
        }

        review_repo::detach_media_refs(conn, kind_id, &media_id)?;

        match record.kind() {
            MediaKind::Book => {
                diesel::delete(books::table.find(&media_id)).execute(conn)?;
            }
            MediaKind::Film => {
                diesel::delete(films::table.find(&media_id)).execute(conn)?;
            }
        }
        Ok(())
    })
}

/// Retrieves one media item by kind and id
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `kind` - The media kind to look in
/// * `media_id` - The ID of the media item
#[instrument(skip(pool), fields(media_id = %media_id))]
pub fn get_media_record(
    pool: &DbPool,
    kind: MediaKind,
    media_id: &str,
) -> Result<Option<MediaRecord>> {
    debug!("Retrieving media item by id");
    let conn = &mut pool.get()?;
    Ok(find_media(conn, kind, media_id)?)
}

/// Retrieves the media summaries a principal may see
///
/// Anonymous callers get the engine configuration's demo set; everyone
/// else gets the validated set plus their own items.
#[instrument(skip(pool, registry, principal), fields(config = %registry.config_name()))]
pub fn list_media(
    pool: &DbPool,
    registry: &Registry,
    principal: &Principal,
) -> Result<Vec<MediaSummary>> {
    let conn = &mut pool.get()?;
    if principal.is_anonymous() {
        debug!("Listing demo media for anonymous caller");
        return Ok(registry.demo_media(conn)?);
    }
    debug!("Listing visible media");
    Ok(list_visible_media(conn, principal)?)
}

/// Finds media suggestions matching an autocomplete query
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `kind` - The media kind to search
/// * `principal` - The caller, for visibility filtering
/// * `term` - The search term, if any
#[instrument(skip(pool, principal), fields(term = term.unwrap_or("")))]
pub fn search_media(
    pool: &DbPool,
    kind: MediaKind,
    principal: &Principal,
    term: Option<&str>,
) -> Result<Vec<MediaSummary>> {
    debug!("Searching media for autocomplete");
    let conn = &mut pool.get()?;
    Ok(autocomplete_media(conn, kind, principal, term)?)
}

/// Deletes a media item, detaching the owner's reviews from it
#[instrument(skip(pool, registry, record), fields(media_id = %record.id()))]
pub fn delete_media(
    pool: &DbPool,
    registry: &Registry,
    record: &MediaRecord,
) -> Result<(), EngineError> {
    debug!("Deleting media item");
    let conn = &mut pool.get()?;
    delete_media_cascade(conn, registry, record)
}
