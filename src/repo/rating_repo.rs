use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::models::{
    EbertRating, GoodreadsRating, ImdbRating, LetterboxdRating, ThumbRating, TomatoRating,
};
use crate::registry::StrategyKind;
use crate::schema::{
    ebert_ratings, goodreads_ratings, imdb_ratings, letterboxd_ratings, thumb_ratings,
    tomato_ratings,
};

/// Deletes one rating row from the table its kind lives in
pub fn delete_rating(
    conn: &mut SqliteConnection,
    kind: StrategyKind,
    rating_id: &str,
) -> QueryResult<usize> {
    match kind {
        StrategyKind::Ebert => {
            diesel::delete(ebert_ratings::table.find(rating_id)).execute(conn)
        }
        StrategyKind::Goodreads => {
            diesel::delete(goodreads_ratings::table.find(rating_id)).execute(conn)
        }
        StrategyKind::Imdb => diesel::delete(imdb_ratings::table.find(rating_id)).execute(conn),
        StrategyKind::Letterboxd => {
            diesel::delete(letterboxd_ratings::table.find(rating_id)).execute(conn)
        }
        StrategyKind::Thumbs => {
            diesel::delete(thumb_ratings::table.find(rating_id)).execute(conn)
        }
        StrategyKind::Tomato => {
            diesel::delete(tomato_ratings::table.find(rating_id)).execute(conn)
        }
    }
}

/// Loads one rating row and renders it with its kind's display rule
///
/// Returns `None` when the row is gone, which listings tolerate rather
/// than failing the whole page.
pub fn render_rating(
    conn: &mut SqliteConnection,
    kind: StrategyKind,
    rating_id: &str,
) -> QueryResult<Option<String>> {
    match kind {
        StrategyKind::Ebert => Ok(ebert_ratings::table
            .find(rating_id)
            .select(EbertRating::as_select())
            .first(conn)
            .optional()?
            .map(|rating| rating.render_rating())),
        StrategyKind::Goodreads => Ok(goodreads_ratings::table
            .find(rating_id)
            .select(GoodreadsRating::as_select())
            .first(conn)
            .optional()?
            .map(|rating| rating.render_rating())),
        StrategyKind::Imdb => Ok(imdb_ratings::table
            .find(rating_id)
            .select(ImdbRating::as_select())
            .first(conn)
            .optional()?
            .map(|rating| rating.render_rating())),
        StrategyKind::Letterboxd => Ok(letterboxd_ratings::table
            .find(rating_id)
            .select(LetterboxdRating::as_select())
            .first(conn)
            .optional()?
            .map(|rating| rating.render_rating())),
        StrategyKind::Thumbs => Ok(thumb_ratings::table
            .find(rating_id)
            .select(ThumbRating::as_select())
            .first(conn)
            .optional()?
            .map(|rating| rating.render_rating())),
        StrategyKind::Tomato => Ok(tomato_ratings::table
            .find(rating_id)
            .select(TomatoRating::as_select())
            .first(conn)
            .optional()?
            .map(|rating| rating.render_rating())),
    }
}
