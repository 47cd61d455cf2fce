use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde_json::Value;

use crate::errors::EngineError;
use crate::forms::fields::{self, FieldErrors};
use crate::models::{Book, BookGenre, Film, FilmCountry, FilmGenre};
use crate::registry::MediaKind;
use crate::repo::reference_repo;

/// Longest title, author or director the catalogue accepts
const NAME_MAX_LENGTH: usize = 256;

/// Cleaned data for a new book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    pub genres: Vec<String>,
}

/// Cleaned data for a new film
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilmForm {
    pub title: String,
    pub director: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
}

/// The per-kind media forms as a tagged sum
///
/// Media forms only ever create rows. Reviews that should point at media
/// already in the catalogue select it by reference instead of binding one
/// of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaForm {
    Book(BookForm),
    Film(FilmForm),
}

fn get<'a>(payload: Option<&'a Value>, field: &str) -> Option<&'a Value> {
    payload.and_then(|value| value.get(field))
}

/// Cleans a required name-like field with the catalogue length cap
fn clean_name(
    payload: Option<&Value>,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match fields::required_string(get(payload, field)) {
        Ok(value) => {
            let length = value.chars().count();
            if length > NAME_MAX_LENGTH {
                errors.add(field, fields::max_length_exceeded(NAME_MAX_LENGTH, length));
                None
            } else {
                Some(value)
            }
        }
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

fn clean_optional_int(
    payload: Option<&Value>,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<Option<i32>> {
    match fields::optional_int(get(payload, field)) {
        Ok(value) => Some(value),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

/// Release years stay within four display digits
fn clean_year(
    payload: Option<&Value>,
    errors: &mut FieldErrors,
) -> Option<Option<i32>> {
    let year = clean_optional_int(payload, "year", errors)?;
    if let Some(year) = year {
        if year > 9999 {
            errors.add("year", fields::max_value(9999));
            return None;
        }
    }
    Some(year)
}

/// Pulls a list of reference ids out of the payload without touching the
/// database; missing and null both mean an empty selection
fn clean_id_list(
    payload: Option<&Value>,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Vec<String> {
    match get(payload, field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut ids = Vec::with_capacity(items.len());
            for item in items {
                match fields::choice_token(Some(item)) {
                    Some(token) => ids.push(token),
                    None => errors.add(field, fields::INVALID_VALUE),
                }
            }
            ids
        }
        Some(_) => {
            errors.add(field, fields::INVALID_VALUE);
            Vec::new()
        }
    }
}

fn check_genres(
    conn: &mut SqliteConnection,
    ids: &[String],
    errors: &mut FieldErrors,
) -> Result<(), EngineError> {
    for missing in reference_repo::missing_genre_ids(conn, ids)? {
        errors.add("genres", fields::invalid_choice(&missing));
    }
    Ok(())
}

fn check_countries(
    conn: &mut SqliteConnection,
    ids: &[String],
    errors: &mut FieldErrors,
) -> Result<(), EngineError> {
    for missing in reference_repo::missing_country_ids(conn, ids)? {
        errors.add("countries", fields::invalid_choice(&missing));
    }
    Ok(())
}

impl MediaForm {
    /// Cleans the payload section for one media kind
    ///
    /// Field-level problems are recorded into `errors` and `Ok(None)` is
    /// returned; the outer `Result` carries database failures from the
    /// reference-data lookups.
    pub fn clean(
        conn: &mut SqliteConnection,
        kind: MediaKind,
        payload: Option<&Value>,
        errors: &mut FieldErrors,
    ) -> Result<Option<Self>, EngineError> {
        match kind {
            MediaKind::Book => Ok(clean_book(conn, payload, errors)?.map(MediaForm::Book)),
            MediaKind::Film => Ok(clean_film(conn, payload, errors)?.map(MediaForm::Film)),
        }
    }

    /// The media kind this form belongs to
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaForm::Book(_) => MediaKind::Book,
            MediaForm::Film(_) => MediaKind::Film,
        }
    }

    /// Inserts the media item and its taxonomy links
    ///
    /// ### Arguments
    ///
    /// * `conn` - The database connection, normally inside the group's
    ///   transaction
    /// * `owner_id` - The creating user; new media always starts out
    ///   unvalidated and owned by them
    ///
    /// ### Returns
    ///
    /// The id of the new media row
    pub fn save(
        &self,
        conn: &mut SqliteConnection,
        owner_id: Option<&str>,
    ) -> QueryResult<String> {
        match self {
            MediaForm::Book(form) => {
                let book = Book::new(
                    form.title.clone(),
                    form.author.clone(),
                    form.year,
                    form.pages,
                    owner_id.map(String::from),
                );
                diesel::insert_into(crate::schema::books::table)
                    .values(&book)
                    .execute(conn)?;

                let links: Vec<BookGenre> = form
                    .genres
                    .iter()
                    .map(|genre_id| BookGenre::new(book.get_id(), genre_id.clone()))
                    .collect();
                diesel::insert_into(crate::schema::book_genres::table)
                    .values(&links)
                    .execute(conn)?;

                Ok(book.get_id())
            }
            MediaForm::Film(form) => {
                let film = Film::new(
                    form.title.clone(),
                    form.director.clone(),
                    form.year,
                    owner_id.map(String::from),
                );
                diesel::insert_into(crate::schema::films::table)
                    .values(&film)
                    .execute(conn)?;

                let genre_links: Vec<FilmGenre> = form
                    .genres
                    .iter()
                    .map(|genre_id| FilmGenre::new(film.get_id(), genre_id.clone()))
                    .collect();
                diesel::insert_into(crate::schema::film_genres::table)
                    .values(&genre_links)
                    .execute(conn)?;

                let country_links: Vec<FilmCountry> = form
                    .countries
                    .iter()
                    .map(|country_id| FilmCountry::new(film.get_id(), country_id.clone()))
                    .collect();
                diesel::insert_into(crate::schema::film_countries::table)
                    .values(&country_links)
                    .execute(conn)?;

                Ok(film.get_id())
            }
        }
    }
}

fn clean_book(
    conn: &mut SqliteConnection,
    payload: Option<&Value>,
    errors: &mut FieldErrors,
) -> Result<Option<BookForm>, EngineError> {
    let title = clean_name(payload, "title", errors);
    let author = clean_name(payload, "author", errors);
    let year = clean_year(payload, errors);
    let pages = clean_optional_int(payload, "pages", errors);

    let genres = clean_id_list(payload, "genres", errors);
    check_genres(conn, &genres, errors)?;

    if !errors.is_empty() {
        return Ok(None);
    }

    match (title, author, year, pages) {
        (Some(title), Some(author), Some(year), Some(pages)) => Ok(Some(BookForm {
            title,
            author,
            year,
            pages,
            genres,
        })),
        _ => Ok(None),
    }
}

fn clean_film(
    conn: &mut SqliteConnection,
    payload: Option<&Value>,
    errors: &mut FieldErrors,
) -> Result<Option<FilmForm>, EngineError> {
    let title = clean_name(payload, "title", errors);
    let director = clean_name(payload, "director", errors);
    let year = clean_year(payload, errors);

    let genres = clean_id_list(payload, "genres", errors);
    check_genres(conn, &genres, errors)?;
    let countries = clean_id_list(payload, "countries", errors);
    check_countries(conn, &countries, errors)?;

    if !errors.is_empty() {
        return Ok(None);
    }

    match (title, director, year) {
        (Some(title), Some(director), Some(year)) => Ok(Some(FilmForm {
            title,
            director,
            year,
            genres,
            countries,
        })),
        _ => Ok(None),
    }
}
