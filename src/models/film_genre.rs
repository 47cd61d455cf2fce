use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::film_genres;

/// A link between a film and one of its genres
#[derive(Queryable, Selectable, Insertable, Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[diesel(table_name = film_genres)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FilmGenre {
    film_id: String,
    genre_id: String,
}

impl FilmGenre {
    pub fn new(film_id: String, genre_id: String) -> Self {
        FilmGenre { film_id, genre_id }
    }

    pub fn get_film_id(&self) -> String {
        self.film_id.clone()
    }

    pub fn get_genre_id(&self) -> String {
        self.genre_id.clone()
    }
}
