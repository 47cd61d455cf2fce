use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::book_genres;

/// A link between a book and one of its genres
#[derive(Queryable, Selectable, Insertable, Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[diesel(table_name = book_genres)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookGenre {
    book_id: String,
    genre_id: String,
}

impl BookGenre {
    pub fn new(book_id: String, genre_id: String) -> Self {
        BookGenre { book_id, genre_id }
    }

    pub fn get_book_id(&self) -> String {
        self.book_id.clone()
    }

    pub fn get_genre_id(&self) -> String {
        self.genre_id.clone()
    }
}
