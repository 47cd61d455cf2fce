use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::film_countries;

/// A link between a film and one of its production countries
#[derive(Queryable, Selectable, Insertable, Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[diesel(table_name = film_countries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FilmCountry {
    film_id: String,
    country_id: String,
}

impl FilmCountry {
    pub fn new(film_id: String, country_id: String) -> Self {
        FilmCountry { film_id, country_id }
    }

    pub fn get_film_id(&self) -> String {
        self.film_id.clone()
    }

    pub fn get_country_id(&self) -> String {
        self.country_id.clone()
    }
}
