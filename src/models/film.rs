use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a film that reviews can reference
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::films)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct Film {
    /// Unique identifier for the film (UUID v4 as string)
    id: String,

    /// The ID of the user who added this film, if any
    owner_id: Option<String>,

    /// The title of the film
    title: String,

    /// The director of the film
    director: String,

    /// The year of release, if known
    year: Option<i32>,

    /// Whether this film is part of the validated (publicly visible) set
    validated: bool,

    /// When this film was created
    created_at: NaiveDateTime,

    /// When this film was last updated
    updated_at: NaiveDateTime,
}

impl Film {
    /// Creates a new film
    ///
    /// ### Arguments
    ///
    /// * `title` - The title of the film
    /// * `director` - The director of the film
    /// * `year` - The year of release, if known
    /// * `owner_id` - The ID of the user adding the film, if any
    pub fn new(
        title: String,
        director: String,
        year: Option<i32>,
        owner_id: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            title,
            director,
            year,
            validated: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the film's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the user who added this film, if any
    pub fn get_owner_id(&self) -> Option<String> {
        self.owner_id.clone()
    }

    /// Sets the owner of this film
    pub fn set_owner_id(&mut self, owner_id: Option<String>) {
        self.owner_id = owner_id;
    }

    /// Gets the film's title
    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    /// Sets the film's title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    /// Gets the film's director
    pub fn get_director(&self) -> String {
        self.director.clone()
    }

    /// Sets the film's director
    pub fn set_director(&mut self, director: String) {
        self.director = director;
    }

    /// Gets the year of release, if known
    pub fn get_year(&self) -> Option<i32> {
        self.year
    }

    /// Sets the year of release
    pub fn set_year(&mut self, year: Option<i32>) {
        self.year = year;
    }

    /// Gets whether this film is part of the validated set
    pub fn get_validated(&self) -> bool {
        self.validated
    }

    /// Sets whether this film is part of the validated set
    pub fn set_validated(&mut self, validated: bool) {
        self.validated = validated;
    }

    /// Gets the film's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the film's last update timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }

    /// Refreshes the last update timestamp to now
    pub fn refresh_updated_at(&mut self) {
        self.updated_at = Utc::now().naive_utc();
    }

    /// Builds the display label used by media suggestions
    ///
    /// Films are labelled `"Title (Year)"`, falling back to the bare title
    /// when the year is unknown.
    pub fn label(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_film_new() {
        let film = Film::new(
            "Charade".to_string(),
            "Stanley Donen".to_string(),
            Some(1963),
            None,
        );

        assert_eq!(film.get_title(), "Charade");
        assert_eq!(film.get_director(), "Stanley Donen");
        assert_eq!(film.get_year(), Some(1963));
        assert_eq!(film.get_owner_id(), None);
        assert!(!film.get_validated());
        assert!(Uuid::parse_str(&film.get_id()).is_ok());
    }

    #[test]
    fn test_film_label() {
        let with_year = Film::new("Charade".to_string(), "Stanley Donen".to_string(), Some(1963), None);
        assert_eq!(with_year.label(), "Charade (1963)");

        let without_year = Film::new("Untitled".to_string(), "Unknown".to_string(), None, None);
        assert_eq!(without_year.label(), "Untitled");
    }
}
