use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a genre that books and films can be tagged with
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::genres)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Genre {
    /// Unique identifier for the genre (UUID v4 as string)
    id: String,

    /// The display name of the genre
    name: String,
}

impl Genre {
    /// Creates a new genre
    ///
    /// ### Arguments
    ///
    /// * `name` - The display name of the genre
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
        }
    }

    /// Creates a new genre with all fields specified
    pub fn new_with_fields(id: String, name: String) -> Self {
        Self { id, name }
    }

    /// Gets the genre's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the genre's name
    pub fn get_name(&self) -> String {
        self.name.clone()
    }
}
