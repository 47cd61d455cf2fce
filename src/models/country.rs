use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a country of origin that films can be tagged with
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::countries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Country {
    /// Unique identifier for the country (UUID v4 as string)
    id: String,

    /// The display name of the country
    name: String,
}

impl Country {
    /// Creates a new country
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
        }
    }

    /// Creates a new country with all fields specified
    pub fn new_with_fields(id: String, name: String) -> Self {
        Self { id, name }
    }

    /// Gets the country's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the country's name
    pub fn get_name(&self) -> String {
        self.name.clone()
    }
}
