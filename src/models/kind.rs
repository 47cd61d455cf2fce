use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A registered kind row
///
/// Kind ids are allocated by the database the first time a model name is
/// registered and never change afterwards, so persisted `(kind_id, ref)`
/// pairs stay meaningful across restarts and across configuration changes.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::kinds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Kind {
    /// Stable integer identifier allocated on first registration
    kind_id: i32,

    /// The model name this kind refers to (e.g. "book", "ebert_rating")
    model: String,
}

impl Kind {
    /// Gets the kind's stable integer identifier
    pub fn get_kind_id(&self) -> i32 {
        self.kind_id
    }

    /// Gets the model name this kind refers to
    pub fn get_model(&self) -> String {
        self.model.clone()
    }
}

/// Insertable form of [`Kind`] with the id left to the database
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::kinds)]
pub struct NewKind<'a> {
    pub model: &'a str,
}
