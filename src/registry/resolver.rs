use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::HashMap;
use tracing::debug;

use crate::errors::EngineError;
use crate::models::{Kind, NewKind};

/// Resolves model names to stable integer kind ids
///
/// Ids live in the kinds table and are allocated by the database the first
/// time a model name is registered. Once the resolver is built it answers
/// lookups from in-memory maps; resolution is the only point that touches
/// the database.
#[derive(Debug, Clone)]
pub struct KindResolver {
    by_name: HashMap<String, i32>,
    by_id: HashMap<i32, String>,
}

impl KindResolver {
    /// Resolves a set of model names, registering unseen names
    ///
    /// ### Arguments
    ///
    /// * `conn` - A connection used for lookups and inserts
    /// * `names` - The model names to resolve
    ///
    /// ### Returns
    ///
    /// A resolver answering lookups for exactly the given names, or
    /// [`EngineError::AmbiguousKind`] if a name appears more than once
    pub fn resolve(conn: &mut SqliteConnection, names: &[&str]) -> Result<Self, EngineError> {
        let mut by_name = HashMap::new();
        let mut by_id = HashMap::new();

        for name in names {
            if by_name.contains_key(*name) {
                return Err(EngineError::AmbiguousKind((*name).to_string()));
            }

            let kind_id = lookup_or_register(conn, name)?;
            by_name.insert((*name).to_string(), kind_id);
            by_id.insert(kind_id, (*name).to_string());
        }

        Ok(Self { by_name, by_id })
    }

    /// Translates a model name to its kind id
    pub fn to_id(&self, name: &str) -> Result<i32, EngineError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UnknownKind(name.to_string()))
    }

    /// Translates a kind id back to its model name
    pub fn from_id(&self, kind_id: i32) -> Result<&str, EngineError> {
        self.by_id
            .get(&kind_id)
            .map(String::as_str)
            .ok_or_else(|| EngineError::UnknownKind(format!("kind id {}", kind_id)))
    }

    /// The number of resolved names
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the resolver holds no names at all
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Finds the kind id for a model name, inserting a new row on first use
///
/// The id column is AUTOINCREMENT, so ids grow monotonically and deleted
/// ids are never reused.
fn lookup_or_register(conn: &mut SqliteConnection, model_name: &str) -> Result<i32, EngineError> {
    use crate::schema::kinds::dsl::*;

    let existing = kinds
        .filter(model.eq(model_name))
        .select(Kind::as_select())
        .first::<Kind>(conn)
        .optional()?;

    if let Some(kind) = existing {
        return Ok(kind.get_kind_id());
    }

    diesel::insert_into(kinds)
        .values(&NewKind { model: model_name })
        .execute(conn)?;

    let created = kinds
        .filter(model.eq(model_name))
        .select(Kind::as_select())
        .first::<Kind>(conn)?;

    debug!(
        "Registered kind '{}' with id {}",
        model_name,
        created.get_kind_id()
    );

    Ok(created.get_kind_id())
}
