/// Engine configuration registry
///
/// The registry is resolved once at startup from a named configuration
/// descriptor and then shared immutably behind an `Arc`. It owns the closed
/// sets of strategy and media kinds the deployment has enabled, the mapping
/// between those kinds and their stable database kind ids, and the demo
/// content queries shown to anonymous callers.

mod resolver;
pub use resolver::KindResolver;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::errors::EngineError;
use crate::models::Review;

/// The closed set of rating strategy kinds this engine knows how to handle
///
/// A deployment enables a subset of these through its [`EngineConfig`];
/// kinds outside the enabled subset are rejected at the payload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    Ebert,
    Goodreads,
    Imdb,
    Letterboxd,
    Thumbs,
    Tomato,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Ebert,
        StrategyKind::Goodreads,
        StrategyKind::Imdb,
        StrategyKind::Letterboxd,
        StrategyKind::Thumbs,
        StrategyKind::Tomato,
    ];

    /// The model name registered in the kinds table for this strategy
    pub fn model_name(&self) -> &'static str {
        match self {
            StrategyKind::Ebert => "ebert_rating",
            StrategyKind::Goodreads => "goodreads_rating",
            StrategyKind::Imdb => "imdb_rating",
            StrategyKind::Letterboxd => "letterboxd_rating",
            StrategyKind::Thumbs => "thumb_rating",
            StrategyKind::Tomato => "tomato_rating",
        }
    }

    /// The human-readable name of this strategy
    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyKind::Ebert => "Ebert",
            StrategyKind::Goodreads => "Goodreads",
            StrategyKind::Imdb => "IMDB",
            StrategyKind::Letterboxd => "Letterboxd",
            StrategyKind::Thumbs => "Thumbs",
            StrategyKind::Tomato => "Tomato",
        }
    }
}

/// The closed set of media item kinds this engine knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Book,
    Film,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Book, MediaKind::Film];

    /// The model name registered in the kinds table for this media kind
    pub fn model_name(&self) -> &'static str {
        match self {
            MediaKind::Book => "book",
            MediaKind::Film => "film",
        }
    }

    /// The human-readable name of this media kind
    pub fn display_name(&self) -> &'static str {
        match self {
            MediaKind::Book => "Book",
            MediaKind::Film => "Film",
        }
    }
}

/// A lightweight projection of one media item, used for listings and for
/// the demo media set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSummary {
    /// Which media kind the item belongs to
    pub kind: MediaKind,

    /// The media item's ID
    pub id: String,

    /// The media item's title
    pub title: String,

    /// The display label ("Title (Author, Year)" for books, "Title (Year)"
    /// for films)
    pub label: String,
}

/// A query producing the reviews shown to anonymous callers
pub type ReviewSet = fn(&mut SqliteConnection) -> QueryResult<Vec<Review>>;

/// A query producing the media summaries shown to anonymous callers
pub type MediaSet = fn(&mut SqliteConnection) -> QueryResult<Vec<MediaSummary>>;

/// A named engine configuration descriptor
///
/// Descriptors are static values selected by name at startup. They declare
/// which strategy and media kinds are enabled and which demo content
/// queries to use.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub name: &'static str,
    pub strategy_forms: &'static [StrategyKind],
    pub media_forms: &'static [MediaKind],
    pub demo_review_set: ReviewSet,
    pub demo_media_set: MediaSet,
}

fn empty_review_set(_conn: &mut SqliteConnection) -> QueryResult<Vec<Review>> {
    Ok(Vec::new())
}

fn empty_media_set(_conn: &mut SqliteConnection) -> QueryResult<Vec<MediaSummary>> {
    Ok(Vec::new())
}

fn validated_review_set(conn: &mut SqliteConnection) -> QueryResult<Vec<Review>> {
    use crate::repo::review_repo::VISIBLE_REVIEW_ORDER;
    use crate::schema::reviews::dsl::*;
    use diesel::dsl::sql;
    use diesel::sql_types::Bool;

    reviews
        .filter(validated.eq(true))
        .order(sql::<Bool>(VISIBLE_REVIEW_ORDER))
        .select(Review::as_select())
        .load(conn)
}

fn validated_media_set(conn: &mut SqliteConnection) -> QueryResult<Vec<MediaSummary>> {
    use crate::models::{Book, Film};

    let books: Vec<Book> = {
        use crate::schema::books::dsl::*;
        books
            .filter(validated.eq(true))
            .select(Book::as_select())
            .load(conn)?
    };
    let films: Vec<Film> = {
        use crate::schema::films::dsl::*;
        films
            .filter(validated.eq(true))
            .select(Film::as_select())
            .load(conn)?
    };

    let mut summaries = Vec::with_capacity(books.len() + films.len());
    for book in books {
        summaries.push(MediaSummary {
            kind: MediaKind::Book,
            id: book.get_id(),
            title: book.get_title(),
            label: book.label(),
        });
    }
    for film in films {
        summaries.push(MediaSummary {
            kind: MediaKind::Film,
            id: film.get_id(),
            title: film.get_title(),
            label: film.label(),
        });
    }
    Ok(summaries)
}

/// Looks up a built-in configuration descriptor by name
///
/// Two configurations ship with the engine: `"default"`, which enables
/// every kind and shows no demo content, and `"showcase"`, which also
/// surfaces the validated rows as demo content for anonymous callers.
pub fn named_config(name: &str) -> Option<EngineConfig> {
    match name {
        "default" => Some(EngineConfig {
            name: "default",
            strategy_forms: &StrategyKind::ALL,
            media_forms: &MediaKind::ALL,
            demo_review_set: empty_review_set,
            demo_media_set: empty_media_set,
        }),
        "showcase" => Some(EngineConfig {
            name: "showcase",
            strategy_forms: &StrategyKind::ALL,
            media_forms: &MediaKind::ALL,
            demo_review_set: validated_review_set,
            demo_media_set: validated_media_set,
        }),
        _ => None,
    }
}

/// The resolved, immutable engine registry
///
/// Built once by [`Registry::ready`] and shared behind an `Arc`. All kind
/// lookups after startup go through the maps built here; no database access
/// is needed to translate between kind values and kind ids.
pub struct Registry {
    config_name: String,
    strategy_kinds: Vec<StrategyKind>,
    media_kinds: Vec<MediaKind>,
    strategy_ids: HashMap<StrategyKind, i32>,
    strategy_by_id: HashMap<i32, StrategyKind>,
    media_ids: HashMap<MediaKind, i32>,
    media_by_id: HashMap<i32, MediaKind>,
    demo_review_set: ReviewSet,
    demo_media_set: MediaSet,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config_name", &self.config_name)
            .field("strategy_kinds", &self.strategy_kinds)
            .field("media_kinds", &self.media_kinds)
            .finish()
    }
}

impl Registry {
    /// Resolves a configuration descriptor into a ready registry
    ///
    /// Every declared kind is resolved to its stable kind id, inserting a
    /// new kinds row where the model name has not been seen before. A kind
    /// declared twice in the same descriptor is a configuration fault and
    /// fails the whole startup.
    ///
    /// ### Arguments
    ///
    /// * `conn` - A connection used for kind resolution
    /// * `config` - The configuration descriptor to resolve
    ///
    /// ### Returns
    ///
    /// The ready registry, or the configuration error that should abort
    /// startup
    pub fn ready(conn: &mut SqliteConnection, config: EngineConfig) -> Result<Self, EngineError> {
        let names: Vec<&str> = config
            .strategy_forms
            .iter()
            .map(|kind| kind.model_name())
            .chain(config.media_forms.iter().map(|kind| kind.model_name()))
            .collect();
        let resolver = KindResolver::resolve(conn, &names)?;

        let mut strategy_ids = HashMap::new();
        let mut strategy_by_id = HashMap::new();
        for kind in config.strategy_forms {
            let kind_id = resolver.to_id(kind.model_name())?;
            strategy_ids.insert(*kind, kind_id);
            strategy_by_id.insert(kind_id, *kind);
        }

        let mut media_ids = HashMap::new();
        let mut media_by_id = HashMap::new();
        for kind in config.media_forms {
            let kind_id = resolver.to_id(kind.model_name())?;
            media_ids.insert(*kind, kind_id);
            media_by_id.insert(kind_id, *kind);
        }

        info!(
            "Engine configuration '{}' ready with {} strategy kinds and {} media kinds",
            config.name,
            config.strategy_forms.len(),
            config.media_forms.len()
        );

        Ok(Self {
            config_name: config.name.to_string(),
            strategy_kinds: config.strategy_forms.to_vec(),
            media_kinds: config.media_forms.to_vec(),
            strategy_ids,
            strategy_by_id,
            media_ids,
            media_by_id,
            demo_review_set: config.demo_review_set,
            demo_media_set: config.demo_media_set,
        })
    }

    /// Resolves a built-in configuration by name
    ///
    /// ### Arguments
    ///
    /// * `conn` - A connection used for kind resolution
    /// * `name` - The name of a built-in configuration descriptor
    pub fn ready_named(conn: &mut SqliteConnection, name: &str) -> Result<Self, EngineError> {
        let config = named_config(name)
            .ok_or_else(|| EngineError::UnknownKind(format!("engine configuration '{}'", name)))?;
        Self::ready(conn, config)
    }

    /// Gets the name of the configuration this registry was built from
    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    /// Gets the enabled strategy kinds, in declaration order
    pub fn strategy_kinds(&self) -> &[StrategyKind] {
        &self.strategy_kinds
    }

    /// Gets the enabled media kinds, in declaration order
    pub fn media_kinds(&self) -> &[MediaKind] {
        &self.media_kinds
    }

    /// Translates an enabled strategy kind to its stable kind id
    pub fn strategy_kind_id(&self, kind: StrategyKind) -> Result<i32, EngineError> {
        self.strategy_ids
            .get(&kind)
            .copied()
            .ok_or_else(|| EngineError::UnknownKind(kind.model_name().to_string()))
    }

    /// Translates a stable kind id back to an enabled strategy kind
    pub fn strategy_kind_from_id(&self, kind_id: i32) -> Result<StrategyKind, EngineError> {
        self.strategy_by_id
            .get(&kind_id)
            .copied()
            .ok_or_else(|| EngineError::UnknownKind(format!("strategy kind id {}", kind_id)))
    }

    /// Translates an enabled media kind to its stable kind id
    pub fn media_kind_id(&self, kind: MediaKind) -> Result<i32, EngineError> {
        self.media_ids
            .get(&kind)
            .copied()
            .ok_or_else(|| EngineError::UnknownKind(kind.model_name().to_string()))
    }

    /// Translates a stable kind id back to an enabled media kind
    pub fn media_kind_from_id(&self, kind_id: i32) -> Result<MediaKind, EngineError> {
        self.media_by_id
            .get(&kind_id)
            .copied()
            .ok_or_else(|| EngineError::UnknownKind(format!("media kind id {}", kind_id)))
    }

    /// Runs the demo review query for anonymous callers
    pub fn demo_reviews(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<Review>> {
        (self.demo_review_set)(conn)
    }

    /// Runs the demo media query for anonymous callers
    pub fn demo_media(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<MediaSummary>> {
        (self.demo_media_set)(conn)
    }
}
