/// Repository module
///
/// This module provides the data access layer for the engine.
///
/// Functions taking a `&mut SqliteConnection` are the transactional
/// primitives; the form group and the cascade deletes compose them inside
/// one transaction. Functions taking a `&DbPool` are the entry points
/// handlers call directly.

pub mod media_repo;
pub mod rating_repo;
pub mod reference_repo;
pub mod review_repo;
pub mod settings_repo;

// Re-export all repository functions
pub use media_repo::*;
pub use rating_repo::*;
pub use reference_repo::*;
pub use review_repo::*;
pub use settings_repo::*;
