/// Data models module
///
/// This module defines the core data structures used throughout the engine.
/// It includes database models that map to database tables, as well as
/// methods for creating and manipulating those models.

// Re-export all model types
mod kind;
pub use kind::{Kind, NewKind};

mod genre;
pub use genre::Genre;

mod country;
pub use country::Country;

mod book;
pub use book::Book;

mod film;
pub use film::Film;

mod book_genre;
pub use book_genre::BookGenre;

mod film_genre;
pub use film_genre::FilmGenre;

mod film_country;
pub use film_country::FilmCountry;

mod rating;
pub use rating::{
    EbertRating, GoodreadsRating, ImdbRating, LetterboxdRating, ThumbRating, TomatoRating,
};

mod review;
pub use review::Review;

mod user_settings;
pub use user_settings::UserSettings;
