use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ratings in the style of Roger Ebert: zero to four stars in half-star
/// steps, a missing rating, or the "Great Movie" (GOAT) designation.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::ebert_ratings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct EbertRating {
    /// Unique identifier for the rating (UUID v4 as string)
    id: String,

    /// Star rating in half-star steps from 0.0 to 4.0, if rated
    stars: Option<f32>,

    /// Whether the reviewed work carries the "Great Movie" designation
    goat: bool,
}

impl EbertRating {
    /// Creates a new Ebert rating
    pub fn new(stars: Option<f32>, goat: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stars,
            goat,
        }
    }

    /// Creates a new Ebert rating with all fields specified
    pub fn new_with_fields(id: String, stars: Option<f32>, goat: bool) -> Self {
        Self { id, stars, goat }
    }

    /// Gets the rating's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the star rating, if rated
    pub fn get_stars(&self) -> Option<f32> {
        self.stars
    }

    /// Sets the star rating
    pub fn set_stars(&mut self, stars: Option<f32>) {
        self.stars = stars;
    }

    /// Gets whether this rating carries the "Great Movie" designation
    pub fn get_goat(&self) -> bool {
        self.goat
    }

    /// Sets the "Great Movie" designation
    pub fn set_goat(&mut self, goat: bool) {
        self.goat = goat;
    }

    /// Renders the rating for display
    pub fn render_rating(&self) -> String {
        if self.goat {
            "GOAT".to_string()
        } else {
            match self.stars {
                Some(stars) => format!("{}/4", stars),
                None => "Unrated".to_string(),
            }
        }
    }
}

/// Ratings in the style of Goodreads: one to five whole stars.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::goodreads_ratings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoodreadsRating {
    /// Unique identifier for the rating (UUID v4 as string)
    id: String,

    /// Star rating from 1 to 5
    stars: i32,
}

impl GoodreadsRating {
    /// Creates a new Goodreads rating
    pub fn new(stars: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stars,
        }
    }

    /// Creates a new Goodreads rating with all fields specified
    pub fn new_with_fields(id: String, stars: i32) -> Self {
        Self { id, stars }
    }

    /// Gets the rating's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the star rating
    pub fn get_stars(&self) -> i32 {
        self.stars
    }

    /// Sets the star rating
    pub fn set_stars(&mut self, stars: i32) {
        self.stars = stars;
    }

    /// Renders the rating for display
    pub fn render_rating(&self) -> String {
        format!("{}/5", self.stars)
    }
}

/// Ratings in the style of IMDB: a score from 1 to 10.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::imdb_ratings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ImdbRating {
    /// Unique identifier for the rating (UUID v4 as string)
    id: String,

    /// Score from 1 to 10
    score: i32,
}

impl ImdbRating {
    /// Creates a new IMDB rating
    pub fn new(score: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            score,
        }
    }

    /// Creates a new IMDB rating with all fields specified
    pub fn new_with_fields(id: String, score: i32) -> Self {
        Self { id, score }
    }

    /// Gets the rating's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the score
    pub fn get_score(&self) -> i32 {
        self.score
    }

    /// Sets the score
    pub fn set_score(&mut self, score: i32) {
        self.score = score;
    }

    /// Renders the rating for display
    pub fn render_rating(&self) -> String {
        format!("{}/10", self.score)
    }
}

/// Ratings in the style of Letterboxd: half a star to five stars in
/// half-star steps.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::letterboxd_ratings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LetterboxdRating {
    /// Unique identifier for the rating (UUID v4 as string)
    id: String,

    /// Star rating in half-star steps from 0.5 to 5.0
    stars: f32,
}

impl LetterboxdRating {
    /// Creates a new Letterboxd rating
    pub fn new(stars: f32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stars,
        }
    }

    /// Creates a new Letterboxd rating with all fields specified
    pub fn new_with_fields(id: String, stars: f32) -> Self {
        Self { id, stars }
    }

    /// Gets the rating's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the star rating
    pub fn get_stars(&self) -> f32 {
        self.stars
    }

    /// Sets the star rating
    pub fn set_stars(&mut self, stars: f32) {
        self.stars = stars;
    }

    /// Renders the rating for display
    pub fn render_rating(&self) -> String {
        format!("{}/5", self.stars)
    }
}

/// Ratings as a simple thumbs up or thumbs down.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::thumb_ratings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ThumbRating {
    /// Unique identifier for the rating (UUID v4 as string)
    id: String,

    /// Whether the reviewed work is recommended
    recommended: bool,
}

impl ThumbRating {
    /// Creates a new thumb rating
    pub fn new(recommended: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recommended,
        }
    }

    /// Creates a new thumb rating with all fields specified
    pub fn new_with_fields(id: String, recommended: bool) -> Self {
        Self { id, recommended }
    }

    /// Gets the rating's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets whether the reviewed work is recommended
    pub fn get_recommended(&self) -> bool {
        self.recommended
    }

    /// Sets whether the reviewed work is recommended
    pub fn set_recommended(&mut self, recommended: bool) {
        self.recommended = recommended;
    }

    /// Renders the rating for display
    pub fn render_rating(&self) -> String {
        if self.recommended {
            "Thumbs up".to_string()
        } else {
            "Thumbs down".to_string()
        }
    }
}

/// Ratings in the style of Rotten Tomatoes: fresh or rotten.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::tomato_ratings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TomatoRating {
    /// Unique identifier for the rating (UUID v4 as string)
    id: String,

    /// Whether the reviewed work is rated fresh
    fresh: bool,
}

impl TomatoRating {
    /// Creates a new tomato rating
    pub fn new(fresh: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            fresh,
        }
    }

    /// Creates a new tomato rating with all fields specified
    pub fn new_with_fields(id: String, fresh: bool) -> Self {
        Self { id, fresh }
    }

    /// Gets the rating's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets whether the reviewed work is rated fresh
    pub fn get_fresh(&self) -> bool {
        self.fresh
    }

    /// Sets whether the reviewed work is rated fresh
    pub fn set_fresh(&mut self, fresh: bool) {
        self.fresh = fresh;
    }

    /// Renders the rating for display
    pub fn render_rating(&self) -> String {
        if self.fresh {
            "Fresh".to_string()
        } else {
            "Rotten".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ebert_render_goat() {
        let rating = EbertRating::new(None, true);
        assert_eq!(rating.render_rating(), "GOAT");
    }

    #[test]
    fn test_ebert_render_stars() {
        let whole = EbertRating::new(Some(3.0), false);
        assert_eq!(whole.render_rating(), "3/4");

        let half = EbertRating::new(Some(3.5), false);
        assert_eq!(half.render_rating(), "3.5/4");
    }

    #[test]
    fn test_ebert_render_unrated() {
        let rating = EbertRating::new(None, false);
        assert_eq!(rating.render_rating(), "Unrated");
    }

    #[test]
    fn test_goodreads_render() {
        let rating = GoodreadsRating::new(5);
        assert_eq!(rating.render_rating(), "5/5");
    }

    #[test]
    fn test_imdb_render() {
        let rating = ImdbRating::new(7);
        assert_eq!(rating.render_rating(), "7/10");
    }

    #[test]
    fn test_letterboxd_render() {
        let rating = LetterboxdRating::new(4.5);
        assert_eq!(rating.render_rating(), "4.5/5");
    }

    #[test]
    fn test_thumb_render() {
        assert_eq!(ThumbRating::new(true).render_rating(), "Thumbs up");
        assert_eq!(ThumbRating::new(false).render_rating(), "Thumbs down");
    }

    #[test]
    fn test_tomato_render() {
        assert_eq!(TomatoRating::new(true).render_rating(), "Fresh");
        assert_eq!(TomatoRating::new(false).render_rating(), "Rotten");
    }

    #[test]
    fn test_ratings_get_fresh_ids() {
        assert!(Uuid::parse_str(&EbertRating::new(None, false).get_id()).is_ok());
        assert!(Uuid::parse_str(&GoodreadsRating::new(3).get_id()).is_ok());
        assert!(Uuid::parse_str(&ImdbRating::new(3).get_id()).is_ok());
        assert!(Uuid::parse_str(&LetterboxdRating::new(3.0).get_id()).is_ok());
        assert!(Uuid::parse_str(&ThumbRating::new(true).get_id()).is_ok());
        assert!(Uuid::parse_str(&TomatoRating::new(true).get_id()).is_ok());
    }
}
