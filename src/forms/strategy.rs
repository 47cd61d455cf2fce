use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde_json::Value;

use crate::forms::fields::{self, FieldErrors};
use crate::models::{
    EbertRating, GoodreadsRating, ImdbRating, LetterboxdRating, ThumbRating, TomatoRating,
};
use crate::registry::StrategyKind;

/// Choice tokens accepted by the Ebert rating field, besides the empty
/// "unrated" choice and "GOAT"
const EBERT_STAR_CHOICES: [&str; 9] = [
    "0.0", "0.5", "1.0", "1.5", "2.0", "2.5", "3.0", "3.5", "4.0",
];

/// Cleaned Ebert rating data
///
/// The wire format is a single choice token: the empty string for an
/// unrated entry, a half-star value between "0.0" and "4.0", or "GOAT".
#[derive(Debug, Clone, PartialEq)]
pub struct EbertForm {
    pub existing: Option<String>,
    pub stars: Option<f32>,
    pub goat: bool,
}

/// Cleaned Goodreads rating data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodreadsForm {
    pub existing: Option<String>,
    pub stars: i32,
}

/// Cleaned IMDB rating data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImdbForm {
    pub existing: Option<String>,
    pub score: i32,
}

/// Cleaned Letterboxd rating data
#[derive(Debug, Clone, PartialEq)]
pub struct LetterboxdForm {
    pub existing: Option<String>,
    pub stars: f32,
}

/// Cleaned thumbs rating data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbsForm {
    pub existing: Option<String>,
    pub recommended: bool,
}

/// Cleaned tomato rating data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TomatoForm {
    pub existing: Option<String>,
    pub fresh: bool,
}

/// The per-kind strategy forms as a tagged sum
///
/// A form group selects at most one variant per payload, driven by the
/// review's strategy kind. Each variant carries the id of the rating row
/// it should update in place, if the bound review already had a rating of
/// the same kind.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyForm {
    Ebert(EbertForm),
    Goodreads(GoodreadsForm),
    Imdb(ImdbForm),
    Letterboxd(LetterboxdForm),
    Thumbs(ThumbsForm),
    Tomato(TomatoForm),
}

fn get<'a>(payload: Option<&'a Value>, field: &str) -> Option<&'a Value> {
    payload.and_then(|value| value.get(field))
}

impl StrategyForm {
    /// Cleans the payload section for one strategy kind
    ///
    /// Field-level problems are recorded into `errors` and `None` is
    /// returned; a `Some` result is fully cleaned and ready to save.
    ///
    /// ### Arguments
    ///
    /// * `kind` - The strategy kind selected by the review
    /// * `payload` - The payload section for this kind, if present
    /// * `existing` - The rating row to update in place, if any
    /// * `errors` - The error collector for the strategy section
    pub fn clean(
        kind: StrategyKind,
        payload: Option<&Value>,
        existing: Option<String>,
        errors: &mut FieldErrors,
    ) -> Option<Self> {
        match kind {
            StrategyKind::Ebert => clean_ebert(payload, existing, errors).map(StrategyForm::Ebert),
            StrategyKind::Goodreads => {
                clean_goodreads(payload, existing, errors).map(StrategyForm::Goodreads)
            }
            StrategyKind::Imdb => clean_imdb(payload, existing, errors).map(StrategyForm::Imdb),
            StrategyKind::Letterboxd => {
                clean_letterboxd(payload, existing, errors).map(StrategyForm::Letterboxd)
            }
            StrategyKind::Thumbs => {
                clean_thumbs(payload, existing, errors).map(StrategyForm::Thumbs)
            }
            StrategyKind::Tomato => {
                clean_tomato(payload, existing, errors).map(StrategyForm::Tomato)
            }
        }
    }

    /// The strategy kind this form belongs to
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyForm::Ebert(_) => StrategyKind::Ebert,
            StrategyForm::Goodreads(_) => StrategyKind::Goodreads,
            StrategyForm::Imdb(_) => StrategyKind::Imdb,
            StrategyForm::Letterboxd(_) => StrategyKind::Letterboxd,
            StrategyForm::Thumbs(_) => StrategyKind::Thumbs,
            StrategyForm::Tomato(_) => StrategyKind::Tomato,
        }
    }

    /// Persists the cleaned rating, updating in place where the form was
    /// bound to an existing row
    ///
    /// ### Returns
    ///
    /// The id of the rating row the review should reference
    pub fn save(&self, conn: &mut SqliteConnection) -> QueryResult<String> {
        match self {
            StrategyForm::Ebert(form) => {
                use crate::schema::ebert_ratings::dsl::*;
                match &form.existing {
                    Some(rating_id) => {
                        diesel::update(ebert_ratings.filter(id.eq(rating_id)))
                            .set((stars.eq(form.stars), goat.eq(form.goat)))
                            .execute(conn)?;
                        Ok(rating_id.clone())
                    }
                    None => {
                        let rating = EbertRating::new(form.stars, form.goat);
                        diesel::insert_into(ebert_ratings)
                            .values(&rating)
                            .execute(conn)?;
                        Ok(rating.get_id())
                    }
                }
            }
            StrategyForm::Goodreads(form) => {
                use crate::schema::goodreads_ratings::dsl::*;
                match &form.existing {
                    Some(rating_id) => {
                        diesel::update(goodreads_ratings.filter(id.eq(rating_id)))
                            .set(stars.eq(form.stars))
                            .execute(conn)?;
                        Ok(rating_id.clone())
                    }
                    None => {
                        let rating = GoodreadsRating::new(form.stars);
                        diesel::insert_into(goodreads_ratings)
                            .values(&rating)
                            .execute(conn)?;
                        Ok(rating.get_id())
                    }
                }
            }
            StrategyForm::Imdb(form) => {
                use crate::schema::imdb_ratings::dsl::*;
                match &form.existing {
                    Some(rating_id) => {
                        diesel::update(imdb_ratings.filter(id.eq(rating_id)))
                            .set(score.eq(form.score))
                            .execute(conn)?;
                        Ok(rating_id.clone())
                    }
                    None => {
                        let rating = ImdbRating::new(form.score);
                        diesel::insert_into(imdb_ratings)
                            .values(&rating)
                            .execute(conn)?;
                        Ok(rating.get_id())
                    }
                }
            }
            StrategyForm::Letterboxd(form) => {
                use crate::schema::letterboxd_ratings::dsl::*;
                match &form.existing {
                    Some(rating_id) => {
                        diesel::update(letterboxd_ratings.filter(id.eq(rating_id)))
                            .set(stars.eq(form.stars))
                            .execute(conn)?;
                        Ok(rating_id.clone())
                    }
                    None => {
                        let rating = LetterboxdRating::new(form.stars);
                        diesel::insert_into(letterboxd_ratings)
                            .values(&rating)
                            .execute(conn)?;
                        Ok(rating.get_id())
                    }
                }
            }
            StrategyForm::Thumbs(form) => {
                use crate::schema::thumb_ratings::dsl::*;
                match &form.existing {
                    Some(rating_id) => {
                        diesel::update(thumb_ratings.filter(id.eq(rating_id)))
                            .set(recommended.eq(form.recommended))
                            .execute(conn)?;
                        Ok(rating_id.clone())
                    }
                    None => {
                        let rating = ThumbRating::new(form.recommended);
                        diesel::insert_into(thumb_ratings)
                            .values(&rating)
                            .execute(conn)?;
                        Ok(rating.get_id())
                    }
                }
            }
            StrategyForm::Tomato(form) => {
                use crate::schema::tomato_ratings::dsl::*;
                match &form.existing {
                    Some(rating_id) => {
                        diesel::update(tomato_ratings.filter(id.eq(rating_id)))
                            .set(fresh.eq(form.fresh))
                            .execute(conn)?;
                        Ok(rating_id.clone())
                    }
                    None => {
                        let rating = TomatoRating::new(form.fresh);
                        diesel::insert_into(tomato_ratings)
                            .values(&rating)
                            .execute(conn)?;
                        Ok(rating.get_id())
                    }
                }
            }
        }
    }
}

fn clean_ebert(
    payload: Option<&Value>,
    existing: Option<String>,
    errors: &mut FieldErrors,
) -> Option<EbertForm> {
    let token = fields::choice_token(get(payload, "rating"));

    let (stars, goat) = match token.as_deref() {
        // The empty choice is an explicitly unrated entry
        None => (None, false),
        // The GOAT designation implies the top of the scale
        Some("GOAT") => (Some(4.0), true),
        Some(token) if EBERT_STAR_CHOICES.contains(&token) => {
            match token.parse::<f32>() {
                Ok(value) => (Some(value), false),
                Err(_) => {
                    errors.add("rating", fields::invalid_choice(token));
                    return None;
                }
            }
        }
        Some(token) => {
            errors.add("rating", fields::invalid_choice(token));
            return None;
        }
    };

    Some(EbertForm {
        existing,
        stars,
        goat,
    })
}

fn clean_goodreads(
    payload: Option<&Value>,
    existing: Option<String>,
    errors: &mut FieldErrors,
) -> Option<GoodreadsForm> {
    let stars = match fields::required_int(get(payload, "stars")) {
        Ok(stars) => stars,
        Err(message) => {
            errors.add("stars", message);
            return None;
        }
    };

    if stars < 1 {
        errors.add("stars", fields::min_value(1));
        return None;
    }
    if stars > 5 {
        errors.add("stars", fields::max_value(5));
        return None;
    }

    Some(GoodreadsForm { existing, stars })
}

fn clean_imdb(
    payload: Option<&Value>,
    existing: Option<String>,
    errors: &mut FieldErrors,
) -> Option<ImdbForm> {
    let score = match fields::required_int(get(payload, "score")) {
        Ok(score) => score,
        Err(message) => {
            errors.add("score", message);
            return None;
        }
    };

    if score < 1 {
        errors.add("score", fields::min_value(1));
        return None;
    }
    if score > 10 {
        errors.add("score", fields::max_value(10));
        return None;
    }

    Some(ImdbForm { existing, score })
}

fn clean_letterboxd(
    payload: Option<&Value>,
    existing: Option<String>,
    errors: &mut FieldErrors,
) -> Option<LetterboxdForm> {
    let raw = get(payload, "stars");
    let stars = match fields::required_float(raw) {
        Ok(stars) => stars,
        Err(message) => {
            errors.add("stars", message);
            return None;
        }
    };

    // Half-star steps from 0.5 to 5.0; notably, zero stars is not a choice
    let doubled = stars * 2.0;
    let on_half_step = doubled == doubled.trunc();
    if !(0.5..=5.0).contains(&stars) || !on_half_step {
        let shown = fields::choice_token(raw).unwrap_or_else(|| stars.to_string());
        errors.add("stars", fields::invalid_choice(&shown));
        return None;
    }

    Some(LetterboxdForm {
        existing,
        stars: stars as f32,
    })
}

fn clean_thumbs(
    payload: Option<&Value>,
    existing: Option<String>,
    errors: &mut FieldErrors,
) -> Option<ThumbsForm> {
    match fields::required_bool(get(payload, "recommended")) {
        Ok(recommended) => Some(ThumbsForm {
            existing,
            recommended,
        }),
        Err(message) => {
            errors.add("recommended", message);
            None
        }
    }
}

fn clean_tomato(
    payload: Option<&Value>,
    existing: Option<String>,
    errors: &mut FieldErrors,
) -> Option<TomatoForm> {
    match fields::required_bool(get(payload, "fresh")) {
        Ok(fresh) => Some(TomatoForm { existing, fresh }),
        Err(message) => {
            errors.add("fresh", message);
            None
        }
    }
}
