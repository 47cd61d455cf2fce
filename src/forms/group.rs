use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::dto::ReviewSubmissionDto;
use crate::errors::EngineError;
use crate::forms::fields::{self, FieldErrors};
use crate::forms::management::{clean_disposition, MediaDisposition};
use crate::forms::media::MediaForm;
use crate::forms::review_form::{clean_review, CleanedReview};
use crate::forms::strategy::StrategyForm;
use crate::models::Review;
use crate::permissions::{may, Action};
use crate::principal::Principal;
use crate::quota;
use crate::registry::Registry;
use crate::repo;

/// Field errors gathered across the four sections of a submission
///
/// Empty sections are dropped from the serialized form, so a client only
/// sees the parts that actually failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupErrors {
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub review: FieldErrors,

    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub management: FieldErrors,

    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub strategy: FieldErrors,

    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub media: FieldErrors,
}

impl GroupErrors {
    pub fn is_empty(&self) -> bool {
        self.review.is_empty()
            && self.management.is_empty()
            && self.strategy.is_empty()
            && self.media.is_empty()
    }
}

impl std::fmt::Display for GroupErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        for (section, errors) in [
            ("review", &self.review),
            ("management", &self.management),
            ("strategy", &self.strategy),
            ("media", &self.media),
        ] {
            if !errors.is_empty() {
                parts.push(format!("{} ({} fields)", section, errors.len()));
            }
        }
        if parts.is_empty() {
            write!(f, "no errors")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// The result of running a submission through every section's validation
#[derive(Debug)]
struct Validation {
    cleaned: CleanedReview,
    disposition: Option<MediaDisposition>,
    strategy_form: Option<StrategyForm>,
    media_form: Option<MediaForm>,
    errors: GroupErrors,
}

/// The composite form behind review creation and editing
///
/// A group binds one submission to the engine registry, a principal, and
/// optionally the review being edited. Validation cleans the review
/// fields, picks the strategy and media sub-forms the submission's kind
/// choices call for, and runs them all, collecting errors per section.
/// Saving replays the whole submission inside a single transaction.
pub struct ReviewFormGroup {
    registry: Arc<Registry>,
    principal: Principal,
    submission: ReviewSubmissionDto,
    instance: Option<Review>,
    outcome: Option<Validation>,
}

impl ReviewFormGroup {
    /// Binds a submission for validation and saving
    ///
    /// ### Arguments
    ///
    /// * `registry` - The resolved engine registry
    /// * `submission` - The raw submission payload
    /// * `instance` - The review being edited, or `None` when creating
    /// * `principal` - The caller the saved review will belong to
    pub fn bind(
        registry: Arc<Registry>,
        submission: ReviewSubmissionDto,
        instance: Option<Review>,
        principal: Principal,
    ) -> Self {
        ReviewFormGroup {
            registry,
            principal,
            submission,
            instance,
            outcome: None,
        }
    }

    /// Runs every section's validation, memoizing the result
    ///
    /// ### Returns
    ///
    /// Whether the submission is clean; field problems are reported
    /// through [`Self::errors`], while the error branch carries database
    /// failures only
    pub fn is_valid(&mut self, conn: &mut SqliteConnection) -> Result<bool, EngineError> {
        self.ensure_validated(conn)?;
        Ok(self
            .outcome
            .as_ref()
            .map_or(false, |validation| validation.errors.is_empty()))
    }

    /// Gets the per-section field errors found by validation
    ///
    /// Empty until [`Self::is_valid`] has run.
    pub fn errors(&self) -> GroupErrors {
        self.outcome
            .as_ref()
            .map(|validation| validation.errors.clone())
            .unwrap_or_default()
    }

    /// Gets the strategy sub-form selected by the submission's kind choice
    pub fn selected_strategy_form(&self) -> Option<&StrategyForm> {
        self.outcome
            .as_ref()
            .and_then(|validation| validation.strategy_form.as_ref())
    }

    /// Gets the media sub-form selected by the submission, when it asked
    /// to create new media
    pub fn selected_media_form(&self) -> Option<&MediaForm> {
        self.outcome
            .as_ref()
            .and_then(|validation| validation.media_form.as_ref())
    }

    fn ensure_validated(&mut self, conn: &mut SqliteConnection) -> Result<(), EngineError> {
        if self.outcome.is_none() {
            let validation = validate(
                &self.registry,
                &self.principal,
                &self.submission,
                self.instance.as_ref(),
                conn,
            )?;
            debug!("Review form group validated: {}", validation.errors);
            self.outcome = Some(validation);
        }
        Ok(())
    }

    /// Saves the whole submission in one transaction
    ///
    /// The transaction enforces quotas first, then persists media, then
    /// the rating, and finally the review row itself, so a failure at any
    /// step leaves no partial rows behind. Editing a review onto a new
    /// strategy kind deletes the rating row the old kind left behind.
    ///
    /// ### Returns
    ///
    /// The saved review; an invalid submission comes back as a validation
    /// error carrying the per-section field problems
    pub fn save(&mut self, conn: &mut SqliteConnection) -> Result<Review, EngineError> {
        self.ensure_validated(conn)?;

        let validation = match &self.outcome {
            Some(validation) if validation.errors.is_empty() => validation,
            Some(validation) => return Err(EngineError::Validation(validation.errors.clone())),
            None => {
                return Err(EngineError::Infrastructure(anyhow::anyhow!(
                    "review form group saved before validation"
                )))
            }
        };

        let creating = self.instance.is_none();
        let cleaned = &validation.cleaned;

        conn.transaction::<Review, EngineError, _>(|conn| {
            if let Some(user_id) = &self.principal.user_id {
                if creating {
                    quota::check_review_quota(conn, user_id)?;
                }
                if validation.disposition == Some(MediaDisposition::CreateNew) {
                    quota::check_media_quota(conn, user_id)?;
                }
            }

            let mut review = match &self.instance {
                Some(instance) => instance.clone(),
                None => Review::new(self.principal.user_id.clone()),
            };

            match (cleaned.media_kind, validation.disposition) {
                (Some(kind), Some(MediaDisposition::CreateNew)) => {
                    let form = validation.media_form.as_ref().ok_or_else(|| {
                        EngineError::Infrastructure(anyhow::anyhow!(
                            "validated group is missing its media form"
                        ))
                    })?;
                    let media_id = form.save(conn, self.principal.user_id.as_deref())?;
                    review.set_media(self.registry.media_kind_id(kind)?, media_id);
                }
                (Some(kind), Some(MediaDisposition::SelectExisting)) => {
                    let media_ref = cleaned.media_ref.clone().ok_or_else(|| {
                        EngineError::Infrastructure(anyhow::anyhow!(
                            "validated group is missing its media reference"
                        ))
                    })?;
                    review.set_media(self.registry.media_kind_id(kind)?, media_ref);
                }
                _ => review.clear_media(),
            }

            let strategy_form = validation.strategy_form.as_ref().ok_or_else(|| {
                EngineError::Infrastructure(anyhow::anyhow!(
                    "validated group is missing its strategy form"
                ))
            })?;
            let new_kind_id = self.registry.strategy_kind_id(strategy_form.kind())?;

            // A kind change strands the old rating row; drop it before the
            // review stops referencing it
            if let (Some(old_kind_id), Some(old_ref)) =
                (review.get_strategy_kind(), review.get_strategy_ref())
            {
                if old_kind_id != new_kind_id {
                    let old_kind = self.registry.strategy_kind_from_id(old_kind_id)?;
                    repo::delete_rating(conn, old_kind, &old_ref)?;
                }
            }

            let rating_id = strategy_form.save(conn)?;
            review.set_strategy(new_kind_id, rating_id);

            review.set_completed_at(
                cleaned.completed_at_day,
                cleaned.completed_at_month,
                cleaned.completed_at_year,
            );
            review.set_text(cleaned.text.clone());

            if creating {
                repo::insert_review(conn, &review)?;
            } else {
                review.refresh_updated_at();
                repo::update_review(conn, &review)?;
            }

            Ok(review)
        })
    }
}

fn validate(
    registry: &Registry,
    principal: &Principal,
    submission: &ReviewSubmissionDto,
    instance: Option<&Review>,
    conn: &mut SqliteConnection,
) -> Result<Validation, EngineError> {
    let mut errors = GroupErrors::default();

    let cleaned = clean_review(registry, &submission.review, instance, &mut errors.review);

    let mut disposition = clean_disposition(submission.create_new_media.as_ref(), &mut errors.management);
    if cleaned.media_kind.is_some() && disposition.is_none() && errors.management.is_empty() {
        // An edit that carried the instance's media reference keeps
        // selecting it; anything else must say what to do with the media
        let carried = instance.map_or(false, |review| {
            cleaned.media_ref.is_some() && cleaned.media_ref == review.get_media_ref()
        });
        if carried {
            disposition = Some(MediaDisposition::SelectExisting);
        } else {
            errors.management.add("create_new_media", fields::REQUIRED);
        }
    }

    let mut strategy_form = None;
    if let Some(kind) = cleaned.strategy_kind {
        let kind_id = registry.strategy_kind_id(kind)?;
        let existing = instance.and_then(|review| {
            if review.get_strategy_kind() == Some(kind_id) {
                review.get_strategy_ref()
            } else {
                None
            }
        });
        strategy_form = StrategyForm::clean(
            kind,
            submission.strategy.get(&kind_id),
            existing,
            &mut errors.strategy,
        );
    }

    let mut media_form = None;
    match (cleaned.media_kind, disposition) {
        (Some(kind), Some(MediaDisposition::CreateNew)) => {
            let kind_id = registry.media_kind_id(kind)?;
            media_form = MediaForm::clean(
                conn,
                kind,
                submission.media.get(&kind_id),
                &mut errors.media,
            )?;
        }
        (Some(kind), Some(MediaDisposition::SelectExisting)) => match &cleaned.media_ref {
            Some(media_ref) => {
                let visible = repo::find_media(conn, kind, media_ref)?
                    .map(|record| may(principal, &record, Action::View))
                    .unwrap_or(false);
                if !visible {
                    errors
                        .review
                        .add("media_ref", fields::invalid_model_choice());
                }
            }
            None => errors.review.add("media_ref", fields::REQUIRED),
        },
        _ => {}
    }

    Ok(Validation {
        cleaned,
        disposition,
        strategy_form,
        media_form,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MediaKind, StrategyKind};
    use crate::test_utils::{setup_engine, submission};
    use serde_json::json;

    #[test]
    fn test_create_review_with_new_book() {
        let (pool, registry) = setup_engine();
        let conn = &mut pool.get().unwrap();
        let goodreads = registry.strategy_kind_id(StrategyKind::Goodreads).unwrap();
        let book = registry.media_kind_id(MediaKind::Book).unwrap();

        let payload = submission(json!({
            "review": {
                "completed_at_year": 2024,
                "text": "Gripping.",
                "strategy_kind": goodreads,
                "media_kind": book,
            },
            "create_new_media": "CREATE_NEW",
            "strategy": {goodreads.to_string(): {"stars": 4}},
            "media": {book.to_string(): {"title": "Annihilation", "author": "Jeff VanderMeer"}},
        }));

        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            payload,
            None,
            Principal::user("reader-1"),
        );

        assert!(group.is_valid(conn).unwrap());
        let review = group.save(conn).unwrap();

        assert_eq!(review.get_owner_id(), Some(String::from("reader-1")));
        assert_eq!(review.get_strategy_kind(), Some(goodreads));
        assert_eq!(review.get_media_kind(), Some(book));
        assert!(!review.get_validated());

        let media_ref = review.get_media_ref().unwrap();
        let record = repo::find_media(conn, MediaKind::Book, &media_ref)
            .unwrap()
            .unwrap();
        assert_eq!(record.title(), "Annihilation");
        assert_eq!(record.owner(), Some(String::from("reader-1")));
    }

    #[test]
    fn test_invalid_submission_reports_sections_and_saves_nothing() {
        let (pool, registry) = setup_engine();
        let conn = &mut pool.get().unwrap();
        let goodreads = registry.strategy_kind_id(StrategyKind::Goodreads).unwrap();

        let payload = submission(json!({
            "review": {"strategy_kind": goodreads, "completed_at_day": 3},
            "strategy": {goodreads.to_string(): {"stars": 9}},
        }));

        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            payload,
            None,
            Principal::user("reader-1"),
        );

        assert!(!group.is_valid(conn).unwrap());
        let errors = group.errors();
        assert!(!errors.review.is_empty());
        assert!(!errors.strategy.is_empty());

        let saved = group.save(conn);
        assert!(matches!(saved, Err(EngineError::Validation(_))));

        use crate::schema::reviews::dsl::*;
        let count: i64 = reviews.count().get_result(conn).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_changing_strategy_kind_replaces_the_rating_row() {
        let (pool, registry) = setup_engine();
        let conn = &mut pool.get().unwrap();
        let goodreads = registry.strategy_kind_id(StrategyKind::Goodreads).unwrap();
        let thumbs = registry.strategy_kind_id(StrategyKind::Thumbs).unwrap();

        let create = submission(json!({
            "review": {"text": "First pass.", "strategy_kind": goodreads},
            "strategy": {goodreads.to_string(): {"stars": 3}},
        }));
        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            create,
            None,
            Principal::user("reader-1"),
        );
        assert!(group.is_valid(conn).unwrap());
        let review = group.save(conn).unwrap();
        let old_rating = review.get_strategy_ref().unwrap();

        let update = submission(json!({
            "review": {"text": "Changed my mind.", "strategy_kind": thumbs},
            "strategy": {thumbs.to_string(): {"recommended": true}},
        }));
        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            update,
            Some(review.clone()),
            Principal::user("reader-1"),
        );
        assert!(group.is_valid(conn).unwrap());
        let updated = group.save(conn).unwrap();

        assert_eq!(updated.get_id(), review.get_id());
        assert_eq!(updated.get_strategy_kind(), Some(thumbs));
        assert_ne!(updated.get_strategy_ref(), Some(old_rating.clone()));
        assert_eq!(updated.get_created_at(), review.get_created_at());

        use crate::schema::goodreads_ratings::dsl::*;
        let leftovers: i64 = goodreads_ratings
            .filter(id.eq(&old_rating))
            .count()
            .get_result(conn)
            .unwrap();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_keeping_the_strategy_kind_updates_in_place() {
        let (pool, registry) = setup_engine();
        let conn = &mut pool.get().unwrap();
        let imdb = registry.strategy_kind_id(StrategyKind::Imdb).unwrap();

        let create = submission(json!({
            "review": {"text": "Solid.", "strategy_kind": imdb},
            "strategy": {imdb.to_string(): {"score": 6}},
        }));
        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            create,
            None,
            Principal::user("reader-1"),
        );
        assert!(group.is_valid(conn).unwrap());
        let review = group.save(conn).unwrap();
        let rating_ref = review.get_strategy_ref().unwrap();

        let update = submission(json!({
            "review": {"text": "Better on rewatch.", "strategy_kind": imdb},
            "strategy": {imdb.to_string(): {"score": 8}},
        }));
        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            update,
            Some(review),
            Principal::user("reader-1"),
        );
        assert!(group.is_valid(conn).unwrap());
        let updated = group.save(conn).unwrap();

        assert_eq!(updated.get_strategy_ref(), Some(rating_ref.clone()));

        use crate::schema::imdb_ratings::dsl::*;
        let stored: crate::models::ImdbRating = imdb_ratings
            .filter(id.eq(&rating_ref))
            .first(conn)
            .unwrap();
        assert_eq!(stored.get_score(), 8);
    }

    #[test]
    fn test_update_without_media_section_keeps_the_media() {
        let (pool, registry) = setup_engine();
        let conn = &mut pool.get().unwrap();
        let thumbs = registry.strategy_kind_id(StrategyKind::Thumbs).unwrap();
        let book = registry.media_kind_id(MediaKind::Book).unwrap();

        let create = submission(json!({
            "review": {
                "text": "First impressions.",
                "strategy_kind": thumbs,
                "media_kind": book,
            },
            "create_new_media": "CREATE_NEW",
            "strategy": {thumbs.to_string(): {"recommended": true}},
            "media": {book.to_string(): {"title": "The Overstory", "author": "Richard Powers"}},
        }));
        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            create,
            None,
            Principal::user("reader-1"),
        );
        assert!(group.is_valid(conn).unwrap());
        let review = group.save(conn).unwrap();
        assert!(review.get_media_ref().is_some());

        // An edit touching only the rating leaves the media reference alone
        let update = submission(json!({
            "review": {"text": "Still holds up.", "strategy_kind": thumbs},
            "strategy": {thumbs.to_string(): {"recommended": false}},
        }));
        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            update,
            Some(review.clone()),
            Principal::user("reader-1"),
        );
        assert!(group.is_valid(conn).unwrap());
        let updated = group.save(conn).unwrap();

        assert_eq!(updated.get_media_kind(), review.get_media_kind());
        assert_eq!(updated.get_media_ref(), review.get_media_ref());
        assert_eq!(updated.get_text(), "Still holds up.");
    }

    #[test]
    fn test_update_without_strategy_kind_keeps_the_kind() {
        let (pool, registry) = setup_engine();
        let conn = &mut pool.get().unwrap();
        let imdb = registry.strategy_kind_id(StrategyKind::Imdb).unwrap();

        let create = submission(json!({
            "review": {"text": "A six.", "strategy_kind": imdb},
            "strategy": {imdb.to_string(): {"score": 6}},
        }));
        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            create,
            None,
            Principal::user("reader-1"),
        );
        assert!(group.is_valid(conn).unwrap());
        let review = group.save(conn).unwrap();
        let rating_ref = review.get_strategy_ref().unwrap();

        // The kind resolves from the instance when the payload omits it
        let update = submission(json!({
            "review": {"text": "A nine, actually."},
            "strategy": {imdb.to_string(): {"score": 9}},
        }));
        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            update,
            Some(review),
            Principal::user("reader-1"),
        );
        assert!(group.is_valid(conn).unwrap());
        let updated = group.save(conn).unwrap();

        assert_eq!(updated.get_strategy_kind(), Some(imdb));
        assert_eq!(updated.get_strategy_ref(), Some(rating_ref.clone()));

        use crate::schema::imdb_ratings::dsl::*;
        let stored: crate::models::ImdbRating = imdb_ratings
            .filter(id.eq(&rating_ref))
            .first(conn)
            .unwrap();
        assert_eq!(stored.get_score(), 9);
    }

    #[test]
    fn test_selecting_foreign_private_media_is_invalid() {
        let (pool, registry) = setup_engine();
        let conn = &mut pool.get().unwrap();
        let thumbs = registry.strategy_kind_id(StrategyKind::Thumbs).unwrap();
        let book = registry.media_kind_id(MediaKind::Book).unwrap();

        let foreign = crate::models::Book::new(
            String::from("Private Notes"),
            String::from("Someone Else"),
            None,
            None,
            Some(String::from("other-user")),
        );
        repo::insert_book(conn, &foreign).unwrap();

        let payload = submission(json!({
            "review": {
                "strategy_kind": thumbs,
                "media_kind": book,
                "media_ref": foreign.get_id(),
            },
            "create_new_media": "SELECT_EXISTING",
            "strategy": {thumbs.to_string(): {"recommended": false}},
        }));

        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            payload,
            None,
            Principal::user("reader-1"),
        );

        assert!(!group.is_valid(conn).unwrap());
        assert_eq!(
            group.errors().review.get("media_ref").unwrap()[0],
            fields::invalid_model_choice()
        );
    }

    #[test]
    fn test_media_kind_without_disposition_is_invalid() {
        let (pool, registry) = setup_engine();
        let conn = &mut pool.get().unwrap();
        let thumbs = registry.strategy_kind_id(StrategyKind::Thumbs).unwrap();
        let film = registry.media_kind_id(MediaKind::Film).unwrap();

        let payload = submission(json!({
            "review": {"strategy_kind": thumbs, "media_kind": film},
            "strategy": {thumbs.to_string(): {"recommended": true}},
        }));

        let mut group = ReviewFormGroup::bind(
            registry.clone(),
            payload,
            None,
            Principal::user("reader-1"),
        );

        assert!(!group.is_valid(conn).unwrap());
        assert_eq!(
            group.errors().management.get("create_new_media").unwrap()[0],
            fields::REQUIRED
        );
    }

    #[test]
    fn test_review_quota_blocks_the_whole_save() {
        let (pool, registry) = setup_engine();
        let conn = &mut pool.get().unwrap();
        let thumbs = registry.strategy_kind_id(StrategyKind::Thumbs).unwrap();

        let mut settings = repo::get_or_create_settings(conn, "reader-1").unwrap();
        settings.set_review_limit(Some(0));
        repo::update_settings(conn, &settings).unwrap();

        // The first review is still allowed at the boundary
        let first = submission(json!({
            "review": {"text": "One.", "strategy_kind": thumbs},
            "strategy": {thumbs.to_string(): {"recommended": true}},
        }));
        let mut group =
            ReviewFormGroup::bind(registry.clone(), first, None, Principal::user("reader-1"));
        assert!(group.is_valid(conn).unwrap());
        group.save(conn).unwrap();

        let second = submission(json!({
            "review": {"text": "Two.", "strategy_kind": thumbs},
            "strategy": {thumbs.to_string(): {"recommended": false}},
        }));
        let mut group =
            ReviewFormGroup::bind(registry.clone(), second, None, Principal::user("reader-1"));
        assert!(group.is_valid(conn).unwrap());
        let outcome = group.save(conn);
        assert!(matches!(outcome, Err(EngineError::QuotaExceeded(_))));

        use crate::schema::thumb_ratings::dsl::*;
        let ratings: i64 = thumb_ratings.count().get_result(conn).unwrap();
        assert_eq!(ratings, 1);
    }
}
