use serde_json::Value;

use crate::dto::ReviewFieldsDto;
use crate::forms::fields::{self, FieldErrors};
use crate::forms::partial_date;
use crate::models::Review;
use crate::registry::{MediaKind, Registry, StrategyKind};

/// The review fields after coercion and choice validation
///
/// A kind field holds `None` when the submitted value was missing or not
/// an enabled choice; the corresponding error has then been recorded, and
/// the group skips the sub-form it could not select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedReview {
    pub completed_at_day: Option<i32>,
    pub completed_at_month: Option<i32>,
    pub completed_at_year: Option<i32>,
    pub text: String,
    pub strategy_kind: Option<StrategyKind>,
    pub media_kind: Option<MediaKind>,
    pub media_ref: Option<String>,
}

fn clean_date_part(
    value: Option<&Value>,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<Option<i32>> {
    match fields::optional_int(value) {
        Ok(part) => Some(part),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

/// Parses a kind id token against one of the registry's enabled sets
fn clean_kind_choice<K: Copy>(
    value: Option<&Value>,
    field: &'static str,
    lookup: impl Fn(i32) -> Option<K>,
    errors: &mut FieldErrors,
) -> Option<K> {
    let token = fields::choice_token(value)?;
    match token.parse::<i32>().ok().and_then(lookup) {
        Some(kind) => Some(kind),
        None => {
            errors.add(field, fields::invalid_choice(&token));
            None
        }
    }
}

/// Cleans the review section of a submission
///
/// Every field is coerced independently so that one bad field does not
/// hide problems with the others. The approximate-date combination rules
/// only run once all three parts coerced cleanly.
///
/// On an edit, kind choices and the media reference resolve from the
/// payload or, when the payload leaves them out, from the review being
/// edited; an omitted field keeps what the instance already had.
pub fn clean_review(
    registry: &Registry,
    dto: &ReviewFieldsDto,
    instance: Option<&Review>,
    errors: &mut FieldErrors,
) -> CleanedReview {
    let day = clean_date_part(dto.completed_at_day.as_ref(), "completed_at_day", errors);
    let month = clean_date_part(dto.completed_at_month.as_ref(), "completed_at_month", errors);
    let year = clean_date_part(dto.completed_at_year.as_ref(), "completed_at_year", errors);

    if let (Some(day), Some(month), Some(year)) = (day, month, year) {
        if let Err((field, message)) = partial_date::validate_parts(day, month, year) {
            errors.add(field, message);
        }
    }

    let text = match fields::optional_string(dto.text.as_ref()) {
        Ok(text) => text.unwrap_or_default(),
        Err(message) => {
            errors.add("text", message);
            String::new()
        }
    };

    let mut strategy_kind = clean_kind_choice(
        dto.strategy_kind.as_ref(),
        "strategy_kind",
        |kind_id| registry.strategy_kind_from_id(kind_id).ok(),
        errors,
    );
    if strategy_kind.is_none() && errors.get("strategy_kind").is_none() {
        strategy_kind = instance
            .and_then(|review| review.get_strategy_kind())
            .and_then(|kind_id| registry.strategy_kind_from_id(kind_id).ok());
        if strategy_kind.is_none() {
            errors.add("strategy_kind", fields::REQUIRED);
        }
    }

    let mut media_kind = clean_kind_choice(
        dto.media_kind.as_ref(),
        "media_kind",
        |kind_id| registry.media_kind_from_id(kind_id).ok(),
        errors,
    );

    let mut media_ref = match fields::optional_string(dto.media_ref.as_ref()) {
        Ok(media_ref) => media_ref,
        Err(message) => {
            errors.add("media_ref", message);
            None
        }
    };

    let instance_media_kind = instance
        .and_then(|review| review.get_media_kind())
        .and_then(|kind_id| registry.media_kind_from_id(kind_id).ok());
    if media_kind.is_none() && errors.get("media_kind").is_none() {
        media_kind = instance_media_kind;
    }
    // The reference carries over only while the kind stays what it was;
    // a kind change invalidates the old reference
    if media_ref.is_none() && media_kind.is_some() && media_kind == instance_media_kind {
        media_ref = instance.and_then(|review| review.get_media_ref());
    }

    // A media reference is meaningless without a media kind to look it up in
    if media_ref.is_some() && media_kind.is_none() && errors.get("media_kind").is_none() {
        errors.add("media_kind", fields::REQUIRED);
    }

    CleanedReview {
        completed_at_day: day.flatten(),
        completed_at_month: month.flatten(),
        completed_at_year: year.flatten(),
        text,
        strategy_kind,
        media_kind,
        media_ref,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use serde_json::json;

    fn registry() -> Registry {
        let pool = setup_test_db();
        let mut conn = pool.get().unwrap();
        Registry::ready_named(&mut conn, "default").unwrap()
    }

    fn dto(value: Value) -> ReviewFieldsDto {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_clean_review_with_full_fields() {
        let registry = registry();
        let thumbs_id = registry.strategy_kind_id(StrategyKind::Thumbs).unwrap();
        let book_id = registry.media_kind_id(MediaKind::Book).unwrap();

        let mut errors = FieldErrors::new();
        let cleaned = clean_review(
            &registry,
            &dto(json!({
                "completed_at_day": 14,
                "completed_at_month": "7",
                "completed_at_year": 2024,
                "text": "  A fine read.  ",
                "strategy_kind": thumbs_id,
                "media_kind": book_id,
                "media_ref": "some-book",
            })),
            None,
            &mut errors,
        );

        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(cleaned.completed_at_day, Some(14));
        assert_eq!(cleaned.completed_at_month, Some(7));
        assert_eq!(cleaned.completed_at_year, Some(2024));
        assert_eq!(cleaned.text, "A fine read.");
        assert_eq!(cleaned.strategy_kind, Some(StrategyKind::Thumbs));
        assert_eq!(cleaned.media_kind, Some(MediaKind::Book));
        assert_eq!(cleaned.media_ref, Some(String::from("some-book")));
    }

    #[test]
    fn test_strategy_kind_is_required() {
        let registry = registry();

        let mut errors = FieldErrors::new();
        let cleaned = clean_review(&registry, &dto(json!({})), None, &mut errors);

        assert!(cleaned.strategy_kind.is_none());
        assert_eq!(errors.get("strategy_kind").unwrap()[0], fields::REQUIRED);
    }

    #[test]
    fn test_unregistered_kind_id_is_an_invalid_choice() {
        let registry = registry();

        let mut errors = FieldErrors::new();
        let cleaned = clean_review(
            &registry,
            &dto(json!({"strategy_kind": 999, "media_kind": "bogus"})),
            None,
            &mut errors,
        );

        assert!(cleaned.strategy_kind.is_none());
        assert!(cleaned.media_kind.is_none());
        assert_eq!(
            errors.get("strategy_kind").unwrap()[0],
            fields::invalid_choice("999")
        );
        assert_eq!(
            errors.get("media_kind").unwrap()[0],
            fields::invalid_choice("bogus")
        );
    }

    #[test]
    fn test_date_combination_rules_run_after_coercion() {
        let registry = registry();
        let thumbs_id = registry.strategy_kind_id(StrategyKind::Thumbs).unwrap();

        let mut errors = FieldErrors::new();
        clean_review(
            &registry,
            &dto(json!({"completed_at_day": 12, "strategy_kind": thumbs_id})),
            None,
            &mut errors,
        );
        assert_eq!(
            errors.get("completed_at_day").unwrap()[0],
            partial_date::DAY_WITHOUT_MONTH_AND_YEAR
        );

        // A coercion failure on one part suppresses the combination check
        let mut errors = FieldErrors::new();
        clean_review(
            &registry,
            &dto(json!({
                "completed_at_day": 12,
                "completed_at_month": "not a month",
                "strategy_kind": thumbs_id,
            })),
            None,
            &mut errors,
        );
        assert_eq!(
            errors.get("completed_at_month").unwrap()[0],
            fields::INVALID_INTEGER
        );
        assert!(errors.get("completed_at_day").is_none());
    }

    #[test]
    fn test_media_ref_requires_media_kind() {
        let registry = registry();
        let thumbs_id = registry.strategy_kind_id(StrategyKind::Thumbs).unwrap();

        let mut errors = FieldErrors::new();
        let cleaned = clean_review(
            &registry,
            &dto(json!({"strategy_kind": thumbs_id, "media_ref": "orphan"})),
            None,
            &mut errors,
        );

        assert_eq!(cleaned.media_ref, Some(String::from("orphan")));
        assert_eq!(errors.get("media_kind").unwrap()[0], fields::REQUIRED);
    }

    fn instance_with_references(registry: &Registry) -> Review {
        let mut review = Review::new(None);
        review.set_strategy(
            registry.strategy_kind_id(StrategyKind::Imdb).unwrap(),
            String::from("rating-1"),
        );
        review.set_media(
            registry.media_kind_id(MediaKind::Book).unwrap(),
            String::from("book-1"),
        );
        review
    }

    #[test]
    fn test_edit_falls_back_to_the_instance_kinds() {
        let registry = registry();
        let instance = instance_with_references(&registry);

        let mut errors = FieldErrors::new();
        let cleaned = clean_review(
            &registry,
            &dto(json!({"text": "Edited."})),
            Some(&instance),
            &mut errors,
        );

        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(cleaned.strategy_kind, Some(StrategyKind::Imdb));
        assert_eq!(cleaned.media_kind, Some(MediaKind::Book));
        assert_eq!(cleaned.media_ref, Some(String::from("book-1")));
    }

    #[test]
    fn test_edit_payload_kinds_override_the_instance() {
        let registry = registry();
        let thumbs_id = registry.strategy_kind_id(StrategyKind::Thumbs).unwrap();
        let film_id = registry.media_kind_id(MediaKind::Film).unwrap();
        let instance = instance_with_references(&registry);

        let mut errors = FieldErrors::new();
        let cleaned = clean_review(
            &registry,
            &dto(json!({"strategy_kind": thumbs_id, "media_kind": film_id})),
            Some(&instance),
            &mut errors,
        );

        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(cleaned.strategy_kind, Some(StrategyKind::Thumbs));
        assert_eq!(cleaned.media_kind, Some(MediaKind::Film));

        // The old reference does not survive a kind change
        assert_eq!(cleaned.media_ref, None);
    }
}
