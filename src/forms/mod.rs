/// Validation forms module
///
/// This module contains the form layer that stands between raw submission
/// payloads and the database models. Submissions are cleaned field by
/// field: every field collects its own error messages, and
/// the form group composes the review, management, strategy and media
/// sections into one validate-then-save unit.

pub mod fields;
pub mod management;
pub mod media;
pub mod partial_date;
pub mod review_form;
pub mod strategy;

mod group;

pub use fields::FieldErrors;
pub use group::{GroupErrors, ReviewFormGroup};
pub use media::MediaForm;
pub use strategy::StrategyForm;
