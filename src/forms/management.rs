use serde_json::Value;

use crate::forms::fields::{self, FieldErrors};

/// Choice token for reviewing a media item already in the catalogue
pub const SELECT_EXISTING: &str = "SELECT_EXISTING";

/// Choice token for creating the media item alongside the review
pub const CREATE_NEW: &str = "CREATE_NEW";

/// How the submission wants its media handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDisposition {
    SelectExisting,
    CreateNew,
}

/// Cleans the `create_new_media` management field
///
/// The field is optional here; the group makes it required once a media
/// kind is in play, since it then decides which media sub-form applies.
pub fn clean_disposition(value: Option<&Value>, errors: &mut FieldErrors) -> Option<MediaDisposition> {
    let token = fields::choice_token(value)?;
    match token.as_str() {
        SELECT_EXISTING => Some(MediaDisposition::SelectExisting),
        CREATE_NEW => Some(MediaDisposition::CreateNew),
        _ => {
            errors.add("create_new_media", fields::invalid_choice(&token));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_both_tokens_parse() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            clean_disposition(Some(&json!("SELECT_EXISTING")), &mut errors),
            Some(MediaDisposition::SelectExisting)
        );
        assert_eq!(
            clean_disposition(Some(&json!("CREATE_NEW")), &mut errors),
            Some(MediaDisposition::CreateNew)
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_and_empty_are_no_disposition() {
        let mut errors = FieldErrors::new();
        assert_eq!(clean_disposition(None, &mut errors), None);
        assert_eq!(clean_disposition(Some(&json!("")), &mut errors), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unknown_token_is_an_invalid_choice() {
        let mut errors = FieldErrors::new();
        assert_eq!(clean_disposition(Some(&json!("MAYBE")), &mut errors), None);
        assert_eq!(
            errors.get("create_new_media").unwrap()[0],
            fields::invalid_choice("MAYBE")
        );
    }
}
