use chrono::NaiveDate;

/// Message for a day given without any month or year
pub const DAY_WITHOUT_MONTH_AND_YEAR: &str = "Can't input a day without month and year.";

/// Message for a month given without a year
pub const MONTH_WITHOUT_YEAR: &str = "Can't input a month without a year.";

/// Message for a day given with a year but no month
pub const DAY_WITHOUT_MONTH: &str = "Can't input a day without a month.";

/// Message for components that do not name a real calendar date
pub const INVALID_DATE: &str = "Invalid date.";

/// The field an approximate-date error is attached to
pub const DAY_FIELD: &str = "completed_at_day";
pub const MONTH_FIELD: &str = "completed_at_month";

fn real_date(year: i32, month: i32, day: i32) -> bool {
    match (u32::try_from(month), u32::try_from(day)) {
        (Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(year, month, day).is_some(),
        _ => false,
    }
}

/// Validates the three components of an approximate completion date
///
/// Precision may only be dropped from the small end: a bare year and a
/// year-month are fine, but a day must come with a month and a month with
/// a year. Fully-specified dates must exist on the calendar.
///
/// ### Arguments
///
/// * `day` - The day component, if given
/// * `month` - The month component, if given
/// * `year` - The year component, if given
///
/// ### Returns
///
/// `Ok(())` for an acceptable combination, or the field name and message
/// to attach
pub fn validate_parts(
    day: Option<i32>,
    month: Option<i32>,
    year: Option<i32>,
) -> Result<(), (&'static str, &'static str)> {
    match (day, month, year) {
        // No components, or a bare year
        (None, None, _) => Ok(()),
        (Some(_), None, None) => Err((DAY_FIELD, DAY_WITHOUT_MONTH_AND_YEAR)),
        (_, Some(_), None) => Err((MONTH_FIELD, MONTH_WITHOUT_YEAR)),
        (Some(_), None, Some(_)) => Err((DAY_FIELD, DAY_WITHOUT_MONTH)),
        (None, Some(month), Some(_)) => {
            if (1..=12).contains(&month) {
                Ok(())
            } else {
                Err((MONTH_FIELD, INVALID_DATE))
            }
        }
        (Some(day), Some(month), Some(year)) => {
            if real_date(year, month, day) {
                Ok(())
            } else {
                Err((DAY_FIELD, INVALID_DATE))
            }
        }
    }
}

/// Renders an approximate completion date for display
///
/// The rendering follows the stored precision: `"1999"`, `"Mar 1999"`, or
/// `"04 Mar 1999"`. This is a pure function of the three components; it
/// performs no validation, and combinations that cannot be rendered come
/// out as the empty string.
pub fn format_completed_at(day: Option<i32>, month: Option<i32>, year: Option<i32>) -> String {
    let Some(year) = year else {
        return String::new();
    };

    match (month, day) {
        (Some(month), Some(day)) => to_date(year, month, day)
            .map(|date| date.format("%d %b %Y").to_string())
            .unwrap_or_default(),
        (Some(month), None) => to_date(year, month, 1)
            .map(|date| date.format("%b %Y").to_string())
            .unwrap_or_default(),
        (None, _) => format!("{:04}", year),
    }
}

fn to_date(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    let month = u32::try_from(month).ok()?;
    let day = u32::try_from(day).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_year_only_are_valid() {
        assert!(validate_parts(None, None, None).is_ok());
        assert!(validate_parts(None, None, Some(1999)).is_ok());
    }

    #[test]
    fn test_day_alone_names_the_day_field() {
        assert_eq!(
            validate_parts(Some(2), None, None),
            Err((DAY_FIELD, DAY_WITHOUT_MONTH_AND_YEAR))
        );
    }

    #[test]
    fn test_month_without_year() {
        assert_eq!(
            validate_parts(None, Some(3), None),
            Err((MONTH_FIELD, MONTH_WITHOUT_YEAR))
        );
        // Day and month together still fail on the month when the year is
        // missing
        assert_eq!(
            validate_parts(Some(4), Some(3), None),
            Err((MONTH_FIELD, MONTH_WITHOUT_YEAR))
        );
    }

    #[test]
    fn test_day_with_year_but_no_month() {
        assert_eq!(
            validate_parts(Some(4), None, Some(1999)),
            Err((DAY_FIELD, DAY_WITHOUT_MONTH))
        );
    }

    #[test]
    fn test_month_and_year_range_checked() {
        assert!(validate_parts(None, Some(1), Some(1999)).is_ok());
        assert!(validate_parts(None, Some(12), Some(1999)).is_ok());
        assert_eq!(
            validate_parts(None, Some(13), Some(1999)),
            Err((MONTH_FIELD, INVALID_DATE))
        );
        assert_eq!(
            validate_parts(None, Some(0), Some(1999)),
            Err((MONTH_FIELD, INVALID_DATE))
        );
    }

    #[test]
    fn test_full_dates_must_exist() {
        assert!(validate_parts(Some(29), Some(2), Some(2000)).is_ok());
        assert_eq!(
            validate_parts(Some(29), Some(2), Some(2001)),
            Err((DAY_FIELD, INVALID_DATE))
        );
        assert_eq!(
            validate_parts(Some(31), Some(4), Some(1999)),
            Err((DAY_FIELD, INVALID_DATE))
        );
        assert_eq!(
            validate_parts(Some(0), Some(4), Some(1999)),
            Err((DAY_FIELD, INVALID_DATE))
        );
    }

    #[test]
    fn test_format_follows_precision() {
        assert_eq!(format_completed_at(None, None, None), "");
        assert_eq!(format_completed_at(None, None, Some(1999)), "1999");
        assert_eq!(format_completed_at(None, Some(3), Some(1999)), "Mar 1999");
        assert_eq!(
            format_completed_at(Some(4), Some(3), Some(1999)),
            "04 Mar 1999"
        );
    }

    #[test]
    fn test_format_pads_early_years() {
        assert_eq!(format_completed_at(None, None, Some(79)), "0079");
    }

    #[test]
    fn test_format_unrenderable_is_empty() {
        assert_eq!(format_completed_at(Some(31), Some(2), Some(1999)), "");
        assert_eq!(format_completed_at(None, Some(13), Some(1999)), "");
    }
}
