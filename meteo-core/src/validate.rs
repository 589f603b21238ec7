//! Parsing of user-entered coordinate text.

use regex::Regex;
use std::sync::LazyLock;

use crate::{
    error::ValidationError,
    model::{Coordinate, LATITUDE_LIMIT, LONGITUDE_LIMIT},
};

pub const MSG_EMPTY: &str = "Введите координаты";
pub const MSG_LATITUDE_FORMAT: &str = "Широта должна быть числом";
pub const MSG_LONGITUDE_FORMAT: &str = "Долгота должна быть числом";
pub const MSG_LATITUDE_RANGE: &str = "Широта должна быть в диапазоне от -90 до 90";
pub const MSG_LONGITUDE_RANGE: &str = "Долгота должна быть в диапазоне от -180 до 180";

/// Result of validating a latitude/longitude text pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Set only when `is_valid`.
    pub coordinates: Option<Coordinate>,
}

impl CoordinateValidation {
    fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            coordinates: None,
        }
    }

    pub fn into_result(self) -> Result<Coordinate, ValidationError> {
        match self.coordinates {
            Some(coordinates) if self.is_valid => Ok(coordinates),
            _ => Err(ValidationError {
                messages: self.errors,
            }),
        }
    }
}

/// Validate raw text input. Commas are accepted as decimal separators.
pub fn validate(raw_latitude: &str, raw_longitude: &str) -> CoordinateValidation {
    let latitude = raw_latitude.trim();
    let longitude = raw_longitude.trim();

    if latitude.is_empty() || longitude.is_empty() {
        return CoordinateValidation::invalid(vec![MSG_EMPTY.to_string()]);
    }

    let latitude = parse_decimal(&latitude.replace(',', "."));
    let longitude = parse_decimal(&longitude.replace(',', "."));

    let mut errors = Vec::new();

    if latitude.is_none() {
        errors.push(MSG_LATITUDE_FORMAT.to_string());
    }
    if longitude.is_none() {
        errors.push(MSG_LONGITUDE_FORMAT.to_string());
    }

    if latitude.is_some_and(|lat| !(-LATITUDE_LIMIT..=LATITUDE_LIMIT).contains(&lat)) {
        errors.push(MSG_LATITUDE_RANGE.to_string());
    }
    if longitude.is_some_and(|lon| !(-LONGITUDE_LIMIT..=LONGITUDE_LIMIT).contains(&lon)) {
        errors.push(MSG_LONGITUDE_RANGE.to_string());
    }

    let coordinates = match (latitude, longitude) {
        (Some(lat), Some(lon)) if errors.is_empty() => Coordinate::new(lat, lon),
        _ => None,
    };

    match coordinates {
        Some(coordinates) => CoordinateValidation {
            is_valid: true,
            errors,
            coordinates: Some(coordinates),
        },
        None => CoordinateValidation::invalid(errors),
    }
}

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("number pattern compiles"));

/// Plain decimals only: no exponent, no `+`, no bare `.5`.
fn parse_decimal(text: &str) -> Option<f64> {
    if !NUMBER.is_match(text) {
        return None;
    }

    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_yields_single_error() {
        for (lat, lon) in [("", "10"), ("10", "   "), ("", ""), (" \t", "abc")] {
            let result = validate(lat, lon);
            assert!(!result.is_valid);
            assert_eq!(result.errors, vec![MSG_EMPTY.to_string()]);
            assert_eq!(result.coordinates, None);
        }
    }

    #[test]
    fn accepts_period_and_comma_decimals() {
        let result = validate("55.7558", "37,6173");
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.coordinates,
            Some(Coordinate { latitude: 55.7558, longitude: 37.6173 })
        );

        let result = validate(" -33,8688 ", "151.2093");
        assert_eq!(
            result.coordinates,
            Some(Coordinate { latitude: -33.8688, longitude: 151.2093 })
        );
    }

    #[test]
    fn accepts_bounds_and_integers() {
        assert!(validate("90", "-180").is_valid);
        assert!(validate("-90", "180").is_valid);
        assert!(validate("0", "0").is_valid);
    }

    #[test]
    fn both_format_errors_are_reported() {
        let result = validate("north", "1e5");
        assert_eq!(
            result.errors,
            vec![MSG_LATITUDE_FORMAT.to_string(), MSG_LONGITUDE_FORMAT.to_string()]
        );
        assert_eq!(result.coordinates, None);
    }

    #[test]
    fn rejects_loose_number_forms() {
        for raw in ["+5", ".5", "5.", "-", "1.2.3", "1,2,3", "--1", "0x10", "NaN", "inf", "٣", "1 2"] {
            assert!(parse_decimal(&raw.replace(',', ".")).is_none(), "{raw} should be rejected");
        }
    }

    #[test]
    fn long_digit_runs_are_numbers() {
        let huge = "1".repeat(400);
        assert_eq!(validate(&huge, "0").errors, vec![MSG_LATITUDE_RANGE.to_string()]);
        assert_eq!(parse_decimal("-0.000"), Some(-0.0));
    }

    #[test]
    fn both_range_errors_are_reported() {
        let result = validate("91", "-180.5");
        assert_eq!(
            result.errors,
            vec![MSG_LATITUDE_RANGE.to_string(), MSG_LONGITUDE_RANGE.to_string()]
        );
        assert!(!result.is_valid);
    }

    #[test]
    fn format_and_range_errors_co_occur() {
        let result = validate("95", "abc");
        assert_eq!(
            result.errors,
            vec![MSG_LONGITUDE_FORMAT.to_string(), MSG_LATITUDE_RANGE.to_string()]
        );
        assert_eq!(result.coordinates, None);
    }

    #[test]
    fn into_result_carries_messages() {
        let err = validate("95", "abc").into_result().unwrap_err();
        assert_eq!(err.messages.len(), 2);

        let ok = validate("1", "2").into_result().expect("valid");
        assert_eq!(ok, Coordinate { latitude: 1.0, longitude: 2.0 });
    }
}
