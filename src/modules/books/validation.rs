//! Field-level validation for catalog input.

use std::ops::RangeInclusive;

use super::models::BookId;

pub const TEXT_LENGTH: RangeInclusive<usize> = 3..=100;
pub const RATING: RangeInclusive<i64> = 1..=5;
pub const PUBLISHED_YEAR: RangeInclusive<i64> = 1900..=2031;
/// Years accepted by the published-date filter, `(1900, 2031]`.
pub const PUBLISHED_YEAR_FILTER: RangeInclusive<i64> = 1901..=2031;

/// One failed constraint on one input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Collects violations across several checks.
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<FieldViolation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length is counted in characters, not bytes.
    pub fn text_length(
        &mut self,
        field: &'static str,
        value: &str,
        bounds: RangeInclusive<usize>,
    ) -> &mut Self {
        let length = value.chars().count();
        if !bounds.contains(&length) {
            self.violations.push(FieldViolation::new(
                field,
                format!(
                    "must be between {} and {} characters, got {}",
                    bounds.start(),
                    bounds.end(),
                    length
                ),
            ));
        }
        self
    }

    pub fn range(
        &mut self,
        field: &'static str,
        value: i64,
        bounds: RangeInclusive<i64>,
    ) -> &mut Self {
        if !bounds.contains(&value) {
            self.violations.push(FieldViolation::new(
                field,
                format!(
                    "must be between {} and {}, got {}",
                    bounds.start(),
                    bounds.end(),
                    value
                ),
            ));
        }
        self
    }

    pub fn positive_id(&mut self, field: &'static str, value: i64) -> Option<BookId> {
        match BookId::try_from(value) {
            Ok(id) if id > 0 => Some(id),
            _ => {
                self.violations.push(FieldViolation::new(
                    field,
                    format!("must be greater than 0, got {}", value),
                ));
                None
            }
        }
    }

    pub fn required(&mut self, field: &'static str) -> &mut Self {
        self.violations.push(FieldViolation::new(field, "field required"));
        self
    }

    pub fn finish(self) -> Result<(), Vec<FieldViolation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }
}

/// Check a single integer against `bounds`.
pub fn check_range(
    field: &'static str,
    value: i64,
    bounds: RangeInclusive<i64>,
) -> Result<i64, Vec<FieldViolation>> {
    let mut validator = Validator::new();
    validator.range(field, value, bounds);
    validator.finish().map(|()| value)
}
