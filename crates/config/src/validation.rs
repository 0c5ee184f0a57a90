//! Section trait and value checks

pub use crate::error::ValidationError;

/// One table of `config.toml`
pub trait ConfigSection: Default {
    /// Reports every invalid value, not just the first
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Takes every value from `other`
    fn merge(&mut self, other: Self);

    /// Table name, used as the prefix of field paths
    fn section_name(&self) -> &'static str;
}

/// Checks shared by the sections
pub struct Validator;

impl Validator {
    /// Inclusive range check
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if (min..=max).contains(&value) {
            return Ok(());
        }
        Err(ValidationError::with_value(
            field,
            format!("must be between {} and {}", min, max),
            value,
        ))
    }

    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        match value.trim() {
            "" => Err(ValidationError::new(field, "must not be empty")),
            _ => Ok(()),
        }
    }

    pub fn one_of<T>(value: &T, allowed: &[T], field: &str) -> Result<(), ValidationError>
    where
        T: PartialEq + std::fmt::Display,
    {
        if allowed.contains(value) {
            return Ok(());
        }
        let choices: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        Err(ValidationError::with_value(
            field,
            format!("must be one of: {}", choices.join(", ")),
            value,
        ))
    }

    /// Keeps the failures, `Ok` when there are none
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
