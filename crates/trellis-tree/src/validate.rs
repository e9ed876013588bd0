//! Validators
//!
//! Bounded value checks run in slot order during Process Validations. A
//! failure carries a message key and arguments for the application's
//! message bundle; the first failing validator stops the chain.

use trellis_el::Value;

/// A validator rejected the value
///
/// `message_key` selects the bundle template; `args` fill `{1}`, `{2}`, ...
/// (`{0}` is reserved for the field label).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorError {
    pub message_key: &'static str,
    pub args: Vec<String>,
}

impl ValidatorError {
    pub fn new(message_key: &'static str, args: Vec<String>) -> Self {
        Self { message_key, args }
    }
}

/// A bounded check on a converted submitted value
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), ValidatorError>;
}

/// String length bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl LengthValidator {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }
}

impl Validator for LengthValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidatorError> {
        let len = value.coerce_string().chars().count();

        if let Some(min) = self.min {
            if len < min {
                return Err(ValidatorError::new("length_min", vec![min.to_string()]));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                return Err(ValidatorError::new("length_max", vec![max.to_string()]));
            }
        }
        Ok(())
    }
}

/// Integer range bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeValidator {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl RangeValidator {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }
}

impl Validator for RangeValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidatorError> {
        let n = match value {
            Value::Int(i) => *i,
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidatorError::new("range_type", Vec::new()))?,
            _ => return Err(ValidatorError::new("range_type", Vec::new())),
        };

        if let Some(min) = self.min {
            if n < min {
                return Err(ValidatorError::new("range_min", vec![min.to_string()]));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                return Err(ValidatorError::new("range_max", vec![max.to_string()]));
            }
        }
        Ok(())
    }
}

/// Floating-point range bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRangeValidator {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl Validator for NumberRangeValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidatorError> {
        let n = match value {
            Value::Number(n) => *n,
            Value::Int(i) => *i as f64,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidatorError::new("range_type", Vec::new()))?,
            _ => return Err(ValidatorError::new("range_type", Vec::new())),
        };

        if let Some(min) = self.min {
            if n < min {
                return Err(ValidatorError::new("range_min", vec![min.to_string()]));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                return Err(ValidatorError::new("range_max", vec![max.to_string()]));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        let validator = LengthValidator::new(Some(3), Some(5));

        assert!(validator.validate(&Value::from("abc")).is_ok());
        assert_eq!(
            validator.validate(&Value::from("ab")).unwrap_err().message_key,
            "length_min"
        );
        assert_eq!(
            validator.validate(&Value::from("abcdef")).unwrap_err().message_key,
            "length_max"
        );
    }

    #[test]
    fn test_range_bounds() {
        let validator = RangeValidator::new(Some(1), Some(10));

        assert!(validator.validate(&Value::Int(5)).is_ok());
        assert!(validator.validate(&Value::from("7")).is_ok());
        assert_eq!(
            validator.validate(&Value::Int(0)).unwrap_err().message_key,
            "range_min"
        );
        assert_eq!(
            validator.validate(&Value::from("eleven")).unwrap_err().message_key,
            "range_type"
        );
    }

    #[test]
    fn test_number_range_bounds() {
        let validator = NumberRangeValidator::new(Some(0.5), None);

        assert!(validator.validate(&Value::Number(0.75)).is_ok());
        assert_eq!(
            validator.validate(&Value::Number(0.25)).unwrap_err().message_key,
            "range_min"
        );
    }
}
