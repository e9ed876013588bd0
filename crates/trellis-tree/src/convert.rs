//! Converters
//!
//! Submitted string to typed value and back. A converter registered on a
//! component overrides default stringification during rendering, except
//! when a submitted value is being re-displayed verbatim.

use trellis_el::Value;

/// Conversion failure: the raw string and the target type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert '{raw}' to {target}")]
pub struct ConvertError {
    pub raw: String,
    pub target: &'static str,
}

impl ConvertError {
    fn new(raw: &str, target: &'static str) -> Self {
        Self { raw: raw.to_string(), target }
    }
}

/// Two-way conversion between submitted strings and typed values
pub trait Converter: Send + Sync {
    /// Convert a submitted string into a typed value
    fn to_value(&self, raw: &str) -> Result<Value, ConvertError>;

    /// Convert a value into its display string
    fn to_string(&self, value: &Value) -> String {
        value.coerce_string()
    }
}

/// Integer converter
#[derive(Debug, Clone, Copy, Default)]
pub struct IntConverter;

impl Converter for IntConverter {
    fn to_value(&self, raw: &str) -> Result<Value, ConvertError> {
        raw.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ConvertError::new(raw, "integer"))
    }
}

/// Floating-point converter
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl Converter for NumberConverter {
    fn to_value(&self, raw: &str) -> Result<Value, ConvertError> {
        raw.trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| ConvertError::new(raw, "number"))
    }
}

/// Boolean converter
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl Converter for BoolConverter {
    fn to_value(&self, raw: &str) -> Result<Value, ConvertError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" => Ok(Value::Bool(true)),
            "false" | "off" | "no" => Ok(Value::Bool(false)),
            _ => Err(ConvertError::new(raw, "boolean")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_converter() {
        assert_eq!(IntConverter.to_value("42").unwrap(), Value::Int(42));
        assert_eq!(IntConverter.to_value(" 7 ").unwrap(), Value::Int(7));
        assert!(IntConverter.to_value("forty-two").is_err());
    }

    #[test]
    fn test_number_converter() {
        assert_eq!(NumberConverter.to_value("2.5").unwrap(), Value::Number(2.5));
        assert!(NumberConverter.to_value("").is_err());
    }

    #[test]
    fn test_bool_converter() {
        assert_eq!(BoolConverter.to_value("on").unwrap(), Value::Bool(true));
        assert_eq!(BoolConverter.to_value("NO").unwrap(), Value::Bool(false));
        assert!(BoolConverter.to_value("maybe").is_err());
    }

    #[test]
    fn test_display_conversion() {
        assert_eq!(IntConverter.to_string(&Value::Int(42)), "42");
    }
}
