use thiserror::Error;

/// Errors raised by the style model.
///
/// Validation and configuration failures are fail-fast: they indicate caller
/// bugs (an out-of-range zoom, a style combined before it was named) rather
/// than recoverable runtime conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// A style must carry a name before it can participate in a combine.
    #[error("style has no assigned name; assign a name before combining")]
    UnnamedStyle,
    /// Inheritance chain resolution revisited a style it had already seen.
    #[error("cyclic style inheritance detected at {name:?}")]
    CyclicInheritance { name: String },
    /// An `inherits` reference or lookup named a style that does not exist.
    #[error("unknown style {name:?}")]
    UnknownStyle { name: String },
    /// A field was assigned a value outside its documented range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}
