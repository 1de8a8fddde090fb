/// Errors from field configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("capacity must be between 1 and {max}, got {got}")]
    InvalidCapacity { got: usize, max: usize },
    #[error("attractor must be finite")]
    NonFiniteAttractor,
    #[error("rule parameter {name} must be {expected}, got {value}")]
    InvalidRuleParameter {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },
}
