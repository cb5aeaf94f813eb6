pub type Result<T, E = QueryError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
	#[error("Condition on {attribute} with operator {operator} expects {expected} value(s), got {actual}.")]
	InvalidArity { attribute: String, operator: &'static str, expected: &'static str, actual: usize },
	#[error("Value '{value}' is not a valid identifier.")]
	InvalidIdentifier { value: String },
}
