use relact_domain::QueryError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Lookup failed: {message}")]
	Lookup { message: String },
	#[error(transparent)]
	Rewrite(#[from] RewriteError),
}

/// The query stopped looking like the detected trigger somewhere between detection and rewrite.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
	#[error("Root criteria must combine with AND to accept additional filters.")]
	DisjunctiveRoot,
	#[error("Condition at index {index} no longer matches the detected trigger.")]
	ShapeChanged { index: usize },
	#[error("Query already uses link alias '{alias}'.")]
	AliasConflict { alias: String },
	#[error(transparent)]
	InvalidCondition(#[from] QueryError),
}
