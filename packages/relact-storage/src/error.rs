#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read dataset at {path:?}.")]
	ReadDataset { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse dataset at {path:?}.")]
	ParseDataset { path: std::path::PathBuf, source: serde_json::Error },
	#[error(transparent)]
	InvalidQuery(#[from] relact_domain::QueryError),
	#[error("Condition references unknown alias '{0}'.")]
	UnknownAlias(String),
	#[error("Entity '{entity}' has no declared hierarchy.")]
	MissingHierarchy { entity: String },
	#[error("Under on {entity}.{attribute} must target the hierarchy id attribute.")]
	HierarchyMismatch { entity: String, attribute: String },
}
