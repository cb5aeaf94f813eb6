use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use relact_domain::{Query, Row};

pub const RETRIEVE: &str = "retrieve";
pub const RETRIEVE_MULTIPLE: &str = "retrieve-multiple";
pub const EXPORT_TO_EXCEL: &str = "export-to-excel";

pub const QUERY_PARAMETER: &str = "Query";
pub const ENTITY_COLLECTION_PARAMETER: &str = "BusinessEntityCollection";
pub const ENTITY_PARAMETER: &str = "BusinessEntity";

/// Where in the host's message pipeline a hook runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
	PreValidation,
	PreOperation,
	MainOperation,
	PostOperation,
}
impl Stage {
	pub fn code(&self) -> u32 {
		match self {
			Self::PreValidation => 10,
			Self::PreOperation => 20,
			Self::MainOperation => 30,
			Self::PostOperation => 40,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
	#[default]
	Synchronous,
	Asynchronous,
}

/// A named value the host passes in or expects back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum Parameter {
	Query(Query),
	Rows(Vec<Row>),
	Text(String),
}

/// What the host knows about the message a hook was invoked for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
	pub message: String,
	pub stage: Stage,
	#[serde(default)]
	pub mode: Mode,
	/// 1 for a top-level call; the host increments it for every nested call it makes.
	#[serde(default = "default_depth")]
	pub depth: u32,
	#[serde(default)]
	pub input: BTreeMap<String, Parameter>,
	#[serde(default)]
	pub output: Option<BTreeMap<String, Parameter>>,
	#[serde(default)]
	pub parent: Option<Box<ExecutionContext>>,
}
impl ExecutionContext {
	pub fn new(message: impl Into<String>, stage: Stage) -> Self {
		Self {
			message: message.into(),
			stage,
			mode: Mode::Synchronous,
			depth: default_depth(),
			input: BTreeMap::new(),
			output: None,
			parent: None,
		}
	}

	pub fn with_mode(mut self, mode: Mode) -> Self {
		self.mode = mode;

		self
	}

	pub fn with_depth(mut self, depth: u32) -> Self {
		self.depth = depth;

		self
	}

	pub fn with_input(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
		self.input.insert(name.into(), parameter);

		self
	}

	pub fn with_query(self, query: Query) -> Self {
		self.with_input(QUERY_PARAMETER, Parameter::Query(query))
	}

	pub fn with_output(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
		self.output.get_or_insert_with(BTreeMap::new).insert(name.into(), parameter);

		self
	}

	pub fn with_parent(mut self, parent: ExecutionContext) -> Self {
		self.parent = Some(Box::new(parent));

		self
	}

	pub fn query(&self) -> Option<&Query> {
		match self.input.get(QUERY_PARAMETER) {
			Some(Parameter::Query(query)) => Some(query),
			_ => None,
		}
	}

	pub fn parent_message(&self) -> Option<&str> {
		self.parent.as_deref().map(|parent| parent.message.as_str())
	}
}

fn default_depth() -> u32 {
	1
}
