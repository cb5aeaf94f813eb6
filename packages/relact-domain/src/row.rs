use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Identifier, Value};

/// One record returned by a store, keyed by attribute name. A missing attribute reads as null.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
	attributes: BTreeMap<String, Value>,
}
impl Row {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
		self.set(attribute, value);

		self
	}

	pub fn set(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
		self.attributes.insert(attribute.into(), value.into());
	}

	pub fn get(&self, attribute: &str) -> Option<&Value> {
		self.attributes.get(attribute)
	}

	pub fn text(&self, attribute: &str) -> Option<&str> {
		self.get(attribute).and_then(Value::as_text)
	}

	pub fn identifier(&self, attribute: &str) -> Option<Identifier> {
		self.get(attribute).and_then(Identifier::from_value)
	}

	pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.attributes.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Keeps only the named attributes; an empty column list keeps everything.
	pub fn project(&self, columns: &[String]) -> Self {
		if columns.is_empty() {
			return self.clone();
		}

		let attributes = self
			.attributes
			.iter()
			.filter(|(name, _)| columns.iter().any(|column| column == *name))
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect();

		Self { attributes }
	}
}
