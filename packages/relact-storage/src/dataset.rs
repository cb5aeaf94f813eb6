use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use relact_domain::Row;

use crate::{Error, Result};

/// Parent pointer declaration used to answer `Under` conditions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
	pub id_attribute: String,
	pub parent_attribute: String,
}

/// Tables of rows keyed by entity name. A missing table reads as empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
	#[serde(default)]
	pub tables: BTreeMap<String, Vec<Row>>,
	#[serde(default)]
	pub hierarchies: BTreeMap<String, Hierarchy>,
}
impl Dataset {
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadDataset { path: path.to_path_buf(), source: err })?;

		serde_json::from_str(&raw)
			.map_err(|err| Error::ParseDataset { path: path.to_path_buf(), source: err })
	}

	pub fn insert(&mut self, entity: impl Into<String>, row: Row) {
		self.tables.entry(entity.into()).or_default().push(row);
	}

	pub fn declare_hierarchy(
		&mut self,
		entity: impl Into<String>,
		id_attribute: impl Into<String>,
		parent_attribute: impl Into<String>,
	) {
		self.hierarchies.insert(
			entity.into(),
			Hierarchy { id_attribute: id_attribute.into(), parent_attribute: parent_attribute.into() },
		);
	}

	pub fn rows(&self, entity: &str) -> &[Row] {
		self.tables.get(entity).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn hierarchy(&self, entity: &str) -> Option<&Hierarchy> {
		self.hierarchies.get(entity)
	}
}
