use std::{
	collections::HashSet,
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{QueryError, Result, Value};

/// An opaque record identifier, normalized to lower-case hyphenated UUID text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);
impl Identifier {
	pub fn parse(raw: &str) -> Result<Self> {
		Uuid::parse_str(raw.trim())
			.map(Self::from)
			.map_err(|_| QueryError::InvalidIdentifier { value: raw.to_string() })
	}

	/// Returns `None` unless the value is text holding a well-formed identifier.
	pub fn from_value(value: &Value) -> Option<Self> {
		value.as_text().and_then(|text| Self::parse(text).ok())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<Uuid> for Identifier {
	fn from(value: Uuid) -> Self {
		Self(value.hyphenated().to_string())
	}
}

impl FromStr for Identifier {
	type Err = QueryError;

	fn from_str(raw: &str) -> Result<Self> {
		Self::parse(raw)
	}
}

impl TryFrom<String> for Identifier {
	type Error = QueryError;

	fn try_from(raw: String) -> Result<Self> {
		Self::parse(&raw)
	}
}

impl From<Identifier> for String {
	fn from(value: Identifier) -> Self {
		value.0
	}
}

impl Display for Identifier {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Duplicate-free identifiers in first-insertion order.
///
/// Iteration order is stable: whatever was inserted first comes first. Equality is set
/// equality and ignores that order.
#[derive(Clone, Debug, Default)]
pub struct IdentifierSet {
	ordered: Vec<Identifier>,
	members: HashSet<Identifier>,
}
impl IdentifierSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` when the identifier was not already present.
	pub fn insert(&mut self, id: Identifier) -> bool {
		if !self.members.insert(id.clone()) {
			return false;
		}

		self.ordered.push(id);

		true
	}

	pub fn contains(&self, id: &Identifier) -> bool {
		self.members.contains(id)
	}

	pub fn len(&self) -> usize {
		self.ordered.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ordered.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Identifier> {
		self.ordered.iter()
	}

	pub fn as_slice(&self) -> &[Identifier] {
		&self.ordered
	}

	/// Condition operands for an `in-set` comparison, in insertion order.
	pub fn to_values(&self) -> Vec<Value> {
		self.ordered.iter().map(Value::from).collect()
	}
}

impl PartialEq for IdentifierSet {
	fn eq(&self, other: &Self) -> bool {
		self.members == other.members
	}
}

impl Eq for IdentifierSet {}

impl Extend<Identifier> for IdentifierSet {
	fn extend<T: IntoIterator<Item = Identifier>>(&mut self, iter: T) {
		for id in iter {
			self.insert(id);
		}
	}
}

impl FromIterator<Identifier> for IdentifierSet {
	fn from_iter<T: IntoIterator<Item = Identifier>>(iter: T) -> Self {
		let mut set = Self::new();

		set.extend(iter);

		set
	}
}

impl<'a> IntoIterator for &'a IdentifierSet {
	type IntoIter = std::slice::Iter<'a, Identifier>;
	type Item = &'a Identifier;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const A: &str = "8f14e45f-ceea-467f-a0d6-7e1e1a2b3c4d";
	const B: &str = "c9f0f895-fb98-4b91-b3a3-0b5d0d7e8f90";

	#[test]
	fn parse_normalizes_case_and_whitespace() {
		let id = Identifier::parse(" 8F14E45F-CEEA-467F-A0D6-7E1E1A2B3C4D ").expect("valid id");

		assert_eq!(id.as_str(), A);
	}

	#[test]
	fn parse_rejects_non_uuid_text() {
		assert!(Identifier::parse("not-an-id").is_err());
		assert!(Identifier::from_value(&Value::Bool(true)).is_none());
		assert!(Identifier::from_value(&Value::from("42")).is_none());
	}

	#[test]
	fn set_keeps_first_insertion_order_and_drops_duplicates() {
		let a = Identifier::parse(A).expect("valid id");
		let b = Identifier::parse(B).expect("valid id");
		let mut set = IdentifierSet::new();

		assert!(set.insert(b.clone()));
		assert!(set.insert(a.clone()));
		assert!(!set.insert(b.clone()));
		assert_eq!(set.as_slice(), &[b, a]);
	}

	#[test]
	fn set_equality_ignores_order() {
		let a = Identifier::parse(A).expect("valid id");
		let b = Identifier::parse(B).expect("valid id");
		let forward: IdentifierSet = [a.clone(), b.clone()].into_iter().collect();
		let backward: IdentifierSet = [b, a].into_iter().collect();

		assert_eq!(forward, backward);
		assert_ne!(forward.as_slice(), backward.as_slice());
	}
}
