use relact_domain::{
	Condition, ConditionOperator, Filter, Identifier, JoinOperator, Link, LogicalOperator, Query,
	Row, Value,
};

use crate::{Dataset, Error, Result};

const ROOT_KEY: &str = "";

/// Evaluates queries against an in-memory [`Dataset`].
///
/// Joins follow SQL semantics: an inner link drops the row when nothing matches, a left-outer
/// link keeps it with the joined side null. Only root attributes are projected, so `distinct`
/// collapses rows multiplied by joins.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	dataset: Dataset,
}
impl MemoryStore {
	pub fn new(dataset: Dataset) -> Self {
		Self { dataset }
	}

	pub fn dataset(&self) -> &Dataset {
		&self.dataset
	}

	pub fn dataset_mut(&mut self) -> &mut Dataset {
		&mut self.dataset
	}

	pub fn run_query(&self, query: &Query) -> Result<Vec<Row>> {
		query.validate()?;

		let mut results: Vec<Row> = Vec::new();

		for row in self.dataset.rows(&query.entity) {
			let mut bindings = vec![Binding::root(&query.entity, row)];
			let mut ordinal = 0;

			for link in &query.links {
				bindings = self.join(bindings, ROOT_KEY, link, &mut ordinal)?;
			}

			for binding in &bindings {
				if !self.matches_filter(&query.criteria, binding, ROOT_KEY)? {
					continue;
				}

				let projected = row.project(&query.columns);

				if query.distinct && results.contains(&projected) {
					continue;
				}

				results.push(projected);
			}
		}

		Ok(results)
	}

	fn join<'a>(
		&'a self,
		bindings: Vec<Binding<'a>>,
		parent_key: &str,
		link: &Link,
		ordinal: &mut usize,
	) -> Result<Vec<Binding<'a>>> {
		let key = link.alias.clone().unwrap_or_else(|| format!("#link{ordinal}"));

		*ordinal += 1;

		let mut joined = Vec::with_capacity(bindings.len());

		for binding in bindings {
			let source = binding
				.lookup(parent_key)
				.and_then(|entry| entry.row)
				.and_then(|row| row.get(&link.from_attribute));
			let mut matched = false;

			if let Some(source) = source {
				for candidate in self.dataset.rows(&link.to_entity) {
					let Some(target) = candidate.get(&link.to_attribute) else {
						continue;
					};

					if !same_value(source, target) {
						continue;
					}

					let extended = binding.with(&key, &link.to_entity, Some(candidate));

					if self.matches_filter(&link.criteria, &extended, &key)? {
						joined.push(extended);

						matched = true;
					}
				}
			}

			if !matched && link.join == JoinOperator::LeftOuter {
				joined.push(binding.with(&key, &link.to_entity, None));
			}
		}

		for nested in &link.links {
			joined = self.join(joined, &key, nested, ordinal)?;
		}

		Ok(joined)
	}

	fn matches_filter(&self, filter: &Filter, binding: &Binding<'_>, default_key: &str) -> Result<bool> {
		if filter.is_empty() {
			return Ok(true);
		}

		let short_circuit = match filter.operator {
			LogicalOperator::And => false,
			LogicalOperator::Or => true,
		};

		for condition in &filter.conditions {
			if self.matches_condition(condition, binding, default_key)? == short_circuit {
				return Ok(short_circuit);
			}
		}
		for nested in &filter.filters {
			if self.matches_filter(nested, binding, default_key)? == short_circuit {
				return Ok(short_circuit);
			}
		}

		Ok(!short_circuit)
	}

	fn matches_condition(
		&self,
		condition: &Condition,
		binding: &Binding<'_>,
		default_key: &str,
	) -> Result<bool> {
		let key = condition.entity_alias.as_deref().unwrap_or(default_key);
		let entry = binding.lookup(key).ok_or_else(|| Error::UnknownAlias(key.to_string()))?;
		let value = entry.row.and_then(|row| row.get(&condition.attribute));
		let operand = condition.values.first();

		match condition.operator {
			ConditionOperator::Null => Ok(value.is_none()),
			ConditionOperator::NotNull => Ok(value.is_some()),
			ConditionOperator::Equal => Ok(value
				.zip(operand)
				.is_some_and(|(value, operand)| same_value(value, operand))),
			ConditionOperator::In => Ok(value.is_some_and(|value| {
				condition.values.iter().any(|operand| same_value(value, operand))
			})),
			ConditionOperator::Under => match (entry.row, operand) {
				(Some(row), Some(ancestor)) =>
					self.is_under(&entry.entity, &condition.attribute, row, ancestor),
				_ => Ok(false),
			},
		}
	}

	/// Walks parent pointers upward from `row`; the row itself never counts as under itself.
	fn is_under(&self, entity: &str, attribute: &str, row: &Row, ancestor: &Value) -> Result<bool> {
		let hierarchy = self
			.dataset
			.hierarchy(entity)
			.ok_or_else(|| Error::MissingHierarchy { entity: entity.to_string() })?;

		if hierarchy.id_attribute != attribute {
			return Err(Error::HierarchyMismatch {
				entity: entity.to_string(),
				attribute: attribute.to_string(),
			});
		}

		let rows = self.dataset.rows(entity);
		let mut visited: Vec<&Value> = Vec::new();
		let mut parent = row.get(&hierarchy.parent_attribute);

		while let Some(current) = parent {
			if same_value(current, ancestor) {
				return Ok(true);
			}
			if visited.iter().any(|seen| same_value(seen, current)) {
				break;
			}

			visited.push(current);

			parent = rows
				.iter()
				.find(|candidate| {
					candidate
						.get(&hierarchy.id_attribute)
						.is_some_and(|id| same_value(id, current))
				})
				.and_then(|candidate| candidate.get(&hierarchy.parent_attribute));
		}

		Ok(false)
	}
}

#[derive(Clone, Debug)]
struct Entry<'a> {
	key: String,
	entity: String,
	row: Option<&'a Row>,
}

/// One candidate result: the root row plus whatever each link joined onto it.
#[derive(Clone, Debug)]
struct Binding<'a> {
	entries: Vec<Entry<'a>>,
}
impl<'a> Binding<'a> {
	fn root(entity: &str, row: &'a Row) -> Self {
		Self {
			entries: vec![Entry { key: ROOT_KEY.to_string(), entity: entity.to_string(), row: Some(row) }],
		}
	}

	fn with(&self, key: &str, entity: &str, row: Option<&'a Row>) -> Self {
		let mut entries = self.entries.clone();

		entries.push(Entry { key: key.to_string(), entity: entity.to_string(), row });

		Self { entries }
	}

	fn lookup(&self, key: &str) -> Option<&Entry<'a>> {
		self.entries.iter().rev().find(|entry| entry.key == key)
	}
}

/// Identifiers compare by canonical form so casing differences in stored text do not matter.
fn same_value(lhs: &Value, rhs: &Value) -> bool {
	match (Identifier::from_value(lhs), Identifier::from_value(rhs)) {
		(Some(lhs), Some(rhs)) => lhs == rhs,
		_ => lhs == rhs,
	}
}
