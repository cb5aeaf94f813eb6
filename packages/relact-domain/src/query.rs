use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{QueryError, Result, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOperator {
	Equal,
	Null,
	NotNull,
	In,
	/// Hierarchical descendant of the operand, excluding the operand itself.
	Under,
}
impl ConditionOperator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Equal => "equal",
			Self::Null => "null",
			Self::NotNull => "not-null",
			Self::In => "in",
			Self::Under => "under",
		}
	}

	fn accepts(&self, count: usize) -> bool {
		match self {
			Self::Null | Self::NotNull => count == 0,
			Self::Equal | Self::Under => count == 1,
			Self::In => count >= 1,
		}
	}

	fn expected_arity(&self) -> &'static str {
		match self {
			Self::Null | Self::NotNull => "zero",
			Self::Equal | Self::Under => "exactly one",
			Self::In => "one or more",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogicalOperator {
	#[default]
	And,
	Or,
}
impl LogicalOperator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::And => "and",
			Self::Or => "or",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinOperator {
	#[default]
	Inner,
	LeftOuter,
}
impl JoinOperator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Inner => "inner",
			Self::LeftOuter => "left-outer",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
	pub attribute: String,
	pub operator: ConditionOperator,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub values: Vec<Value>,
	/// Alias of the link this condition applies to. `None` targets the entity that owns the
	/// filter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub entity_alias: Option<String>,
}
impl Condition {
	pub fn new(
		attribute: impl Into<String>,
		operator: ConditionOperator,
		values: Vec<Value>,
	) -> Self {
		Self { attribute: attribute.into(), operator, values, entity_alias: None }
	}

	pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::new(attribute, ConditionOperator::Equal, vec![value.into()])
	}

	pub fn null(attribute: impl Into<String>) -> Self {
		Self::new(attribute, ConditionOperator::Null, Vec::new())
	}

	pub fn not_null(attribute: impl Into<String>) -> Self {
		Self::new(attribute, ConditionOperator::NotNull, Vec::new())
	}

	pub fn in_set(attribute: impl Into<String>, values: Vec<Value>) -> Self {
		Self::new(attribute, ConditionOperator::In, values)
	}

	pub fn under(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::new(attribute, ConditionOperator::Under, vec![value.into()])
	}

	pub fn on(mut self, alias: impl Into<String>) -> Self {
		self.entity_alias = Some(alias.into());

		self
	}

	/// Matches an unaliased condition by attribute and operator.
	pub fn is(&self, attribute: &str, operator: ConditionOperator) -> bool {
		self.entity_alias.is_none() && self.attribute == attribute && self.operator == operator
	}

	pub fn validate(&self) -> Result<()> {
		if self.operator.accepts(self.values.len()) {
			return Ok(());
		}

		Err(QueryError::InvalidArity {
			attribute: self.attribute.clone(),
			operator: self.operator.as_str(),
			expected: self.operator.expected_arity(),
			actual: self.values.len(),
		})
	}

	fn to_value(&self) -> JsonValue {
		let mut value = serde_json::json!({
			"attribute": self.attribute,
			"op": self.operator.as_str(),
		});

		if !self.values.is_empty() {
			value["values"] = serde_json::json!(self.values);
		}
		if let Some(alias) = &self.entity_alias {
			value["alias"] = JsonValue::String(alias.clone());
		}

		value
	}
}

/// A logical combinator over conditions and nested filters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
	#[serde(default)]
	pub operator: LogicalOperator,
	#[serde(default)]
	pub conditions: Vec<Condition>,
	#[serde(default)]
	pub filters: Vec<Filter>,
}
impl Filter {
	pub fn new(operator: LogicalOperator) -> Self {
		Self { operator, conditions: Vec::new(), filters: Vec::new() }
	}

	pub fn and() -> Self {
		Self::new(LogicalOperator::And)
	}

	pub fn or() -> Self {
		Self::new(LogicalOperator::Or)
	}

	pub fn with_condition(mut self, condition: Condition) -> Self {
		self.conditions.push(condition);

		self
	}

	pub fn with_filter(mut self, filter: Filter) -> Self {
		self.filters.push(filter);

		self
	}

	pub fn add_condition(&mut self, condition: Condition) {
		self.conditions.push(condition);
	}

	pub fn add_filter(&mut self, filter: Filter) {
		self.filters.push(filter);
	}

	pub fn is_empty(&self) -> bool {
		self.conditions.is_empty() && self.filters.is_empty()
	}

	pub fn validate(&self) -> Result<()> {
		for condition in &self.conditions {
			condition.validate()?;
		}
		for filter in &self.filters {
			filter.validate()?;
		}

		Ok(())
	}

	fn to_value(&self) -> JsonValue {
		serde_json::json!({
			"op": self.operator.as_str(),
			"conditions": self.conditions.iter().map(Condition::to_value).collect::<Vec<_>>(),
			"filters": self.filters.iter().map(Self::to_value).collect::<Vec<_>>(),
		})
	}
}

/// A join from the owning entity to `to_entity`, optionally nested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
	pub from_entity: String,
	pub from_attribute: String,
	pub to_entity: String,
	pub to_attribute: String,
	#[serde(default)]
	pub join: JoinOperator,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub alias: Option<String>,
	#[serde(default)]
	pub criteria: Filter,
	#[serde(default)]
	pub links: Vec<Link>,
}
impl Link {
	pub fn new(
		from_entity: impl Into<String>,
		to_entity: impl Into<String>,
		from_attribute: impl Into<String>,
		to_attribute: impl Into<String>,
		join: JoinOperator,
	) -> Self {
		Self {
			from_entity: from_entity.into(),
			from_attribute: from_attribute.into(),
			to_entity: to_entity.into(),
			to_attribute: to_attribute.into(),
			join,
			alias: None,
			criteria: Filter::and(),
			links: Vec::new(),
		}
	}

	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = Some(alias.into());

		self
	}

	pub fn with_criteria(mut self, criteria: Filter) -> Self {
		self.criteria = criteria;

		self
	}

	pub fn with_link(mut self, link: Link) -> Self {
		self.links.push(link);

		self
	}

	fn collect_aliases<'a>(&'a self, out: &mut Vec<&'a str>) {
		if let Some(alias) = &self.alias {
			out.push(alias.as_str());
		}
		for link in &self.links {
			link.collect_aliases(out);
		}
	}

	fn validate(&self) -> Result<()> {
		self.criteria.validate()?;

		for link in &self.links {
			link.validate()?;
		}

		Ok(())
	}

	fn to_value(&self) -> JsonValue {
		serde_json::json!({
			"from": format!("{}.{}", self.from_entity, self.from_attribute),
			"to": format!("{}.{}", self.to_entity, self.to_attribute),
			"join": self.join.as_str(),
			"alias": self.alias,
			"criteria": self.criteria.to_value(),
			"links": self.links.iter().map(Self::to_value).collect::<Vec<_>>(),
		})
	}
}

/// A "retrieve records" request: one root entity, its criteria, joins, and the distinct flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
	pub entity: String,
	/// Root attributes to return; empty returns every attribute.
	#[serde(default)]
	pub columns: Vec<String>,
	#[serde(default)]
	pub criteria: Filter,
	#[serde(default)]
	pub links: Vec<Link>,
	#[serde(default)]
	pub distinct: bool,
}
impl Query {
	pub fn new(entity: impl Into<String>) -> Self {
		Self {
			entity: entity.into(),
			columns: Vec::new(),
			criteria: Filter::and(),
			links: Vec::new(),
			distinct: false,
		}
	}

	pub fn with_columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();

		self
	}

	pub fn with_criteria(mut self, criteria: Filter) -> Self {
		self.criteria = criteria;

		self
	}

	pub fn with_link(mut self, link: Link) -> Self {
		self.links.push(link);

		self
	}

	/// Appends a link from the root entity and hands it back for further shaping.
	pub fn add_link(
		&mut self,
		to_entity: impl Into<String>,
		from_attribute: impl Into<String>,
		to_attribute: impl Into<String>,
		join: JoinOperator,
	) -> &mut Link {
		let link = Link::new(self.entity.clone(), to_entity, from_attribute, to_attribute, join);

		self.links.push(link);

		let last = self.links.len() - 1;

		&mut self.links[last]
	}

	/// Every link alias in the tree, depth first.
	pub fn aliases(&self) -> Vec<&str> {
		let mut out = Vec::new();

		for link in &self.links {
			link.collect_aliases(&mut out);
		}

		out
	}

	pub fn has_alias(&self, alias: &str) -> bool {
		self.aliases().contains(&alias)
	}

	pub fn validate(&self) -> Result<()> {
		self.criteria.validate()?;

		for link in &self.links {
			link.validate()?;
		}

		Ok(())
	}

	/// Compact JSON rendering for diagnostics.
	pub fn to_value(&self) -> JsonValue {
		serde_json::json!({
			"entity": self.entity,
			"columns": self.columns,
			"distinct": self.distinct,
			"criteria": self.criteria.to_value(),
			"links": self.links.iter().map(Link::to_value).collect::<Vec<_>>(),
		})
	}
}

#[cfg(test)]
mod tests {
	use crate::query::{Condition, ConditionOperator, Filter, JoinOperator, Link, Query};

	#[test]
	fn arity_is_enforced_per_operator() {
		assert!(Condition::null("activity-id").validate().is_ok());
		assert!(Condition::equal("name", "Current").validate().is_ok());
		assert!(
			Condition::new("activity-id", ConditionOperator::Null, vec!["x".into()])
				.validate()
				.is_err()
		);
		assert!(Condition::in_set("party-id", Vec::new()).validate().is_err());
		assert!(
			Condition::new("name", ConditionOperator::Equal, vec!["a".into(), "b".into()])
				.validate()
				.is_err()
		);
	}

	#[test]
	fn validate_walks_nested_links() {
		let bad = Link::new("a", "b", "id", "id", JoinOperator::Inner)
			.with_criteria(Filter::and().with_condition(Condition::in_set("x", Vec::new())));
		let query = Query::new("a").with_link(
			Link::new("a", "c", "id", "id", JoinOperator::LeftOuter).with_link(bad),
		);
		let err = query.validate().expect_err("expected arity error");

		assert!(err.to_string().contains("one or more"), "Unexpected error: {err}");
	}

	#[test]
	fn aliases_are_collected_depth_first() {
		let query = Query::new("a").with_link(
			Link::new("a", "b", "id", "id", JoinOperator::Inner)
				.with_alias("outer")
				.with_link(Link::new("b", "c", "id", "id", JoinOperator::Inner).with_alias("inner")),
		);

		assert_eq!(query.aliases(), vec!["outer", "inner"]);
		assert!(query.has_alias("inner"));
		assert!(!query.has_alias("missing"));
	}

	#[test]
	fn is_ignores_aliased_conditions() {
		let plain = Condition::null("activity-id");
		let aliased = Condition::null("activity-id").on("remove-letter");

		assert!(plain.is("activity-id", ConditionOperator::Null));
		assert!(!aliased.is("activity-id", ConditionOperator::Null));
	}

	#[test]
	fn query_deserializes_with_defaults() {
		let query: Query = serde_json::from_value(serde_json::json!({
			"entity": "activity-pointer",
			"criteria": {
				"conditions": [
					{ "attribute": "activity-id", "operator": "null" },
					{ "attribute": "regarding-object-id", "operator": "in", "values": ["a", "b"] },
				],
			},
		}))
		.expect("valid query json");

		assert!(!query.distinct);
		assert!(query.links.is_empty());
		assert_eq!(query.criteria.conditions.len(), 2);
		assert_eq!(query.criteria.conditions[1].operator, ConditionOperator::In);
	}
}
