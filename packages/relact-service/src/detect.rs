use relact_domain::{Condition, ConditionOperator, Identifier, IdentifierSet, Query, schema};

/// Why a query is not the related-activities trigger. Not an error: the query simply runs as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotApplicable {
	WrongEntity,
	TooFewConditions,
	MissingNullCondition,
	AmbiguousNullCondition,
	NoSeedIdentifiers,
}
impl NotApplicable {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::WrongEntity => "wrong_entity",
			Self::TooFewConditions => "too_few_conditions",
			Self::MissingNullCondition => "missing_null_condition",
			Self::AmbiguousNullCondition => "ambiguous_null_condition",
			Self::NoSeedIdentifiers => "no_seed_identifiers",
		}
	}
}

/// The trigger found in a query's root criteria.
///
/// Indices point into `query.criteria.conditions` of the query that was inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
	pub null_condition: usize,
	pub regarding_conditions: Vec<usize>,
	pub seeds: IdentifierSet,
}
impl TriggerMatch {
	/// Every condition index the rewrite removes, highest first.
	pub fn removal_order(&self) -> Vec<usize> {
		let mut indices = self.regarding_conditions.clone();

		indices.push(self.null_condition);
		indices.sort_unstable_by(|a, b| b.cmp(a));
		indices.dedup();

		indices
	}
}

/// Recognizes the "activities regarding X" subgrid query: an `activity-id is null` placeholder
/// next to one or more `regarding-object-id` conditions on identifiers.
///
/// Only top-level conditions of the root filter are inspected; nested filters and unrelated
/// conditions stay where they are.
pub fn detect(query: &Query) -> Result<TriggerMatch, NotApplicable> {
	if query.entity != schema::ACTIVITY_ENTITY {
		return Err(NotApplicable::WrongEntity);
	}
	if query.criteria.conditions.len() < 2 {
		return Err(NotApplicable::TooFewConditions);
	}

	let mut null_condition = None;
	let mut regarding_conditions = Vec::new();
	let mut seeds = IdentifierSet::new();

	for (index, condition) in query.criteria.conditions.iter().enumerate() {
		if is_null_condition(condition) {
			tracing::debug!(index, "Found triggering null condition.");

			if null_condition.replace(index).is_some() {
				return Err(NotApplicable::AmbiguousNullCondition);
			}
		} else if let Some(ids) = regarding_identifiers(condition) {
			tracing::debug!(index, count = ids.len(), "Found regarding condition.");

			regarding_conditions.push(index);
			seeds.extend(ids);
		} else {
			tracing::trace!(attribute = %condition.attribute, "Disregarding condition.");
		}
	}

	let Some(null_condition) = null_condition else {
		return Err(NotApplicable::MissingNullCondition);
	};

	if seeds.is_empty() {
		return Err(NotApplicable::NoSeedIdentifiers);
	}

	Ok(TriggerMatch { null_condition, regarding_conditions, seeds })
}

pub(crate) fn is_null_condition(condition: &Condition) -> bool {
	condition.is(schema::ACTIVITY_ID, ConditionOperator::Null)
}

/// The identifiers of an `equal`/`in` condition on `regarding-object-id`, provided every operand
/// is a well-formed identifier.
pub(crate) fn regarding_identifiers(condition: &Condition) -> Option<Vec<Identifier>> {
	let operator_matches = condition.is(schema::REGARDING_OBJECT_ID, ConditionOperator::Equal)
		|| condition.is(schema::REGARDING_OBJECT_ID, ConditionOperator::In);

	if !operator_matches || condition.validate().is_err() {
		return None;
	}

	condition.values.iter().map(Identifier::from_value).collect()
}

#[cfg(test)]
mod tests {
	use relact_domain::{Condition, Filter, Query, Value, schema};

	use crate::detect::{NotApplicable, detect};

	const A: &str = "6f1c2d3e-4a5b-4c6d-8e7f-9a0b1c2d3e4f";
	const B: &str = "7a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d";

	fn trigger(regarding: Condition) -> Query {
		Query::new(schema::ACTIVITY_ENTITY).with_criteria(
			Filter::and()
				.with_condition(Condition::equal("state-code", 0_i64))
				.with_condition(Condition::null(schema::ACTIVITY_ID))
				.with_condition(regarding),
		)
	}

	#[test]
	fn equal_regarding_condition_seeds_one_identifier() {
		let found = detect(&trigger(Condition::equal(schema::REGARDING_OBJECT_ID, A)))
			.expect("trigger matches");

		assert_eq!(found.null_condition, 1);
		assert_eq!(found.regarding_conditions, vec![2]);
		assert_eq!(found.seeds.len(), 1);
		assert_eq!(found.removal_order(), vec![2, 1]);
	}

	#[test]
	fn in_regarding_condition_seeds_every_identifier_once() {
		let values: Vec<Value> = vec![A.into(), B.into(), A.to_uppercase().into()];
		let found = detect(&trigger(Condition::in_set(schema::REGARDING_OBJECT_ID, values)))
			.expect("trigger matches");

		assert_eq!(found.seeds.len(), 2);
	}

	#[test]
	fn regarding_condition_with_a_non_identifier_is_ignored() {
		let values: Vec<Value> = vec![A.into(), "not-an-id".into()];
		let result = detect(&trigger(Condition::in_set(schema::REGARDING_OBJECT_ID, values)));

		assert_eq!(result, Err(NotApplicable::NoSeedIdentifiers));
	}

	#[test]
	fn aliased_null_condition_does_not_trigger() {
		let query = Query::new(schema::ACTIVITY_ENTITY).with_criteria(
			Filter::and()
				.with_condition(Condition::null(schema::ACTIVITY_ID).on("remove-email"))
				.with_condition(Condition::equal(schema::REGARDING_OBJECT_ID, A)),
		);

		assert_eq!(detect(&query), Err(NotApplicable::MissingNullCondition));
	}

	#[test]
	fn duplicate_null_conditions_are_ambiguous() {
		let mut query = trigger(Condition::equal(schema::REGARDING_OBJECT_ID, A));

		query.criteria.add_condition(Condition::null(schema::ACTIVITY_ID));

		assert_eq!(detect(&query), Err(NotApplicable::AmbiguousNullCondition));
	}

	#[test]
	fn nested_filters_are_not_scanned() {
		let query = Query::new(schema::ACTIVITY_ENTITY).with_criteria(
			Filter::and()
				.with_condition(Condition::null(schema::ACTIVITY_ID))
				.with_condition(Condition::equal("state-code", 0_i64))
				.with_filter(
					Filter::and().with_condition(Condition::equal(schema::REGARDING_OBJECT_ID, A)),
				),
		);

		assert_eq!(detect(&query), Err(NotApplicable::NoSeedIdentifiers));
	}
}
