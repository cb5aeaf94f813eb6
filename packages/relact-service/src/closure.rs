use relact_config::Closure;
use relact_domain::{
	Condition, Filter, Identifier, IdentifierSet, JoinOperator, Link, Query, Row, schema,
};

use crate::{Error, RecordStore, Result};

/// Expands seed identifiers with current spouses and descendant organizations.
///
/// Both lookups are seeded from the original seeds only. A spouse's descendants or a descendant's
/// spouse are not followed, which keeps the number of store calls fixed by the seed count rather
/// than by what the store returns.
pub struct ClosureResolver<'a> {
	store: &'a dyn RecordStore,
	cfg: &'a Closure,
}
impl<'a> ClosureResolver<'a> {
	pub fn new(store: &'a dyn RecordStore, cfg: &'a Closure) -> Self {
		Self { store, cfg }
	}

	/// Returns the seeds followed by spouses, then descendants per seed, without duplicates.
	///
	/// Any failed lookup fails the whole expansion; nothing partial is returned.
	pub fn expand(&self, seeds: &IdentifierSet) -> Result<IdentifierSet> {
		let mut closure = seeds.clone();

		if self.cfg.spouses {
			let spouses = self.spouses(seeds)?;

			tracing::debug!(count = spouses.len(), "Resolved current spouses.");

			closure.extend(spouses);
		}
		if self.cfg.descendants {
			for seed in seeds {
				let descendants = self.descendants(seed)?;

				tracing::debug!(seed = %seed, count = descendants.len(), "Resolved descendant organizations.");

				closure.extend(descendants);
			}
		}

		Ok(closure)
	}

	fn spouses(&self, seeds: &IdentifierSet) -> Result<Vec<Identifier>> {
		let rows = self.run(&spouse_lookup(seeds, &self.cfg.current_status))?;

		Ok(identifiers(&rows, schema::PERSON_2_ID))
	}

	fn descendants(&self, seed: &Identifier) -> Result<Vec<Identifier>> {
		let rows = self.run(&descendant_lookup(seed))?;

		Ok(identifiers(&rows, schema::ORGANIZATION_ID))
	}

	fn run(&self, query: &Query) -> Result<Vec<Row>> {
		self.store.run_query(query).map_err(|err| {
			tracing::warn!(error = %err, entity = %query.entity, "Related record lookup failed.");

			Error::Lookup { message: format!("{err:#}") }
		})
	}
}

/// Relationships where a seed is person 1, the type is spousal, and the type's status carries
/// the configured "current" label.
pub fn spouse_lookup(seeds: &IdentifierSet, current_status: &str) -> Query {
	let status = Link::new(
		schema::RELATIONSHIP_TYPE_ENTITY,
		schema::STATUS_ENTITY,
		schema::RELATIONSHIP_STATUS_REF,
		schema::STATUS_ID,
		JoinOperator::Inner,
	)
	.with_criteria(Filter::and().with_condition(Condition::equal(schema::STATUS_NAME, current_status)));
	let relationship_type = Link::new(
		schema::RELATIONSHIP_ENTITY,
		schema::RELATIONSHIP_TYPE_ENTITY,
		schema::RELATIONSHIP_TYPE_REF,
		schema::RELATIONSHIP_TYPE_ID,
		JoinOperator::Inner,
	)
	.with_criteria(Filter::and().with_condition(Condition::equal(schema::IS_SPOUSAL, true)))
	.with_link(status);

	Query::new(schema::RELATIONSHIP_ENTITY)
		.with_columns([schema::PERSON_1_ID, schema::PERSON_2_ID, schema::RELATIONSHIP_ID])
		.with_criteria(
			Filter::and().with_condition(Condition::in_set(schema::PERSON_1_ID, seeds.to_values())),
		)
		.with_link(relationship_type)
}

/// Organizations anywhere beneath `seed` in the organization hierarchy.
pub fn descendant_lookup(seed: &Identifier) -> Query {
	Query::new(schema::ORGANIZATION_ENTITY)
		.with_columns([schema::ORGANIZATION_ID])
		.with_criteria(Filter::and().with_condition(Condition::under(schema::ORGANIZATION_ID, seed)))
}

fn identifiers(rows: &[Row], attribute: &str) -> Vec<Identifier> {
	rows.iter()
		.filter_map(|row| {
			let id = row.identifier(attribute);

			if id.is_none() {
				tracing::warn!(attribute, "Lookup row is missing a usable identifier.");
			}

			id
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use relact_domain::{ConditionOperator, Identifier, IdentifierSet, JoinOperator, Value, schema};

	use crate::closure::{descendant_lookup, spouse_lookup};

	const A: &str = "0d9c8b7a-6f5e-4d3c-8b2a-1f0e9d8c7b6a";

	#[test]
	fn spouse_lookup_joins_type_then_status() {
		let seeds: IdentifierSet = [Identifier::parse(A).expect("valid id")].into_iter().collect();
		let query = spouse_lookup(&seeds, "Current");
		let condition = &query.criteria.conditions[0];

		assert_eq!(query.entity, schema::RELATIONSHIP_ENTITY);
		assert_eq!(condition.attribute, schema::PERSON_1_ID);
		assert_eq!(condition.operator, ConditionOperator::In);
		assert_eq!(condition.values, seeds.to_values());

		let relationship_type = &query.links[0];
		let status = &relationship_type.links[0];

		assert_eq!(relationship_type.join, JoinOperator::Inner);
		assert_eq!(relationship_type.criteria.conditions[0].attribute, schema::IS_SPOUSAL);
		assert_eq!(status.to_entity, schema::STATUS_ENTITY);
		assert_eq!(status.criteria.conditions[0].values, vec![Value::from("Current")]);
	}

	#[test]
	fn descendant_lookup_uses_under() {
		let seed = Identifier::parse(A).expect("valid id");
		let query = descendant_lookup(&seed);

		assert_eq!(query.entity, schema::ORGANIZATION_ENTITY);
		assert_eq!(query.columns, vec![schema::ORGANIZATION_ID.to_string()]);
		assert_eq!(query.criteria.conditions[0].operator, ConditionOperator::Under);
	}
}
