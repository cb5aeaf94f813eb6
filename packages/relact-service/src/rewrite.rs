use relact_domain::{
	Condition, Filter, IdentifierSet, JoinOperator, LogicalOperator, Query,
	schema::{self, MIRROR_CHANNELS},
};

use crate::{
	RewriteError,
	detect::{self, TriggerMatch},
};

/// Builds the broadened query from a detected trigger and its identifier closure.
///
/// Works on a copy: on any error the caller still holds the untouched original.
///
/// 1. drops the trigger conditions;
/// 2. left-outer joins each mirror channel on the activity id, keeping only joined rows that carry
///    a communication activity id;
/// 3. requires every channel alias to be null, so mirrored activities fall out;
/// 4. left-outer joins party associations whose party is in the closure;
/// 5. requires a party association or a regarding object in the closure;
/// 6. marks the query distinct, since the joins multiply rows.
pub fn rewrite(
	query: &Query,
	trigger: &TriggerMatch,
	closure: &IdentifierSet,
) -> Result<Query, RewriteError> {
	check_shape(query, trigger)?;

	let members = closure.to_values();
	let party_condition = Condition::in_set(schema::PARTY_ID, members.clone());
	let regarding_condition = Condition::in_set(schema::REGARDING_OBJECT_ID, members);

	party_condition.validate()?;
	regarding_condition.validate()?;

	let mut rewritten = query.clone();

	for index in trigger.removal_order() {
		rewritten.criteria.conditions.remove(index);
	}

	let mut mirrors = Filter::and();

	for channel in MIRROR_CHANNELS {
		let link = rewritten.add_link(
			channel.entity,
			schema::ACTIVITY_ID,
			schema::ACTIVITY_ID,
			JoinOperator::LeftOuter,
		);

		link.alias = Some(channel.alias.to_string());
		link.criteria.add_condition(Condition::not_null(schema::COMMUNICATION_ACTIVITY_ID));

		mirrors.add_condition(Condition::null(schema::ACTIVITY_ID).on(channel.alias));
	}

	rewritten.criteria.add_filter(mirrors);

	let party = rewritten.add_link(
		schema::PARTY_ENTITY,
		schema::ACTIVITY_ID,
		schema::ACTIVITY_ID,
		JoinOperator::LeftOuter,
	);

	party.alias = Some(schema::PARTY_ALIAS.to_string());
	party.criteria.add_condition(party_condition);

	rewritten.criteria.add_filter(
		Filter::or()
			.with_condition(Condition::not_null(schema::ACTIVITY_ID).on(schema::PARTY_ALIAS))
			.with_condition(regarding_condition),
	);
	rewritten.distinct = true;

	Ok(rewritten)
}

/// Re-checks the detected trigger against the query so removal never hits the wrong condition.
fn check_shape(query: &Query, trigger: &TriggerMatch) -> Result<(), RewriteError> {
	if query.criteria.operator != LogicalOperator::And {
		return Err(RewriteError::DisjunctiveRoot);
	}

	let conditions = &query.criteria.conditions;

	if !conditions.get(trigger.null_condition).is_some_and(detect::is_null_condition) {
		return Err(RewriteError::ShapeChanged { index: trigger.null_condition });
	}

	for &index in &trigger.regarding_conditions {
		if conditions.get(index).and_then(detect::regarding_identifiers).is_none() {
			return Err(RewriteError::ShapeChanged { index });
		}
	}

	let aliases = query.aliases();

	for alias in MIRROR_CHANNELS.iter().map(|channel| channel.alias).chain([schema::PARTY_ALIAS]) {
		if aliases.contains(&alias) {
			return Err(RewriteError::AliasConflict { alias: alias.to_string() });
		}
	}

	Ok(())
}
