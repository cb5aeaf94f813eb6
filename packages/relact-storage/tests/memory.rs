use std::{env, fs, process};

use relact_domain::{Condition, Filter, Query, Row, schema};
use relact_storage::{Dataset, Error, MemoryStore};

const ROOT: &str = "11111111-1111-4111-8111-111111111111";
const CHILD: &str = "22222222-2222-4222-8222-222222222222";
const GRANDCHILD: &str = "33333333-3333-4333-8333-333333333333";
const LOOP_A: &str = "44444444-4444-4444-8444-444444444444";
const LOOP_B: &str = "55555555-5555-4555-8555-555555555555";

fn organizations() -> MemoryStore {
	let mut dataset = Dataset::default();

	dataset.declare_hierarchy(
		schema::ORGANIZATION_ENTITY,
		schema::ORGANIZATION_ID,
		schema::PARENT_ORGANIZATION_ID,
	);

	for (id, parent) in
		[(ROOT, None), (CHILD, Some(ROOT)), (GRANDCHILD, Some(CHILD)), (LOOP_A, Some(LOOP_B)), (LOOP_B, Some(LOOP_A))]
	{
		let mut row = Row::new().with(schema::ORGANIZATION_ID, id);

		if let Some(parent) = parent {
			row.set(schema::PARENT_ORGANIZATION_ID, parent);
		}

		dataset.insert(schema::ORGANIZATION_ENTITY, row);
	}

	MemoryStore::new(dataset)
}

fn under(id: &str) -> Query {
	Query::new(schema::ORGANIZATION_ENTITY)
		.with_columns([schema::ORGANIZATION_ID])
		.with_criteria(Filter::and().with_condition(Condition::under(schema::ORGANIZATION_ID, id)))
}

fn ids(rows: &[Row]) -> Vec<String> {
	rows.iter()
		.filter_map(|row| row.text(schema::ORGANIZATION_ID).map(str::to_string))
		.collect()
}

#[test]
fn under_returns_strict_descendants() {
	let rows = organizations().run_query(&under(ROOT)).expect("query runs");

	assert_eq!(ids(&rows), vec![CHILD.to_string(), GRANDCHILD.to_string()]);
}

#[test]
fn under_matches_identifiers_case_insensitively() {
	let rows = organizations().run_query(&under(&CHILD.to_uppercase())).expect("query runs");

	assert_eq!(ids(&rows), vec![GRANDCHILD.to_string()]);
}

#[test]
fn under_terminates_on_parent_cycles() {
	let rows = organizations().run_query(&under(ROOT)).expect("query runs");

	assert!(!ids(&rows).contains(&LOOP_A.to_string()));

	let rows = organizations().run_query(&under(LOOP_A)).expect("query runs");

	assert_eq!(ids(&rows), vec![LOOP_A.to_string(), LOOP_B.to_string()]);
}

#[test]
fn under_rejects_non_hierarchy_attribute() {
	let query = Query::new(schema::ORGANIZATION_ENTITY).with_criteria(
		Filter::and().with_condition(Condition::under(schema::PARENT_ORGANIZATION_ID, ROOT)),
	);
	let err = organizations().run_query(&query).expect_err("expected mismatch error");

	assert!(matches!(err, Error::HierarchyMismatch { .. }));
}

#[test]
fn invalid_condition_arity_is_rejected_before_evaluation() {
	let query = Query::new(schema::ORGANIZATION_ENTITY)
		.with_criteria(Filter::and().with_condition(Condition::in_set(schema::ORGANIZATION_ID, Vec::new())));
	let err = organizations().run_query(&query).expect_err("expected arity error");

	assert!(matches!(err, Error::InvalidQuery(_)));
}

#[test]
fn dataset_loads_from_json() {
	let mut path = env::temp_dir();

	path.push(format!("relact_dataset_test_{}.json", process::id()));

	fs::write(
		&path,
		serde_json::json!({
			"tables": { "account": [{ "account-id": ROOT }] },
			"hierarchies": {
				"account": { "id_attribute": "account-id", "parent_attribute": "parent-account-id" },
			},
		})
		.to_string(),
	)
	.expect("Failed to write test dataset.");

	let result = Dataset::load(&path);

	fs::remove_file(&path).expect("Failed to remove test dataset.");

	let dataset = result.expect("Dataset should load.");

	assert_eq!(dataset.rows(schema::ORGANIZATION_ENTITY).len(), 1);
	assert!(dataset.hierarchy(schema::ORGANIZATION_ENTITY).is_some());
	assert!(dataset.rows("missing").is_empty());
}
