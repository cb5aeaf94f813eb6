//! Fixture records and store doubles for exercising the related-activities hook.

use std::sync::Mutex;

use color_eyre::eyre;
use uuid::Uuid;

use relact_domain::{Condition, Filter, Identifier, Query, Row, Value, schema};
use relact_service::RecordStore;
use relact_storage::{Dataset, MemoryStore};

const SPOUSAL_TYPE: &str = "type:spousal";
const OTHER_TYPE: &str = "type:other";

/// A stable identifier derived from a readable fixture name.
pub fn id(name: &str) -> Identifier {
	Identifier::from(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
}

/// The subgrid query the hook is registered for: an `activity-id` null placeholder plus a
/// `regarding-object-id` condition on `names` (`equal` for one, `in` for several).
pub fn trigger_query(names: &[&str]) -> Query {
	let regarding = match names {
		[name] => Condition::equal(schema::REGARDING_OBJECT_ID, id(name)),
		_ => Condition::in_set(
			schema::REGARDING_OBJECT_ID,
			names.iter().map(|name| Value::from(id(name))).collect(),
		),
	};

	Query::new(schema::ACTIVITY_ENTITY)
		.with_columns([schema::ACTIVITY_ID, schema::SUBJECT])
		.with_criteria(
			Filter::and()
				.with_condition(Condition::null(schema::ACTIVITY_ID))
				.with_condition(regarding),
		)
}

/// Builds a [`Dataset`] of people, organizations, and activities by name.
///
/// Every record id is `id(name)`, so tests can refer to records without threading values around.
pub struct Fixture {
	dataset: Dataset,
}
impl Fixture {
	pub fn new() -> Self {
		let mut dataset = Dataset::default();

		dataset.declare_hierarchy(
			schema::ORGANIZATION_ENTITY,
			schema::ORGANIZATION_ID,
			schema::PARENT_ORGANIZATION_ID,
		);

		Self { dataset }
	}

	/// A spousal relationship from `person_1` to `person_2` whose type carries `status`.
	pub fn spouse(mut self, person_1: &str, person_2: &str, status: &str) -> Self {
		let relationship_type = self.relationship_type(SPOUSAL_TYPE, true, status);

		self.relationship(person_1, person_2, relationship_type);

		self
	}

	/// A non-spousal relationship with a current status.
	pub fn relative(mut self, person_1: &str, person_2: &str) -> Self {
		let relationship_type = self.relationship_type(OTHER_TYPE, false, "Current");

		self.relationship(person_1, person_2, relationship_type);

		self
	}

	pub fn organization(mut self, name: &str, parent: Option<&str>) -> Self {
		let mut row = Row::new().with(schema::ORGANIZATION_ID, &id(name));

		if let Some(parent) = parent {
			row.set(schema::PARENT_ORGANIZATION_ID, &id(parent));
		}

		self.dataset.insert(schema::ORGANIZATION_ENTITY, row);

		self
	}

	pub fn activity(mut self, name: &str, regarding: Option<&str>) -> Self {
		self.dataset.insert(schema::ACTIVITY_ENTITY, activity_row(name, regarding));

		self
	}

	/// An activity that a communication subsystem created as a copy of `primary`.
	pub fn mirror(mut self, name: &str, channel: &str, primary: &str, regarding: Option<&str>) -> Self {
		self.dataset.insert(schema::ACTIVITY_ENTITY, activity_row(name, regarding));
		self.dataset.insert(
			channel,
			Row::new()
				.with(schema::ACTIVITY_ID, &id(name))
				.with(schema::COMMUNICATION_ACTIVITY_ID, &id(primary)),
		);

		self
	}

	/// A channel record for `name` that is not a copy of anything.
	pub fn channel_record(mut self, name: &str, channel: &str) -> Self {
		self.dataset.insert(channel, Row::new().with(schema::ACTIVITY_ID, &id(name)));

		self
	}

	/// Lists `party` as a sender, recipient, or attendee of `activity`.
	pub fn party(mut self, activity: &str, party: &str) -> Self {
		self.dataset.insert(
			schema::PARTY_ENTITY,
			Row::new().with(schema::ACTIVITY_ID, &id(activity)).with(schema::PARTY_ID, &id(party)),
		);

		self
	}

	pub fn dataset(self) -> Dataset {
		self.dataset
	}

	pub fn store(self) -> MemoryStore {
		MemoryStore::new(self.dataset)
	}

	fn relationship_type(&mut self, kind: &str, spousal: bool, status: &str) -> Identifier {
		let type_id = id(&format!("{kind}:{status}"));
		let status_id = id(&format!("status:{status}"));
		let known = |rows: &[Row], attribute: &str, wanted: &Identifier| {
			rows.iter().any(|row| row.identifier(attribute).as_ref() == Some(wanted))
		};

		if !known(self.dataset.rows(schema::STATUS_ENTITY), schema::STATUS_ID, &status_id) {
			self.dataset.insert(
				schema::STATUS_ENTITY,
				Row::new().with(schema::STATUS_ID, &status_id).with(schema::STATUS_NAME, status),
			);
		}
		if !known(
			self.dataset.rows(schema::RELATIONSHIP_TYPE_ENTITY),
			schema::RELATIONSHIP_TYPE_ID,
			&type_id,
		) {
			self.dataset.insert(
				schema::RELATIONSHIP_TYPE_ENTITY,
				Row::new()
					.with(schema::RELATIONSHIP_TYPE_ID, &type_id)
					.with(schema::IS_SPOUSAL, spousal)
					.with(schema::RELATIONSHIP_STATUS_REF, &status_id),
			);
		}

		type_id
	}

	fn relationship(&mut self, person_1: &str, person_2: &str, relationship_type: Identifier) {
		let relationship_id = id(&format!("relationship:{person_1}:{person_2}"));

		self.dataset.insert(
			schema::RELATIONSHIP_ENTITY,
			Row::new()
				.with(schema::RELATIONSHIP_ID, &relationship_id)
				.with(schema::PERSON_1_ID, &id(person_1))
				.with(schema::PERSON_2_ID, &id(person_2))
				.with(schema::RELATIONSHIP_TYPE_REF, relationship_type),
		);
	}
}
impl Default for Fixture {
	fn default() -> Self {
		Self::new()
	}
}

fn activity_row(name: &str, regarding: Option<&str>) -> Row {
	let mut row =
		Row::new().with(schema::ACTIVITY_ID, &id(name)).with(schema::SUBJECT, format!("Activity {name}"));

	if let Some(regarding) = regarding {
		row.set(schema::REGARDING_OBJECT_ID, &id(regarding));
	}

	row
}

/// A store whose every lookup fails.
pub struct FailingStore;
impl RecordStore for FailingStore {
	fn run_query(&self, query: &Query) -> color_eyre::Result<Vec<Row>> {
		Err(eyre::eyre!("Store unavailable while querying {}.", query.entity))
	}
}

/// Wraps a [`MemoryStore`], recording every query and optionally failing the Nth call (1-based).
pub struct RecordingStore {
	inner: MemoryStore,
	fail_on: Option<usize>,
	calls: Mutex<Vec<Query>>,
}
impl RecordingStore {
	pub fn new(inner: MemoryStore) -> Self {
		Self { inner, fail_on: None, calls: Mutex::new(Vec::new()) }
	}

	pub fn failing_on(mut self, call: usize) -> Self {
		self.fail_on = Some(call);

		self
	}

	pub fn calls(&self) -> Vec<Query> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl RecordStore for RecordingStore {
	fn run_query(&self, query: &Query) -> color_eyre::Result<Vec<Row>> {
		let call = {
			let mut calls = self.calls.lock().unwrap_or_else(|err| err.into_inner());

			calls.push(query.clone());

			calls.len()
		};

		if self.fail_on == Some(call) {
			return Err(eyre::eyre!("Injected failure on call {call}."));
		}

		Ok(self.inner.run_query(query)?)
	}
}
