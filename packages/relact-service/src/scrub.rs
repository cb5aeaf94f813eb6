use relact_config::Scrub;
use relact_domain::{Row, Value, scrub};

use crate::{
	ExecutionContext, Parameter, Stage,
	context::{ENTITY_COLLECTION_PARAMETER, ENTITY_PARAMETER, EXPORT_TO_EXCEL, RETRIEVE, RETRIEVE_MULTIPLE},
};

/// Strips HTML from activity text fields on the way out of a spreadsheet export.
///
/// Runs after the retrieve that an export issues; any other retrieve passes through.
#[derive(Clone, Debug)]
pub struct ExportScrub {
	fields: Vec<String>,
}
impl ExportScrub {
	pub fn new(cfg: &Scrub) -> Self {
		Self { fields: cfg.fields.clone() }
	}

	/// Returns how many field values were rewritten.
	pub fn execute(&self, ctx: &mut ExecutionContext) -> usize {
		if ctx.parent_message() != Some(EXPORT_TO_EXCEL) {
			return 0;
		}
		if ctx.message != RETRIEVE && ctx.message != RETRIEVE_MULTIPLE {
			return 0;
		}
		if ctx.stage != Stage::PostOperation {
			return 0;
		}

		let Some(output) = ctx.output.as_mut() else {
			tracing::warn!(message = %ctx.message, "Export retrieve has no output parameters.");

			return 0;
		};
		let rows = match output.get_mut(ENTITY_COLLECTION_PARAMETER) {
			Some(Parameter::Rows(rows)) => rows,
			_ => match output.get_mut(ENTITY_PARAMETER) {
				Some(Parameter::Rows(rows)) => rows,
				_ => {
					tracing::warn!("Export retrieve output carries no records.");

					return 0;
				},
			},
		};
		let scrubbed = rows.iter_mut().map(|row| self.scrub_row(row)).sum();

		tracing::debug!(scrubbed, "Scrubbed exported activity text.");

		scrubbed
	}

	fn scrub_row(&self, row: &mut Row) -> usize {
		let mut count = 0;

		for field in &self.fields {
			let Some(stripped) = row.text(field).and_then(scrub::scrub) else {
				continue;
			};

			row.set(field.as_str(), Value::Text(stripped));

			count += 1;
		}

		count
	}
}
