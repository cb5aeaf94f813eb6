use std::sync::Arc;

use relact_config::{Closure, Config, Pipeline};
use relact_domain::{IdentifierSet, Query};

use crate::{
	ClosureResolver, ExecutionContext, Mode, NotApplicable, Parameter, RecordStore, Stage,
	context::{QUERY_PARAMETER, RETRIEVE_MULTIPLE},
	detect, rewrite,
};

/// Where a single invocation currently is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Idle,
	Detecting,
	Expanding,
	Rewriting,
	Done,
}

/// The hook was invoked outside the message it is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMismatch {
	Message,
	Stage,
	Mode,
	MissingQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
	Context(ContextMismatch),
	RecursionDepth { depth: u32, max_depth: u32 },
	NotApplicable(NotApplicable),
	Lookup { message: String },
	Rewrite { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	Rewritten { query: Query, closure: IdentifierSet },
	/// The original query runs as submitted.
	Unchanged { phase: Phase, reason: SkipReason },
}
impl Outcome {
	pub fn is_rewritten(&self) -> bool {
		matches!(self, Self::Rewritten { .. })
	}

	/// The phase the invocation ended in; `Done` only when the query was rewritten.
	pub fn phase(&self) -> Phase {
		match self {
			Self::Rewritten { .. } => Phase::Done,
			Self::Unchanged { phase, .. } => *phase,
		}
	}

	pub fn query(&self) -> Option<&Query> {
		match self {
			Self::Rewritten { query, .. } => Some(query),
			Self::Unchanged { .. } => None,
		}
	}

	fn unchanged(phase: Phase, reason: SkipReason) -> Self {
		tracing::debug!(?phase, ?reason, "Leaving query unchanged.");

		Self::Unchanged { phase, reason }
	}
}

/// Broadens "activities regarding X" queries to X's spouse and descendant organizations and
/// drops channel mirror copies.
///
/// Never fails outward: every failure leaves the submitted query in place.
#[derive(Clone)]
pub struct RelatedActivities {
	store: Arc<dyn RecordStore>,
	pipeline: Pipeline,
	closure: Closure,
}
impl RelatedActivities {
	pub fn new(store: Arc<dyn RecordStore>, cfg: &Config) -> Self {
		Self::with_settings(store, cfg.pipeline.clone(), cfg.closure.clone())
	}

	pub fn with_settings(store: Arc<dyn RecordStore>, pipeline: Pipeline, closure: Closure) -> Self {
		Self { store, pipeline, closure }
	}

	/// Runs the hook against a host context, replacing its "Query" input on success.
	pub fn execute(&self, ctx: &mut ExecutionContext) -> Outcome {
		let query = match check_context(ctx) {
			Ok(query) => query,
			Err(mismatch) => {
				tracing::debug!(?mismatch, message = %ctx.message, "Not the expected context.");

				return Outcome::unchanged(Phase::Idle, SkipReason::Context(mismatch));
			},
		};
		let outcome = self.process(query, ctx.depth);

		if let Outcome::Rewritten { query, .. } = &outcome {
			ctx.input.insert(QUERY_PARAMETER.to_string(), Parameter::Query(query.clone()));
		}

		outcome
	}

	/// Detect, expand, rewrite. `depth` is the host recursion depth of this invocation.
	pub fn process(&self, query: &Query, depth: u32) -> Outcome {
		if depth > self.pipeline.max_depth {
			return Outcome::unchanged(
				Phase::Idle,
				SkipReason::RecursionDepth { depth, max_depth: self.pipeline.max_depth },
			);
		}

		let trigger = match detect(query) {
			Ok(trigger) => trigger,
			Err(reason) =>
				return Outcome::unchanged(Phase::Detecting, SkipReason::NotApplicable(reason)),
		};

		tracing::info!(seed_count = trigger.seeds.len(), "Related activities trigger detected.");

		let resolver = ClosureResolver::new(self.store.as_ref(), &self.closure);
		let closure = match resolver.expand(&trigger.seeds) {
			Ok(closure) => closure,
			Err(err) => {
				tracing::warn!(error = %err, "Could not resolve related records.");

				return Outcome::unchanged(
					Phase::Expanding,
					SkipReason::Lookup { message: err.to_string() },
				);
			},
		};

		tracing::debug!(query = %query.to_value(), "Query before rewrite.");

		match rewrite(query, &trigger, &closure) {
			Ok(rewritten) => {
				tracing::debug!(query = %rewritten.to_value(), "Query after rewrite.");
				tracing::info!(closure_size = closure.len(), "Rewrote related activities query.");

				Outcome::Rewritten { query: rewritten, closure }
			},
			Err(err) => {
				tracing::warn!(error = %err, "Query shape changed before rewrite.");

				Outcome::unchanged(Phase::Rewriting, SkipReason::Rewrite { message: err.to_string() })
			},
		}
	}
}

fn check_context(ctx: &ExecutionContext) -> Result<&Query, ContextMismatch> {
	if ctx.message != RETRIEVE_MULTIPLE {
		return Err(ContextMismatch::Message);
	}
	if ctx.stage != Stage::PreOperation {
		return Err(ContextMismatch::Stage);
	}
	if ctx.mode != Mode::Synchronous {
		return Err(ContextMismatch::Mode);
	}

	ctx.query().ok_or(ContextMismatch::MissingQuery)
}
