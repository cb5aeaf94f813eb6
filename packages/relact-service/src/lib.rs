pub mod closure;
pub mod context;
pub mod detect;
pub mod pipeline;
pub mod rewrite;
pub mod scrub;

mod error;

pub use closure::ClosureResolver;
pub use context::{ExecutionContext, Mode, Parameter, Stage};
pub use detect::{NotApplicable, TriggerMatch, detect};
pub use error::{Error, Result, RewriteError};
pub use pipeline::{ContextMismatch, Outcome, Phase, RelatedActivities, SkipReason};
pub use rewrite::rewrite;
pub use scrub::ExportScrub;

use relact_domain::{Query, Row};
use relact_storage::MemoryStore;

/// The one operation the core needs from a record store.
///
/// Calls are blocking and issued sequentially; timeouts and cancellation belong to the
/// implementation, which reports them as errors.
pub trait RecordStore
where
	Self: Send + Sync,
{
	fn run_query(&self, query: &Query) -> color_eyre::Result<Vec<Row>>;
}

impl RecordStore for MemoryStore {
	fn run_query(&self, query: &Query) -> color_eyre::Result<Vec<Row>> {
		Ok(MemoryStore::run_query(self, query)?)
	}
}
