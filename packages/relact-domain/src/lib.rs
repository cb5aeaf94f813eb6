pub mod identifier;
pub mod query;
pub mod row;
pub mod schema;
pub mod scrub;
pub mod value;

mod error;

pub use error::{QueryError, Result};
pub use identifier::{Identifier, IdentifierSet};
pub use query::{Condition, ConditionOperator, Filter, JoinOperator, Link, LogicalOperator, Query};
pub use row::Row;
pub use value::Value;
