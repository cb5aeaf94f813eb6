use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub pipeline: Pipeline,
	#[serde(default)]
	pub closure: Closure,
	#[serde(default)]
	pub scrub: Scrub,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	/// An `EnvFilter` directive, e.g. "info" or "relact_service=debug".
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
	/// Deepest host recursion level at which the rewrite still runs.
	#[serde(default = "default_max_depth")]
	pub max_depth: u32,
}
impl Default for Pipeline {
	fn default() -> Self {
		Self { max_depth: default_max_depth() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Closure {
	#[serde(default = "default_true")]
	pub spouses: bool,
	#[serde(default = "default_true")]
	pub descendants: bool,
	/// Status label a spousal relationship must carry to count.
	#[serde(default = "default_current_status")]
	pub current_status: String,
}
impl Default for Closure {
	fn default() -> Self {
		Self { spouses: true, descendants: true, current_status: default_current_status() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scrub {
	/// Text attributes stripped of HTML when rows are exported.
	#[serde(default = "default_scrub_fields")]
	pub fields: Vec<String>,
}
impl Default for Scrub {
	fn default() -> Self {
		Self { fields: default_scrub_fields() }
	}
}

fn default_max_depth() -> u32 {
	1
}

fn default_true() -> bool {
	true
}

fn default_current_status() -> String {
	"Current".to_string()
}

fn default_scrub_fields() -> Vec<String> {
	vec!["subject".to_string(), "description".to_string()]
}
