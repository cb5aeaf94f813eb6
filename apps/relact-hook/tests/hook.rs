use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use relact_domain::Row;
use relact_service::{
	ExecutionContext, Parameter, Stage,
	context::{ENTITY_COLLECTION_PARAMETER, EXPORT_TO_EXCEL, RETRIEVE_MULTIPLE},
};
use relact_storage::Dataset;
use relact_testkit::{Fixture, trigger_query};

const CONFIG: &str = r#"
[service]
log_level = "warn"

[scrub]
fields = ["description"]
"#;

fn write_temp(name: &str, payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let mut path = env::temp_dir();

	path.push(format!("relact_hook_test_{nanos}_{}_{ordinal}_{name}", std::process::id()));

	fs::write(&path, payload).expect("Failed to write test file.");

	path
}

fn load_config() -> relact_config::Config {
	let path = write_temp("config.toml", CONFIG.to_string());
	let config = relact_config::load(&path).expect("Failed to load config.");

	fs::remove_file(&path).expect("Failed to remove test config.");

	config
}

#[test]
fn rewrite_uses_dataset_and_context_files() {
	let config = load_config();
	let dataset = Fixture::new().spouse("alice", "bob", "Current").dataset();
	let dataset_path =
		write_temp("dataset.json", serde_json::to_string(&dataset).expect("Failed to render dataset."));
	let ctx = ExecutionContext::new(RETRIEVE_MULTIPLE, Stage::PreOperation)
		.with_query(trigger_query(&["alice"]));
	let context_path =
		write_temp("context.json", serde_json::to_string(&ctx).expect("Failed to render context."));
	let mut ctx = relact_hook::read_context(&context_path).expect("Failed to read context.");
	let dataset = Dataset::load(&dataset_path).expect("Failed to read dataset.");
	let outcome = relact_hook::rewrite(&config, &mut ctx, dataset);

	fs::remove_file(&dataset_path).expect("Failed to remove test dataset.");
	fs::remove_file(&context_path).expect("Failed to remove test context.");

	assert!(outcome.is_rewritten());
	assert_eq!(ctx.query().map(|query| query.links.len()), Some(4));
}

#[test]
fn scrub_uses_configured_fields() {
	let config = load_config();
	let mut ctx = ExecutionContext::new(RETRIEVE_MULTIPLE, Stage::PostOperation)
		.with_parent(ExecutionContext::new(EXPORT_TO_EXCEL, Stage::MainOperation))
		.with_output(
			ENTITY_COLLECTION_PARAMETER,
			Parameter::Rows(vec![
				Row::new().with("subject", "<p>kept</p>").with("description", "<div>Hi</div>"),
			]),
		);

	assert_eq!(relact_hook::scrub(&config, &mut ctx), 1);

	let Some(Parameter::Rows(rows)) =
		ctx.output.as_ref().and_then(|output| output.get(ENTITY_COLLECTION_PARAMETER))
	else {
		panic!("Export rows are missing.");
	};

	assert_eq!(rows[0].text("subject"), Some("<p>kept</p>"));
	assert_eq!(rows[0].text("description"), Some("Hi"));
}

#[test]
fn unreadable_context_is_reported() {
	let path = write_temp("broken.json", "{ not json".to_string());
	let err = relact_hook::read_context(&path).expect_err("Expected a parse failure.");

	fs::remove_file(&path).expect("Failed to remove test context.");

	assert!(err.to_string().contains("Failed to parse context file"));
}
