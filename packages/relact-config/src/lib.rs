mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Closure, Config, Pipeline, Scrub, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.pipeline.max_depth == 0 {
		return Err(Error::Validation {
			message: "pipeline.max_depth must be greater than zero.".to_string(),
		});
	}
	if cfg.closure.current_status.is_empty() {
		return Err(Error::Validation {
			message: "closure.current_status must be non-empty.".to_string(),
		});
	}
	if cfg.scrub.fields.is_empty() {
		return Err(Error::Validation { message: "scrub.fields must be non-empty.".to_string() });
	}

	for (index, field) in cfg.scrub.fields.iter().enumerate() {
		if field.is_empty() {
			return Err(Error::Validation {
				message: "scrub.fields entries must be non-empty.".to_string(),
			});
		}
		if cfg.scrub.fields[..index].contains(field) {
			return Err(Error::Validation {
				message: format!("scrub.fields lists '{field}' more than once."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_ascii_lowercase();
	cfg.closure.current_status = cfg.closure.current_status.trim().to_string();

	for field in &mut cfg.scrub.fields {
		*field = field.trim().to_string();
	}
}
