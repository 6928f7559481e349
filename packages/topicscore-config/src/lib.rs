mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Collections, Config, MatchPolicy, Postgres, Provenance, Run, Search, Service, Storage,
};

use std::{
	fs,
	path::{Path, PathBuf},
};

use topicscore_domain::{Language, Topic};

/// Number of batch export directories recorded per topic × language.
pub const BATCH_SOURCES_PER_RUN: usize = 3;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;
	let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

	normalize(&mut cfg, base_dir);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.run.topics.is_empty() {
		return Err(Error::Validation { message: "run.topics must be non-empty.".to_string() });
	}
	if cfg.run.languages.is_empty() {
		return Err(Error::Validation {
			message: "run.languages must be non-empty.".to_string(),
		});
	}
	if cfg.run.max_parallel_runs == 0 {
		return Err(Error::Validation {
			message: "run.max_parallel_runs must be greater than zero.".to_string(),
		});
	}
	if cfg.search.url.trim().is_empty() {
		return Err(Error::Validation { message: "search.url must be non-empty.".to_string() });
	}
	if cfg.search.auth_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "search.auth_key must be non-empty.".to_string(),
		});
	}
	if cfg.search.field.trim().is_empty() {
		return Err(Error::Validation {
			message: "search.field must be non-empty.".to_string(),
		});
	}
	if cfg.search.rows == 0 {
		return Err(Error::Validation {
			message: "search.rows must be greater than zero.".to_string(),
		});
	}
	if cfg.search.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.search.default_headers {
		match value.as_str() {
			Some(raw) if !raw.trim().is_empty() => {},
			_ => {
				return Err(Error::Validation {
					message: format!("search.default_headers.{key} must be a non-empty string."),
				});
			},
		}
	}

	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, table) in [
		("storage.collections.en", &cfg.storage.collections.en),
		("storage.collections.es", &cfg.storage.collections.es),
	] {
		if !is_sql_identifier(table) {
			return Err(Error::Validation {
				message: format!(
					"{label} must start with a lowercase letter or underscore and contain only lowercase letters, digits, or underscores."
				),
			});
		}
	}

	if cfg.storage.collections.en == cfg.storage.collections.es {
		return Err(Error::Validation {
			message: "storage.collections.en and storage.collections.es must differ.".to_string(),
		});
	}

	for &topic in &cfg.run.topics {
		for &language in &cfg.run.languages {
			if cfg.keyword_path(topic, language).is_none() {
				return Err(Error::Validation {
					message: format!("keywords.{topic}.{language} must be set."),
				});
			}

			let dirs = cfg.batch_dirs(topic, language).unwrap_or_default();

			if dirs.len() != BATCH_SOURCES_PER_RUN {
				return Err(Error::Validation {
					message: format!(
						"batches.{topic}.{language} must list exactly {BATCH_SOURCES_PER_RUN} directories."
					),
				});
			}
			if dirs.iter().any(|dir| dir.file_name().is_none()) {
				return Err(Error::Validation {
					message: format!(
						"batches.{topic}.{language} directories must end in a named component."
					),
				});
			}
		}
	}

	Ok(())
}

/// Restricts the run to the given topics and languages; empty filters keep the configured set.
pub fn apply_selection(cfg: &mut Config, topics: &[Topic], languages: &[Language]) {
	if !topics.is_empty() {
		cfg.run.topics = dedup(topics.to_vec());
	}
	if !languages.is_empty() {
		cfg.run.languages = dedup(languages.to_vec());
	}
}

fn normalize(cfg: &mut Config, base_dir: &Path) {
	cfg.run.topics = dedup(std::mem::take(&mut cfg.run.topics));
	cfg.run.languages = dedup(std::mem::take(&mut cfg.run.languages));
	cfg.search.url = cfg.search.url.trim().to_string();
	cfg.search.field = cfg.search.field.trim().to_string();

	for paths in cfg.keywords.values_mut() {
		for path in paths.values_mut() {
			*path = resolve(base_dir, path);
		}
	}
	for dirs in cfg.batches.values_mut() {
		for list in dirs.values_mut() {
			for dir in list.iter_mut() {
				*dir = resolve(base_dir, dir);
			}
		}
	}
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
	if path.is_absolute() { path.to_path_buf() } else { base_dir.join(path) }
}

fn dedup<T>(items: Vec<T>) -> Vec<T>
where
	T: PartialEq,
{
	let mut out = Vec::with_capacity(items.len());

	for item in items {
		if !out.contains(&item) {
			out.push(item);
		}
	}

	out
}

fn is_sql_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	let Some(first) = chars.next() else {
		return false;
	};

	(first.is_ascii_lowercase() || first == '_')
		&& chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sql_identifiers_are_lowercase_snake_case() {
		assert!(is_sql_identifier("scored_documents_en"));
		assert!(is_sql_identifier("_staging"));
		assert!(!is_sql_identifier("Scored"));
		assert!(!is_sql_identifier("docs;drop"));
		assert!(!is_sql_identifier("1docs"));
		assert!(!is_sql_identifier(""));
	}

	#[test]
	fn dedup_keeps_first_occurrence() {
		assert_eq!(dedup(vec![Topic::Covid, Topic::Climate, Topic::Covid]), vec![
			Topic::Covid,
			Topic::Climate
		]);
	}

	#[test]
	fn relative_paths_resolve_against_the_config_directory() {
		assert_eq!(
			resolve(Path::new("/etc/topicscore"), Path::new("keywords/climate_en.txt")),
			PathBuf::from("/etc/topicscore/keywords/climate_en.txt")
		);
		assert_eq!(
			resolve(Path::new("/etc"), Path::new("/data/x.txt")),
			PathBuf::from("/data/x.txt")
		);
	}
}
