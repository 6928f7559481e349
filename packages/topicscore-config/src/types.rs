use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::{Map, Value};

use topicscore_domain::{Language, Topic};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub run: Run,
	pub search: Search,
	pub storage: Storage,
	#[serde(default)]
	pub provenance: Provenance,
	/// One keyword list file per topic × language.
	pub keywords: BTreeMap<Topic, BTreeMap<Language, PathBuf>>,
	/// Three batch export directories per topic × language, in priority order.
	pub batches: BTreeMap<Topic, BTreeMap<Language, Vec<PathBuf>>>,
}
impl Config {
	pub fn keyword_path(&self, topic: Topic, language: Language) -> Option<&Path> {
		self.keywords.get(&topic).and_then(|paths| paths.get(&language)).map(PathBuf::as_path)
	}

	pub fn batch_dirs(&self, topic: Topic, language: Language) -> Option<&[PathBuf]> {
		self.batches.get(&topic).and_then(|dirs| dirs.get(&language)).map(Vec::as_slice)
	}
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Run {
	pub topics: Vec<Topic>,
	pub languages: Vec<Language>,
	#[serde(default = "default_upload")]
	pub upload: bool,
	#[serde(default = "default_max_parallel_runs")]
	pub max_parallel_runs: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	pub url: String,
	pub auth_key: String,
	#[serde(default = "default_search_field")]
	pub field: String,
	#[serde(default = "default_rows")]
	pub rows: u32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	#[serde(default)]
	pub collections: Collections,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Table names of the two language partitions.
#[derive(Debug, Clone, Deserialize)]
pub struct Collections {
	pub en: String,
	pub es: String,
}
impl Collections {
	pub fn for_language(&self, language: Language) -> &str {
		match language {
			Language::En => &self.en,
			Language::Es => &self.es,
		}
	}
}
impl Default for Collections {
	fn default() -> Self {
		Self { en: "scored_documents_en".to_string(), es: "scored_documents_es".to_string() }
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct Provenance {
	#[serde(default)]
	pub match_policy: MatchPolicy,
}

/// Which batch wins when a link appears in more than one batch source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
	/// Every source is scanned and the last match in priority order is kept.
	#[default]
	Last,
	/// The first match in priority order is kept.
	First,
}

fn default_upload() -> bool {
	true
}

fn default_max_parallel_runs() -> u32 {
	6
}

fn default_search_field() -> String {
	"text".to_string()
}

fn default_rows() -> u32 {
	7_000
}

fn default_timeout_ms() -> u64 {
	30_000
}
