use std::{
	collections::BTreeMap,
	fmt::Write as _,
	path::PathBuf,
	sync::Arc,
	time::Duration,
};

use tokio::{sync::Semaphore, task::JoinSet};

use topicscore_config::{Config, MatchPolicy};
use topicscore_domain::{Language, Topic};

use crate::{
	AccumulationStats, BatchSourceCache, Error, Providers, Result, ScoreAccumulator, UploadReport,
	provenance, upload,
};

#[derive(Debug, Clone)]
pub struct RunSettings {
	pub field: String,
	pub search_timeout: Duration,
	pub match_policy: MatchPolicy,
	pub upload: bool,
	pub max_parallel_runs: usize,
}
impl RunSettings {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			field: cfg.search.field.clone(),
			search_timeout: Duration::from_millis(cfg.search.timeout_ms),
			match_policy: cfg.provenance.match_policy,
			upload: cfg.run.upload,
			max_parallel_runs: cfg.run.max_parallel_runs as usize,
		}
	}
}

/// Inputs of one topic × language accumulation run.
#[derive(Debug, Clone)]
pub struct RunSpec {
	pub topic: Topic,
	pub language: Language,
	pub keywords: PathBuf,
	/// Batch export directories in priority order.
	pub batch_dirs: Vec<PathBuf>,
}
impl RunSpec {
	/// Every selected topic × language, grouped by language.
	pub fn from_config(cfg: &Config) -> Result<Vec<Self>> {
		let mut specs = Vec::new();

		for &language in &cfg.run.languages {
			for &topic in &cfg.run.topics {
				let keywords = cfg.keyword_path(topic, language).ok_or_else(|| {
					Error::InvalidConfig { message: format!("keywords.{topic}.{language} is not set.") }
				})?;
				let batch_dirs = cfg.batch_dirs(topic, language).ok_or_else(|| {
					Error::InvalidConfig { message: format!("batches.{topic}.{language} is not set.") }
				})?;

				specs.push(Self {
					topic,
					language,
					keywords: keywords.to_path_buf(),
					batch_dirs: batch_dirs.to_vec(),
				});
			}
		}

		Ok(specs)
	}
}

#[derive(Debug, Clone)]
pub struct RunReport {
	pub topic: Topic,
	pub language: Language,
	pub keywords: usize,
	pub blank_lines: usize,
	pub documents: usize,
	pub tagged: usize,
	pub accumulation: AccumulationStats,
	/// `None` for dry runs.
	pub upload: Option<UploadReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
	pub topic: Topic,
	pub language: Language,
	pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
	pub runs: Vec<RunReport>,
	pub failures: Vec<RunFailure>,
}
impl IngestReport {
	/// Every run finished and every insert succeeded. Individual failed searches do not count
	/// against it.
	pub fn is_success(&self) -> bool {
		self.failures.is_empty() && self.failed_uploads() == 0
	}

	pub fn failed_uploads(&self) -> usize {
		self.runs.iter().filter_map(|run| run.upload.as_ref()).map(|up| up.failures.len()).sum()
	}

	pub fn failed_searches(&self) -> usize {
		self.runs.iter().map(|run| run.accumulation.failed_searches()).sum()
	}

	pub fn summary(&self) -> String {
		let documents = self.runs.iter().map(|run| run.documents).sum::<usize>();
		let tagged = self.runs.iter().map(|run| run.tagged).sum::<usize>();
		let inserted = self
			.runs
			.iter()
			.filter_map(|run| run.upload.as_ref())
			.map(|up| up.inserted)
			.sum::<usize>();
		let mut out = format!(
			"{} runs completed, {} failed; {documents} documents scored, {tagged} tagged; {inserted} inserted, {} failed inserts; {} failed searches.",
			self.runs.len(),
			self.failures.len(),
			self.failed_uploads(),
			self.failed_searches(),
		);

		for failure in &self.failures {
			let _ = write!(
				out,
				"\n{} {}: run failed: {}",
				failure.topic, failure.language, failure.message
			);
		}
		for run in &self.runs {
			if let Some(up) = run.upload.as_ref() {
				for failure in &up.failures {
					let _ = write!(
						out,
						"\n{} {}: insert of {} failed: {}",
						run.topic, run.language, failure.doc_id, failure.message
					);
				}
			}
			for failure in &run.accumulation.failed {
				let _ = write!(
					out,
					"\n{} {}: search for {:?} failed: {}",
					run.topic, run.language, failure.phrase, failure.message
				);
			}
		}

		out
	}
}

#[derive(Clone)]
struct RunContext {
	settings: RunSettings,
	providers: Providers,
	batches: Arc<BatchSourceCache>,
}

/// Drives every topic × language run: search, score, tag, and upload.
pub struct TopicScoreService {
	ctx: RunContext,
	specs: Vec<RunSpec>,
}
impl TopicScoreService {
	pub fn new(cfg: &Config, providers: Providers) -> Result<Self> {
		Self::with_runs(RunSettings::from_config(cfg), RunSpec::from_config(cfg)?, providers)
	}

	pub fn with_runs(
		settings: RunSettings,
		specs: Vec<RunSpec>,
		providers: Providers,
	) -> Result<Self> {
		if settings.upload && providers.sink.is_none() {
			return Err(Error::InvalidConfig {
				message: "Upload is enabled but no document sink was provided.".to_string(),
			});
		}
		if settings.max_parallel_runs == 0 {
			return Err(Error::InvalidConfig {
				message: "max_parallel_runs must be greater than zero.".to_string(),
			});
		}

		let ctx = RunContext { settings, providers, batches: Arc::new(BatchSourceCache::new()) };

		Ok(Self { ctx, specs })
	}

	pub fn specs(&self) -> &[RunSpec] {
		&self.specs
	}

	pub async fn run_one(&self, spec: &RunSpec) -> Result<RunReport> {
		execute_run(self.ctx.clone(), spec.clone()).await
	}

	/// Runs every spec on a bounded worker pool and returns once all of them, uploads
	/// included, have finished.
	pub async fn run_all(&self) -> IngestReport {
		let semaphore = Arc::new(Semaphore::new(self.ctx.settings.max_parallel_runs));
		let mut tasks = JoinSet::new();
		let mut report = IngestReport::default();
		let mut aborted = Vec::new();

		for spec in self.specs.iter().cloned() {
			let ctx = self.ctx.clone();
			let semaphore = semaphore.clone();

			tasks.spawn(async move {
				let (topic, language) = (spec.topic, spec.language);
				let result = match semaphore.acquire_owned().await {
					Ok(_permit) => execute_run(ctx, spec).await,
					Err(err) => Err(Error::Task { message: err.to_string() }),
				};

				(topic, language, result)
			});
		}

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok((_, _, Ok(run))) => report.runs.push(run),
				Ok((topic, language, Err(err))) => {
					tracing::error!(%topic, %language, error = %err, "Run failed.");

					report.failures.push(RunFailure { topic, language, message: err.to_string() });
				},
				Err(err) => {
					tracing::error!(error = %err, "Run task aborted.");

					aborted.push(err.to_string());
				},
			}
		}

		if !aborted.is_empty() {
			for spec in &self.specs {
				let finished = report
					.runs
					.iter()
					.map(|run| (run.topic, run.language))
					.chain(report.failures.iter().map(|failure| (failure.topic, failure.language)))
					.any(|key| key == (spec.topic, spec.language));

				if !finished {
					report.failures.push(RunFailure {
						topic: spec.topic,
						language: spec.language,
						message: format!("Task aborted: {}", aborted.join("; ")),
					});
				}
			}
		}

		report.runs.sort_by_key(|run| (run.language, run.topic));
		report.failures.sort_by_key(|failure| (failure.language, failure.topic));

		if self.ctx.settings.upload {
			log_language_totals(&report);
		}

		report
	}
}

async fn execute_run(ctx: RunContext, spec: RunSpec) -> Result<RunReport> {
	let RunSpec { topic, language, keywords, batch_dirs } = spec;
	let list = topicscore_domain::load_keyword_list(&keywords)?;

	if list.blank_lines > 0 {
		tracing::warn!(
			%topic,
			%language,
			path = %keywords.display(),
			blank_lines = list.blank_lines,
			"Ignoring blank keyword lines."
		);
	}

	let sources = ctx.batches.load_sources(&batch_dirs).await?;

	tracing::info!(%topic, %language, keywords = list.phrases.len(), "Scoring {topic} articles.");

	let mut acc = ScoreAccumulator::new(topic);
	let accumulation = acc
		.accumulate(
			ctx.providers.search.as_ref(),
			&ctx.settings.field,
			&list.phrases,
			ctx.settings.search_timeout,
		)
		.await;

	if accumulation.all_searches_failed() {
		return Err(Error::Search {
			message: format!(
				"All {} searches for {topic} {language} failed; the backend looks unreachable.",
				accumulation.queries
			),
		});
	}

	tracing::info!(%topic, %language, count = acc.len(), "Number of {topic} scored articles.");

	if acc.is_empty() {
		tracing::warn!(%topic, %language, "No documents matched any keyword phrase.");
	}

	let tagged =
		provenance::resolve_provenance(acc.documents_mut(), &sources, ctx.settings.match_policy);

	tracing::info!(%topic, %language, count = tagged, "Number of documents with query field.");

	let documents = acc.len();
	let upload = match ctx.providers.sink.as_deref() {
		Some(sink) if ctx.settings.upload =>
			Some(upload::upload_documents(sink, topic, language, acc.into_documents()).await),
		_ => {
			tracing::info!(%topic, %language, "Dry run; skipping upload.");

			None
		},
	};

	Ok(RunReport {
		topic,
		language,
		keywords: list.phrases.len(),
		blank_lines: list.blank_lines,
		documents,
		tagged,
		accumulation,
		upload,
	})
}

fn log_language_totals(report: &IngestReport) {
	let mut totals = BTreeMap::<Language, (usize, usize)>::new();

	for run in &report.runs {
		if let Some(up) = run.upload.as_ref() {
			let entry = totals.entry(run.language).or_default();

			entry.0 += up.inserted;
			entry.1 += up.failures.len();
		}
	}
	for (language, (inserted, failed)) in totals {
		tracing::info!(%language, inserted, failed, "Uploads complete for language.");
	}
}
