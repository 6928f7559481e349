use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use topicscore_domain::{Language, Topic};
use topicscore_providers::SolrClient;
use topicscore_service::{DocumentSink, PgDocumentSink, Providers, TopicScoreService};
use topicscore_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = topicscore_cli::VERSION,
	rename_all = "kebab",
	styles = topicscore_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Only score these topics. Repeatable; defaults to `run.topics`.
	#[arg(long = "topic", short = 't', value_name = "TOPIC")]
	pub topics: Vec<Topic>,
	/// Only score these languages. Repeatable; defaults to `run.languages`.
	#[arg(long = "language", short = 'l', value_name = "LANGUAGE")]
	pub languages: Vec<Language>,
	/// Score and tag documents without writing them to the store.
	#[arg(long)]
	pub dry_run: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let mut config = topicscore_config::load(&args.config)?;
	topicscore_config::apply_selection(&mut config, &args.topics, &args.languages);
	if args.dry_run {
		config.run.upload = false;
	}
	topicscore_config::validate(&config)?;
	init_tracing(&config);

	let search = SolrClient::new(&config.search)?;
	search.ping().await.map_err(|err| {
		eyre::eyre!("Search backend at {} is unreachable: {err}", config.search.url)
	})?;
	let sink = if config.run.upload {
		let db = Db::connect(&config.storage.postgres).await?;
		db.ensure_schema(&config.storage.collections).await?;
		let sink: Arc<dyn DocumentSink> =
			Arc::new(PgDocumentSink::new(db, config.storage.collections.clone()));
		Some(sink)
	} else {
		None
	};
	let providers = Providers { search: Arc::new(search), sink };
	let service = TopicScoreService::new(&config, providers)?;

	tracing::info!(
		runs = service.specs().len(),
		upload = config.run.upload,
		"Starting topic scoring."
	);

	let report = service.run_all().await;
	let summary = report.summary();

	if !report.is_success() {
		tracing::error!("{summary}");
		return Err(eyre::eyre!(summary));
	}

	tracing::info!("{summary}");
	Ok(())
}

fn init_tracing(config: &topicscore_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
