pub mod accumulate;
pub mod batch_source;
pub mod pipeline;
pub mod provenance;
pub mod sink;
pub mod upload;

mod error;

pub use accumulate::{AccumulationStats, FailedQuery, ScoreAccumulator, ScoredDocument};
pub use batch_source::{BatchSource, BatchSourceCache, LinkSet};
pub use error::{Error, Result};
pub use pipeline::{IngestReport, RunFailure, RunReport, RunSettings, RunSpec, TopicScoreService};
pub use provenance::{provenance_label, resolve_provenance};
pub use sink::{DocumentRecord, PgDocumentSink};
pub use upload::{UploadFailure, UploadReport, upload_documents};

use std::{future::Future, pin::Pin, sync::Arc};

use topicscore_domain::{Language, SearchDocument};
use topicscore_providers::SolrClient;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executes one backend query and returns a bounded, possibly non-exhaustive result list.
pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<SearchDocument>>>;
}

/// Persists one document into the partition of `language`.
pub trait DocumentSink
where
	Self: Send + Sync,
{
	fn insert<'a>(
		&'a self,
		language: Language,
		record: &'a DocumentRecord,
	) -> BoxFuture<'a, Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub search: Arc<dyn SearchProvider>,
	/// `None` for dry runs.
	pub sink: Option<Arc<dyn DocumentSink>>,
}

impl SearchProvider for SolrClient {
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<SearchDocument>>> {
		Box::pin(async move { Ok(SolrClient::search(self, query).await?) })
	}
}
