pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read keyword list at {path:?}.")]
	ReadKeywords { path: std::path::PathBuf, source: std::io::Error },
	#[error("Unknown topic {0:?}; expected one of climate, covid, or immigration.")]
	UnknownTopic(String),
	#[error("Unknown language {0:?}; expected one of en or es.")]
	UnknownLanguage(String),
	#[error("Cannot build a query from an empty token list.")]
	EmptyQuery,
}
