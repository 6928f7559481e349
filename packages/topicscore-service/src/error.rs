use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Domain(#[from] topicscore_domain::Error),
	#[error("Failed to read batch directory {path:?}.")]
	ReadBatchDir { path: PathBuf, source: std::io::Error },
	#[error("Failed to read batch file {path:?}.")]
	ReadBatchFile { path: PathBuf, source: csv::Error },
	#[error("Batch file {path:?} is missing the {column:?} column.")]
	MissingColumn { path: PathBuf, column: &'static str },
	#[error("Search error: {message}")]
	Search { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Invalid configuration: {message}")]
	InvalidConfig { message: String },
	#[error("Task error: {message}")]
	Task { message: String },
}
impl From<topicscore_providers::Error> for Error {
	fn from(err: topicscore_providers::Error) -> Self {
		Self::Search { message: err.to_string() }
	}
}

impl From<topicscore_storage::Error> for Error {
	fn from(err: topicscore_storage::Error) -> Self {
		match err {
			topicscore_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			topicscore_storage::Error::InvalidArgument(message) => Self::InvalidConfig { message },
		}
	}
}

impl From<tokio::task::JoinError> for Error {
	fn from(err: tokio::task::JoinError) -> Self {
		Self::Task { message: err.to_string() }
	}
}
