use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// How a topic turns one keyword phrase into a backend query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStyle {
	/// Split into tokens, drop stop-words, AND the tokens together, strip reserved characters.
	Cleaned,
	/// Query the phrase verbatim as a single quoted clause.
	RawPhrase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
	Climate,
	Covid,
	Immigration,
}
impl Topic {
	pub const ALL: [Self; 3] = [Self::Climate, Self::Covid, Self::Immigration];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Climate => "climate",
			Self::Covid => "covid",
			Self::Immigration => "immigration",
		}
	}

	pub fn query_style(self) -> QueryStyle {
		match self {
			Self::Climate | Self::Covid => QueryStyle::Cleaned,
			Self::Immigration => QueryStyle::RawPhrase,
		}
	}

	/// Payload key carrying the match count, e.g. `climate_score`.
	pub fn score_field(self) -> String {
		format!("{}_score", self.as_str())
	}

	/// Payload key carrying the matched phrases, e.g. `climate_found_keywords`.
	pub fn found_keywords_field(self) -> String {
		format!("{}_found_keywords", self.as_str())
	}
}
impl fmt::Display for Topic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Topic {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"climate" => Ok(Self::Climate),
			"covid" => Ok(Self::Covid),
			"immigration" => Ok(Self::Immigration),
			_ => Err(Error::UnknownTopic(raw.to_string())),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
	En,
	Es,
}
impl Language {
	pub const ALL: [Self; 2] = [Self::En, Self::Es];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::En => "en",
			Self::Es => "es",
		}
	}
}
impl fmt::Display for Language {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Language {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"en" => Ok(Self::En),
			"es" => Ok(Self::Es),
			_ => Err(Error::UnknownLanguage(raw.to_string())),
		}
	}
}
