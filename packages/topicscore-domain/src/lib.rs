pub mod document;
pub mod keywords;
pub mod query;
pub mod topic;

mod error;

pub use document::SearchDocument;
pub use error::{Error, Result};
pub use keywords::{
	KeywordList, STOP_WORDS, load_keyword_list, normalize_phrase, parse_keyword_list,
};
pub use query::{build_phrase_query, query_for_phrase, strip_reserved};
pub use topic::{Language, QueryStyle, Topic};
