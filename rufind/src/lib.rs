pub mod config;
pub mod errors;
pub mod matcher;
pub mod results;
pub mod search;
pub mod walker;

pub use config::{SearchConfig, SearchRequest};
pub use errors::{SearchError, SearchResult};
pub use results::{LineMatch, MatchRecord};
pub use search::{InteractiveSession, MatchStream, SearchEngine};
