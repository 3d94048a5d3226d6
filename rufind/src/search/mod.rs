pub mod engine;
pub mod session;

pub use engine::{MatchStream, SearchEngine};
pub use session::InteractiveSession;
