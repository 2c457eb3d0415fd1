pub mod search;

pub use search::{HttpSearchClient, HttpSearchConfig, SearchWebTool};
