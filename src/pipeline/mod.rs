//! Question answering over the populated index.

pub mod prompt;
pub mod query;
pub mod response;

pub use query::QueryPipeline;
pub use response::{append_sources, clean_response};
