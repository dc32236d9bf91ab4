//! Course catalog advisor: ingests the university catalog into a vector
//! index and answers questions about it over HTTP.

pub mod core;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod server;
pub mod session;
pub mod sources;
pub mod state;
pub mod vector;
