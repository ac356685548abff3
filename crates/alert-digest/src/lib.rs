pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod report;
pub mod sanitize;
pub mod sources;
pub mod summarizer;

#[cfg(test)]
mod test_server;

pub use error::{AlertError, Result};
