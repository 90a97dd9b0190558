// Export all modules used by the binary and the integration tests
pub mod aggregation;
pub mod charts;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod utils;
