pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod sample;
pub mod stats;
