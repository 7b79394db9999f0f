pub mod app;
pub mod common;
pub mod config;
pub mod extract;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod sites;
