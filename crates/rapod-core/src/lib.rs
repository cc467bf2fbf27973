pub mod config;
pub mod logging;

pub mod download;
pub mod fetch;
pub mod listing;
pub mod orchestrator;
pub mod pool;
pub mod probe;
pub mod resolver;
pub mod transport;
pub mod url_model;
