pub mod config;
pub mod error;
pub mod http_client;
pub mod provider;
pub mod registry;
pub mod telemetry;
