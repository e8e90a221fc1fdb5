pub mod config;
pub mod error;
pub mod http_client;
pub mod predict_fetch;
pub mod prediction;
pub mod provider;
pub mod squad;
pub mod state;
