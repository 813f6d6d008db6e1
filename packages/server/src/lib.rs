// FormReach API server: HTTP surface over the outreach campaign core.

pub mod config;
pub mod domains;
pub mod http;

pub use config::Config;
