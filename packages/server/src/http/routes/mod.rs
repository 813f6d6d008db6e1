pub mod campaign;
pub mod health;
pub mod results;
pub mod settings;

pub use campaign::{crawl_demo, get_stats, list_runs, submit_demo};
pub use health::health_handler;
pub use results::{clear_results, export_results, list_results};
pub use settings::{create_setting, delete_setting, list_settings, update_setting};
