pub mod models;
pub mod store;

pub use models::CampaignSetting;
pub use store::{MemorySettingsStore, PostgresSettingsStore, SettingFields, SettingsStore};
