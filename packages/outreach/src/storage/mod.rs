pub mod memory;
pub mod postgres;

pub use memory::MemoryCampaignStore;
pub use postgres::PostgresCampaignStore;
