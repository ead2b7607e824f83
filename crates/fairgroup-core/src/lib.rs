pub mod config;
pub mod types;

pub use config::FairGroupConfig;
pub use types::*;
