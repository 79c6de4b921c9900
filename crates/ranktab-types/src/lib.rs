pub mod config;
pub mod error;
pub mod host;
pub mod table;

pub use error::ConfigError;
pub use host::HostAddress;
pub use table::{DeviceEntry, RankTable, ServerEntry};
