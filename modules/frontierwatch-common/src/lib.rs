pub mod config;
pub mod error;
pub mod timestamp;
pub mod types;

pub use config::{Config, FileConfig, Secrets};
pub use error::FrontierError;
pub use timestamp::Published;
pub use types::*;
