pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::TallerConfig;
pub use error::{Result, TallerError};
pub use types::*;
