pub mod config;
pub mod error;
pub mod event;
pub mod network;
pub mod signature;

pub use error::{HookError, Result};
