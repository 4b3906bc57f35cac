mod config;
pub mod config_module;
pub mod reader;

pub use config::*;
