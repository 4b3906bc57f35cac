pub mod file_config;
pub mod request_handler;
