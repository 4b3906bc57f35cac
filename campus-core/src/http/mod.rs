pub mod api_result;
pub mod request_handler;
pub mod response;

pub use api_result::ApiResult;
