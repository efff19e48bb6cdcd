pub mod api_response;
pub mod asset;
pub mod order;
pub mod quote;
pub mod status;
