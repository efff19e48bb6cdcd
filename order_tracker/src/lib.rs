pub mod config;
pub mod error;
pub mod orderbook;
pub mod polling;
pub mod presenter;
pub mod status;
#[cfg(test)]
pub mod tests;
pub mod utils;
