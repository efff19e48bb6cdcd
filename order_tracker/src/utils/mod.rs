pub mod date;
pub mod number_conversion;
