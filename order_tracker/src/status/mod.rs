//! Order status derivation: raw order + block heights -> `OrderStatus`
//! -> one of four labels shown to the user.

pub mod label;
pub mod resolver;

pub use label::{DisplayLabel, display_label};
pub use resolver::resolve_status;
