pub mod board;
pub mod order;
pub mod view;

pub use board::{InitiateOutcome, OrderBoard};
pub use order::{OrderPresenter, PresentedState};
pub use view::{ActionButton, OrderDetails, OrderRow};
