pub mod aggregate;
pub mod listener;
pub mod models;

pub use aggregate::AccountAggregate;
pub use listener::{AccountListener, EmptyAccountListener};
pub use models::{AccountState, User};
