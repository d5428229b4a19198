//! Domain models for the Bakery Admin platform

mod catalog;
mod content;
mod order;
mod stock;
mod user;

pub use catalog::*;
pub use content::*;
pub use order::*;
pub use stock::*;
pub use user::*;
