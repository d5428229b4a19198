//! HTTP request handlers

pub mod auth;
pub mod catalog;
pub mod content;
pub mod health;
pub mod media;
pub mod orders;
pub mod reporting;
pub mod stock;
pub mod users;

pub use auth::*;
pub use catalog::*;
pub use content::*;
pub use health::*;
pub use media::*;
pub use orders::*;
pub use reporting::*;
pub use stock::*;
pub use users::*;
