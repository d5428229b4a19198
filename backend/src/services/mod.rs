//! Business logic services

pub mod auth;
pub mod catalog;
pub mod content;
pub mod media;
pub mod order;
pub mod reporting;
pub mod stock;
pub mod user;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use content::ContentService;
pub use media::MediaService;
pub use order::{OrderFeed, OrderService};
pub use reporting::ReportingService;
pub use stock::StockService;
pub use user::UserService;
