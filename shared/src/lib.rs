//! Shared types and models for the Bakery Admin platform
//!
//! This crate contains the domain models and the pure business rules shared
//! between the backend and the browser (via WASM).

pub mod models;
pub mod selection;
pub mod types;
pub mod validation;

pub use models::*;
pub use selection::*;
pub use types::*;
pub use validation::*;
