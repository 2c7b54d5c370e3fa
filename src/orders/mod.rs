pub mod checkout;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod status_machine;
pub mod whatsapp;

pub use checkout::*;
pub use error::*;
pub use events::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
pub use status_machine::*;
pub use whatsapp::*;
