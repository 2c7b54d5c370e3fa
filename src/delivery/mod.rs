pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod resolver;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use resolver::*;
