pub mod manager;
pub mod rows;

pub use manager::{Database, DbError};
