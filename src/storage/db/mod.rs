mod database;
mod store;

pub use database::{DatabaseConnection, DatabaseConnectionRef};
pub use store::DbStore;
