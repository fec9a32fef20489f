pub mod error;
pub mod filter;
pub mod flags;
pub mod repositories;
pub mod todos;
