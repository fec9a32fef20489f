pub mod categories;
pub mod features;
pub mod filter;
pub mod tasks;
