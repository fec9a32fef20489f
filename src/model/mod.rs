pub mod categories;
pub mod tasks;
mod types;

pub use categories::Category;
pub use tasks::Task;
pub use types::CategoryId;
