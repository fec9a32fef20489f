mod flags;
mod store;

pub use flags::StaticFlagSource;
pub use store::InMemoryStore;
