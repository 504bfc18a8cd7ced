/// Record parsing and directory discovery.
pub mod store;
