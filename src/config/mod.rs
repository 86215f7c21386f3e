// Config module - JSON rule documents

pub mod storage;
pub mod types;

pub use storage::load;
pub use types::Config;
