pub mod board_json;
pub mod file_store;
pub mod lock;
pub mod project_io;
pub mod seed;
pub mod store;
