pub mod task;
pub mod flat;
pub mod section;
pub mod config;

pub use task::*;
pub use flat::*;
pub use section::*;
pub use config::*;
