pub mod board;
pub mod build;
pub mod drag;
pub mod flatten;
pub mod projection;
pub mod section_ops;
pub mod task_ops;
