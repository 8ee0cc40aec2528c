pub mod board;
pub mod column;
pub mod task;
