pub mod config;
pub mod math;
