pub mod config;
pub mod format;
pub mod time_range;
