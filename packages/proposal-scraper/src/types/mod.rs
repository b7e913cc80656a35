pub mod config;
pub mod job;
pub mod report;
pub mod section;
