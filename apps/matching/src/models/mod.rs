pub mod job;
pub mod portfolio;
