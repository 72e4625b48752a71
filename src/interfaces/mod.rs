pub mod cli;
pub mod tables;
