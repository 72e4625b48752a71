pub mod aggregate;
pub mod batch;
