pub mod address;
pub mod error;
pub mod model;
pub mod traits;
