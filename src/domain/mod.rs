pub mod equipment;
pub mod error;
