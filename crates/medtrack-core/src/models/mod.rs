//! Domain models for the medtrack system.

mod assignment;
mod health;
mod medication;
mod patient;

pub use assignment::*;
pub use health::*;
pub use medication::*;
pub use patient::*;
