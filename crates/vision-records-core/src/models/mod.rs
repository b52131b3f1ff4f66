//! Domain models for the vision-records system.

mod patient;

pub use patient::*;
