//! CSV interchange for patient records.
//!
//! Both directions speak the same dialect: a fixed 14-column layout, every
//! data field individually double-quoted with internal quotes doubled, rows
//! joined by `\n`. The decoder tolerates exactly what the encoder produces.

mod decode;
mod encode;
mod file;

pub use decode::*;
pub use encode::*;
pub use file::*;
