//! Input/output helpers.
//!
//! - result exports (CSV) (`export`)
//! - forecast JSON read/write (`forecast_file`)

pub mod export;
pub mod forecast_file;

pub use export::*;
pub use forecast_file::*;
