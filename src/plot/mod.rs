//! Terminal plotting.
//!
//! - fixed-grid ASCII charts for CLI output (`ascii`)

pub mod ascii;

pub use ascii::*;
