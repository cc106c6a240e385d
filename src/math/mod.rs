//! Numeric helpers.
//!
//! - least-squares solver for the linear autoregressive baseline (`ols`)

pub mod ols;

pub use ols::*;
