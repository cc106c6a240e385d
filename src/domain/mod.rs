//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration enums (`Granularity`) and the run config (`ForecastConfig`)
//! - cleaned price observations (`PricePoint`, `PriceSeries`, `CleanOutcome`)
//! - lag-feature framing (`LaggedRow`, `LagTable`, `TrainTestSplit`)
//! - forecast outputs (`HoldoutPoint`, `FutureForecastPoint`, `ForecastFile`)

pub mod types;

pub use types::*;
