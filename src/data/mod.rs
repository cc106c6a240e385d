//! Data acquisition.
//!
//! - live fetch from the EIA open-data API (`eia`)
//! - seeded synthetic series for offline/demo runs (`sample`)

pub mod eia;
pub mod sample;

pub use eia::EiaClient;
pub use sample::generate_series;
