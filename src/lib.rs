pub mod args;
pub mod audio;
pub mod config;
pub mod detector;
pub mod energy;

pub use detector::{CountedEvent, DetectorConfig, DetectorState, Session};
pub use energy::EnergyFrame;
