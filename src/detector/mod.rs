pub mod config;
pub mod floor;
pub mod session;

pub use config::DetectorConfig;
pub use floor::NoiseFloor;
pub use session::{CountedEvent, DetectorState, Session};
