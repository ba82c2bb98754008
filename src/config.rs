use knuffel::Decode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional KDL config file carrying detector and envelope defaults, e.g.:
///
/// ```kdl
/// detector min=0.8 max=12.0 rise=5.0 fall=2.5 hold=0.3 alpha=0.02 warmup=1.0
/// energy frame=0.064 highpass=300.0
/// ```
///
/// Command-line flags override anything set here.
#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[knuffel(child)]
    pub detector: Option<DetectorDefaults>,
    #[knuffel(child)]
    pub energy: Option<EnergyDefaults>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorDefaults {
    #[knuffel(property)]
    pub min: Option<f64>,
    #[knuffel(property)]
    pub max: Option<f64>,
    #[knuffel(property)]
    pub rise: Option<f64>,
    #[knuffel(property)]
    pub fall: Option<f64>,
    #[knuffel(property)]
    pub hold: Option<f64>,
    #[knuffel(property)]
    pub alpha: Option<f64>,
    #[knuffel(property)]
    pub warmup: Option<f64>,
    #[knuffel(property)]
    pub floor: Option<f64>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergyDefaults {
    #[knuffel(property)]
    pub frame: Option<f64>,
    #[knuffel(property)]
    pub highpass: Option<f64>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = knuffel::parse("config.kdl", &content)?;
        Ok(config)
    }

    /// The per-user config location, if the platform provides one.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "whistlecount", "whistlecount")
            .map(|dirs| dirs.config_dir().join("config.kdl"))
    }
}
