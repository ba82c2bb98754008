use clap::Parser;

use crate::config::FileConfig;
use crate::detector::DetectorConfig;
use crate::energy::EnvelopeConfig;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Adaptive energy-envelope whistle counter for cooking appliances.")]
pub struct Cli {
    /// Audio file to analyze (any format symphonia can decode).
    pub input: String,

    /// Minimum whistle length that counts (s).
    #[arg(long)]
    pub min: Option<f64>,
    /// Maximum whistle length that counts (s).
    #[arg(long)]
    pub max: Option<f64>,
    /// A whistle starts at rise x noise_floor.
    #[arg(long)]
    pub rise: Option<f64>,
    /// A whistle ends below fall x noise_floor.
    #[arg(long)]
    pub fall: Option<f64>,
    /// Silence gap still merged into the same whistle (s).
    #[arg(long)]
    pub hold: Option<f64>,
    /// Noise-floor smoothing factor in (0, 1).
    #[arg(long)]
    pub alpha: Option<f64>,
    /// Initial period whose whistle starts are discarded (s).
    #[arg(long)]
    pub warmup: Option<f64>,
    /// Seed the noise floor instead of learning it from the first frame.
    #[arg(long)]
    pub floor: Option<f64>,
    /// Energy analysis window length (s).
    #[arg(long)]
    pub frame: Option<f64>,
    /// High-pass cutoff (Hz) applied before energy extraction.
    #[arg(long)]
    pub highpass: Option<f64>,
    /// Config file path; defaults to the per-user config.kdl when present.
    #[arg(long)]
    pub config: Option<String>,
    /// Print each counted whistle as "start end duration".
    #[arg(long)]
    pub events: bool,
}

impl Cli {
    /// Folds file-level defaults and command-line overrides into the
    /// effective settings. Precedence: CLI flag, then config file, then the
    /// built-in default.
    pub fn resolve(&self, file: &FileConfig) -> (DetectorConfig, EnvelopeConfig) {
        let d = file.detector.clone().unwrap_or_default();
        let e = file.energy.clone().unwrap_or_default();

        let base = DetectorConfig::default();
        let detector = DetectorConfig {
            min: self.min.or(d.min).unwrap_or(base.min),
            max: self.max.or(d.max).unwrap_or(base.max),
            rise: self.rise.or(d.rise).unwrap_or(base.rise),
            fall: self.fall.or(d.fall).unwrap_or(base.fall),
            hold: self.hold.or(d.hold).unwrap_or(base.hold),
            alpha: self.alpha.or(d.alpha).unwrap_or(base.alpha),
            warmup: self.warmup.or(d.warmup).unwrap_or(base.warmup),
            floor: self.floor.or(d.floor),
        };

        let base = EnvelopeConfig::default();
        let envelope = EnvelopeConfig {
            frame: self.frame.or(e.frame).unwrap_or(base.frame),
            highpass: self.highpass.or(e.highpass),
        };

        (detector, envelope)
    }
}
