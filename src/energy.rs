use anyhow::{anyhow, bail, Result};
use biquad::{Biquad, Coefficients, DirectForm1, ToHertz, Type};
use log::debug;

/// One sample of the audio energy envelope: the stream the detector consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyFrame {
    /// Seconds from the start of the stream, strictly increasing.
    pub time: f64,
    /// Non-negative short-term energy.
    pub energy: f64,
}

/// Envelope extraction settings.
#[derive(Debug, Clone)]
pub struct EnvelopeConfig {
    /// Analysis window length in seconds; one frame per window.
    pub frame: f64,
    /// Optional high-pass cutoff (Hz) applied before energy extraction, to
    /// keep rumble and DC offset out of the noise floor.
    pub highpass: Option<f64>,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            // 1024 samples at 16 kHz.
            frame: 0.064,
            highpass: None,
        }
    }
}

impl EnvelopeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame <= 0.0 {
            bail!("frame length must be positive, got {}", self.frame);
        }
        if self.highpass.map_or(false, |c| c <= 0.0) {
            bail!("high-pass cutoff must be positive");
        }
        Ok(())
    }
}

/// Root-mean-square energy of a mono chunk. The stabilizer keeps digital
/// silence strictly positive so ratio thresholds stay well-defined.
pub fn rms(chunk: &[f64]) -> f64 {
    if chunk.is_empty() {
        return 0.0;
    }
    let mean_sq = chunk.iter().map(|&x| x * x).sum::<f64>() / chunk.len() as f64;
    (mean_sq + 1e-12).sqrt()
}

/// Reduces decoded mono samples to a fixed-rate energy envelope. Frames are
/// stamped with the start time of their window.
pub fn envelope(samples: &[f64], sample_rate: u32, cfg: &EnvelopeConfig) -> Result<Vec<EnergyFrame>> {
    cfg.validate()?;
    if sample_rate == 0 {
        bail!("sample rate must be positive");
    }

    let conditioned;
    let samples = match cfg.highpass {
        Some(cutoff) => {
            conditioned = high_pass(samples, sample_rate, cutoff)?;
            &conditioned[..]
        }
        None => samples,
    };

    let hop = ((cfg.frame * sample_rate as f64) as usize).max(1);
    let frames: Vec<EnergyFrame> = samples
        .chunks(hop)
        .enumerate()
        .map(|(i, chunk)| EnergyFrame {
            time: (i * hop) as f64 / sample_rate as f64,
            energy: rms(chunk),
        })
        .collect();
    debug!(
        "envelope: {} frames of {} samples ({:.1} fps)",
        frames.len(),
        hop,
        sample_rate as f64 / hop as f64
    );
    Ok(frames)
}

/// Zero-phase high-pass: forward pass, then a backward pass with the filter
/// state reset, so the envelope is not skewed in time.
fn high_pass(samples: &[f64], sample_rate: u32, cutoff: f64) -> Result<Vec<f64>> {
    let nyquist = sample_rate as f64 / 2.0;
    if !(cutoff > 0.0 && cutoff < nyquist) {
        bail!(
            "high-pass cutoff must lie in (0, {}) Hz at {} Hz, got {}",
            nyquist,
            sample_rate,
            cutoff
        );
    }
    let coeffs =
        Coefficients::<f64>::from_params(Type::HighPass, (sample_rate as f64).hz(), cutoff.hz(), 0.707)
            .map_err(|_| anyhow!("invalid high-pass cutoff {} Hz at {} Hz", cutoff, sample_rate))?;
    let mut filter = DirectForm1::<f64>::new(coeffs);

    let mut out: Vec<f64> = samples.to_vec();
    out.iter_mut().for_each(|x| *x = filter.run(*x));
    filter.reset_state();
    out.reverse();
    out.iter_mut().for_each(|x| *x = filter.run(*x));
    out.reverse();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_constant_signal() {
        let chunk = vec![0.5; 256];
        assert!((rms(&chunk) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rms_of_silence_is_tiny_but_positive() {
        let chunk = vec![0.0; 256];
        let e = rms(&chunk);
        assert!(e > 0.0);
        assert!(e < 1e-5);
    }

    #[test]
    fn envelope_framing_and_timestamps() {
        // 1 s of audio at 1 kHz with 0.1 s frames: 10 frames, 0.1 s apart.
        let samples = vec![0.25; 1000];
        let cfg = EnvelopeConfig {
            frame: 0.1,
            highpass: None,
        };
        let frames = envelope(&samples, 1000, &cfg).unwrap();
        assert_eq!(frames.len(), 10);
        for (i, frame) in frames.iter().enumerate() {
            assert!((frame.time - i as f64 * 0.1).abs() < 1e-9);
            assert!((frame.energy - 0.25).abs() < 1e-6);
        }
        let monotonic = frames.windows(2).all(|w| w[1].time > w[0].time);
        assert!(monotonic);
    }

    #[test]
    fn envelope_rejects_bad_frame_length() {
        assert!(envelope(&[0.0], 16000, &EnvelopeConfig { frame: 0.0, highpass: None }).is_err());
    }

    #[test]
    fn envelope_rejects_negative_highpass_cutoff() {
        let samples = vec![0.1; 800];
        for cutoff in [-100.0, 0.0] {
            let cfg = EnvelopeConfig {
                frame: 0.05,
                highpass: Some(cutoff),
            };
            assert!(
                envelope(&samples, 16000, &cfg).is_err(),
                "cutoff {} accepted",
                cutoff
            );
        }
    }

    #[test]
    fn envelope_rejects_cutoff_at_or_above_nyquist() {
        let samples = vec![0.1; 800];
        let cfg = EnvelopeConfig {
            frame: 0.05,
            highpass: Some(8000.0),
        };
        assert!(envelope(&samples, 16000, &cfg).is_err());
    }

    #[test]
    fn validate_catches_bad_settings_before_any_audio_work() {
        assert!(EnvelopeConfig { frame: -1.0, highpass: None }.validate().is_err());
        assert!(EnvelopeConfig { frame: 0.064, highpass: Some(-1.0) }.validate().is_err());
        assert!(EnvelopeConfig::default().validate().is_ok());
    }

    #[test]
    fn high_pass_removes_dc_offset() {
        let samples = vec![1.0; 4000];
        let cfg = EnvelopeConfig {
            frame: 0.05,
            highpass: Some(200.0),
        };
        let filtered = envelope(&samples, 8000, &cfg).unwrap();
        let raw = envelope(
            &samples,
            8000,
            &EnvelopeConfig {
                frame: 0.05,
                highpass: None,
            },
        )
        .unwrap();
        // Interior frames of a DC signal should be near-silent after the
        // high-pass; without it they sit at full level.
        assert!((raw[4].energy - 1.0).abs() < 1e-6);
        assert!(filtered[4].energy < 0.05);
    }
}
