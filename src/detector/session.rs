use anyhow::{bail, Result};
use log::{debug, info};

use super::config::DetectorConfig;
use super::floor::NoiseFloor;
use crate::energy::EnergyFrame;

/// Classification of the current frame run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Silence,
    Whistling,
}

/// A finalized whistle accepted by the duration filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountedEvent {
    pub start: f64,
    pub end: f64,
}

impl CountedEvent {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Detection phase. `PendingClose` is `Silence` as far as the hysteresis
/// thresholds and floor adaptation are concerned, but it remembers the
/// provisionally-ended candidate so a quick re-onset can merge into it.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Silence,
    Whistling { start: f64 },
    PendingClose { start: f64, end: f64 },
}

/// Per-stream detection state: noise floor, hysteresis phase, the open
/// candidate and the running count. One session per stream; feed frames in
/// order through [`Session::push`] and flush once with [`Session::finish`].
#[derive(Debug)]
pub struct Session {
    cfg: DetectorConfig,
    floor: NoiseFloor,
    phase: Phase,
    count: u64,
    last_time: Option<f64>,
}

impl Session {
    pub fn new(cfg: DetectorConfig) -> Result<Self> {
        cfg.validate()?;
        let floor = match cfg.floor {
            Some(seed) => NoiseFloor::seeded(cfg.alpha, seed),
            None => NoiseFloor::new(cfg.alpha),
        };
        Ok(Self {
            cfg,
            floor,
            phase: Phase::Silence,
            count: 0,
            last_time: None,
        })
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn state(&self) -> DetectorState {
        match self.phase {
            Phase::Whistling { .. } => DetectorState::Whistling,
            Phase::Silence | Phase::PendingClose { .. } => DetectorState::Silence,
        }
    }

    pub fn noise_floor(&self) -> Option<f64> {
        self.floor.level()
    }

    /// Processes one frame. Returns a counted event when this frame caused a
    /// candidate to finalize and pass the duration filter.
    ///
    /// Thresholds are evaluated against the floor as it stood before this
    /// frame; the floor then adapts unless the frame ended up inside a
    /// whistle. A frame that merely seeds the floor drives no detection.
    pub fn push(&mut self, frame: EnergyFrame) -> Result<Option<CountedEvent>> {
        if !frame.time.is_finite() {
            bail!("invalid timestamp {}: timestamps must be finite", frame.time);
        }
        if !frame.energy.is_finite() || frame.energy < 0.0 {
            bail!(
                "invalid energy {} at t={:.3}s: energies must be finite and non-negative",
                frame.energy,
                frame.time
            );
        }
        if let Some(prev) = self.last_time {
            if frame.time <= prev {
                bail!(
                    "non-monotonic timestamp {:.3}s after {:.3}s",
                    frame.time,
                    prev
                );
            }
        }
        self.last_time = Some(frame.time);

        let Some(floor) = self.floor.level() else {
            self.floor.observe(frame.energy, false);
            return Ok(None);
        };

        let onset = frame.energy >= floor * self.cfg.rise;
        let offset = frame.energy < floor * self.cfg.fall;

        let mut closed = None;
        self.phase = match self.phase {
            Phase::Silence if onset => Phase::Whistling { start: frame.time },
            Phase::Silence => Phase::Silence,
            Phase::Whistling { start } if offset => Phase::PendingClose {
                start,
                end: frame.time,
            },
            Phase::Whistling { start } => Phase::Whistling { start },
            Phase::PendingClose { start, end } if onset => {
                if frame.time - end <= self.cfg.hold {
                    // Gap short enough to bridge: same whistle, original start.
                    Phase::Whistling { start }
                } else {
                    closed = Some((start, end));
                    Phase::Whistling { start: frame.time }
                }
            }
            Phase::PendingClose { start, end } if frame.time - end > self.cfg.hold => {
                closed = Some((start, end));
                Phase::Silence
            }
            Phase::PendingClose { start, end } => Phase::PendingClose { start, end },
        };

        let active = matches!(self.phase, Phase::Whistling { .. });
        self.floor.observe(frame.energy, active);

        Ok(closed.and_then(|(start, end)| self.accept(start, end)))
    }

    /// Flushes the open or provisionally-ended candidate at end-of-stream.
    pub fn finish(&mut self) -> Option<CountedEvent> {
        let phase = std::mem::replace(&mut self.phase, Phase::Silence);
        match phase {
            Phase::Silence => None,
            Phase::Whistling { start } => {
                let end = self.last_time.unwrap_or(start);
                self.accept(start, end)
            }
            Phase::PendingClose { start, end } => self.accept(start, end),
        }
    }

    fn accept(&mut self, start: f64, end: f64) -> Option<CountedEvent> {
        if start < self.cfg.warmup {
            debug!(
                "discarding whistle at {:.2}s: started inside the {:.2}s warm-up",
                start, self.cfg.warmup
            );
            return None;
        }
        let duration = end - start;
        if duration < self.cfg.min || duration > self.cfg.max {
            debug!(
                "ignoring whistle at {:.2}s: duration {:.2}s outside [{:.2}, {:.2}]",
                start, duration, self.cfg.min, self.cfg.max
            );
            return None;
        }
        self.count += 1;
        info!(
            "whistle #{}: {:.2}s..{:.2}s ({:.2}s)",
            self.count, start, end, duration
        );
        Some(CountedEvent { start, end })
    }
}
