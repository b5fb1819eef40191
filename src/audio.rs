use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::state::VisualState;

/// Number of simulated frequency bins
pub const BIN_COUNT: usize = 128;

/// Seconds between target-level resamples
const SAMPLE_INTERVAL: f64 = 0.1;
/// Smoothing coefficients: respond quickly to increases, release slowly
const ATTACK: f64 = 0.25;
const DECAY: f64 = 0.08;

/// Simulated voice-session audio: a level in `0.0..=1.0` plus frequency
/// bins, resampled every 100 ms while the assistant is listening or
/// speaking and silent otherwise.
pub struct AudioSim {
    rng: StdRng,
    target: f64,
    level: f64,
    bins: [u8; BIN_COUNT],
    since_sample: f64,
}

impl AudioSim {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            target: 0.0,
            level: 0.0,
            bins: [0; BIN_COUNT],
            // resample on the first update
            since_sample: SAMPLE_INTERVAL,
        }
    }

    /// Advance the simulation by `dt` seconds.
    pub fn update(&mut self, state: VisualState, dt: f64) {
        self.since_sample += dt;
        if self.since_sample >= SAMPLE_INTERVAL {
            self.since_sample = 0.0;
            self.resample(state);
        }
        let diff = self.target - self.level;
        self.level += diff * if diff > 0.0 { ATTACK } else { DECAY };
        self.level = self.level.clamp(0.0, 1.0);
    }

    fn resample(&mut self, state: VisualState) {
        match state {
            VisualState::Listening | VisualState::Speaking => {
                self.target = 0.2 + self.rng.gen::<f64>() * 0.8;
                for (i, bin) in self.bins.iter_mut().enumerate() {
                    let f = i as f64 / BIN_COUNT as f64;
                    // voices live low in the spectrum
                    let emphasis = (-4.0 * f).exp();
                    let jitter = 0.5 + self.rng.gen::<f64>() * 0.5;
                    *bin = (self.target * 255.0 * emphasis * jitter) as u8;
                }
            }
            VisualState::Idle | VisualState::Thinking => {
                self.target = 0.0;
                self.bins = [0; BIN_COUNT];
            }
        }
    }

    /// Smoothed audio level in `0.0..=1.0`
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn bins(&self) -> &[u8; BIN_COUNT] {
        &self.bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn run(sim: &mut AudioSim, state: VisualState, seconds: f64) {
        let ticks = (seconds / DT) as usize;
        for _ in 0..ticks {
            sim.update(state, DT);
        }
    }

    #[test]
    fn seeded_simulations_are_identical() {
        let mut a = AudioSim::new(Some(7));
        let mut b = AudioSim::new(Some(7));
        for _ in 0..120 {
            a.update(VisualState::Listening, DT);
            b.update(VisualState::Listening, DT);
            assert_eq!(a.level(), b.level());
        }
        assert_eq!(a.bins(), b.bins());
    }

    #[test]
    fn level_stays_in_unit_range_and_rises_while_listening() {
        let mut sim = AudioSim::new(Some(42));
        run(&mut sim, VisualState::Listening, 2.0);
        assert!(sim.level() > 0.1, "level = {}", sim.level());
        assert!(sim.level() <= 1.0);
    }

    #[test]
    fn level_decays_to_silence_outside_listening_and_speaking() {
        let mut sim = AudioSim::new(Some(42));
        run(&mut sim, VisualState::Speaking, 2.0);
        assert!(sim.level() > 0.1);
        run(&mut sim, VisualState::Idle, 5.0);
        assert!(sim.level() < 1e-3, "level = {}", sim.level());
        assert!(sim.bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn bins_carry_low_frequency_emphasis() {
        let mut sim = AudioSim::new(Some(3));
        run(&mut sim, VisualState::Speaking, 1.0);
        let bins = sim.bins();
        assert!(bins[0] > bins[BIN_COUNT - 1]);
        assert!(bins[0] > 0);
    }
}
