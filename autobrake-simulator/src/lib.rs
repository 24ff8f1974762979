/*!
# Autobrake Simulator

Deterministic sensor traffic for the collision controller. A seeded random
source drives the ego speed as a bounded random walk and drops in obstacle
reports at a configured rate, all stamped with virtual time.

## Key Components:
- **Virtual Clock:** Simulated time with nanosecond precision.
- **Simulator:** Seeded reading generator with optional sensor dropout.
- **Scenario:** YAML recording of a run.
- **Replay Engine:** Deterministic replay of recorded scenarios.

The same seed and settings always yield the same readings and the same
stream hash.
*/

use blake3::Hasher;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use autobrake_config::SimulatorConfig;
use autobrake_core::{ObstacleDetected, SensorEvent, SpeedUpdate};

pub mod replay;
pub mod scenario;
pub mod virtual_clock;

pub use replay::ReplayEngine;
pub use scenario::{Scenario, ScenarioError, TimedEvent};
pub use virtual_clock::VirtualClock;

/// Largest change in ego speed between two consecutive speed updates (m/s).
pub const MAX_SPEED_STEP_MPS: f64 = 2.0;

const NANOS_PER_MILLI: u64 = 1_000_000;

pub struct Simulator {
    config: SimulatorConfig,
    clock: VirtualClock,
    rng: StdRng,
    velocity_mps: f64,
    state_hasher: Hasher,
    dropped: usize,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_clock(config, VirtualClock::default())
    }

    /// Builds a simulator that stamps readings with `clock`.
    pub fn with_clock(config: SimulatorConfig, clock: VirtualClock) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let velocity_mps = rng.random_range(0.0..=speed_bound(config.max_speed_mps));

        Self {
            config,
            clock,
            rng,
            velocity_mps,
            state_hasher: Hasher::new(),
            dropped: 0,
        }
    }

    /// Advances virtual time by one tick and produces the next reading.
    ///
    /// Returns `None` when the reading was lost to sensor dropout.
    pub fn next_event(&mut self) -> Option<TimedEvent> {
        let timestamp_ns = self
            .clock
            .advance(self.config.tick_ms.saturating_mul(NANOS_PER_MILLI));

        if self
            .rng
            .random_bool(probability(self.config.sensor_dropout))
        {
            self.dropped += 1;
            self.state_hasher.update(b"DROPPED");
            trace!(timestamp_ns, "Sensor reading dropped");
            return None;
        }

        let max_speed = speed_bound(self.config.max_speed_mps);
        let event = if self
            .rng
            .random_bool(probability(self.config.obstacle_probability))
        {
            // Distance is drawn from (0, max]; a zero distance is never reported.
            let distance_m = self.config.max_distance_m * (1.0 - self.rng.random::<f64>());
            let velocity_mps = self.rng.random_range(0.0..=max_speed);
            SensorEvent::Obstacle(ObstacleDetected::new(distance_m, velocity_mps))
        } else {
            let step = self
                .rng
                .random_range(-MAX_SPEED_STEP_MPS..=MAX_SPEED_STEP_MPS);
            self.velocity_mps = (self.velocity_mps + step).clamp(0.0, max_speed);
            SensorEvent::Speed(SpeedUpdate::new(self.velocity_mps))
        };

        let timed = TimedEvent {
            timestamp_ns,
            event,
        };
        hash_event(&mut self.state_hasher, &timed);
        Some(timed)
    }

    /// Runs `event_count` ticks and collects the surviving readings.
    pub fn record(&mut self, event_count: usize) -> Scenario {
        let mut scenario = Scenario::new(self.config.seed, self.config.clone());
        scenario.events = (0..event_count).filter_map(|_| self.next_event()).collect();
        scenario
    }

    /// Hex BLAKE3 digest of everything generated so far.
    pub fn stream_hash(&self) -> String {
        hex::encode(self.state_hasher.finalize().as_bytes())
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }
}

impl Iterator for Simulator {
    type Item = Option<TimedEvent>;

    /// Never ends; each item is one tick, `None` for a dropped reading.
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_event())
    }
}

// Configs that skipped validation may carry NaN or infinities; both would
// make the random draws panic.
fn speed_bound(max_speed_mps: f64) -> f64 {
    if max_speed_mps.is_finite() {
        max_speed_mps.max(0.0)
    } else {
        0.0
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Folds a reading into `hasher` in a fixed little-endian layout.
pub fn hash_event(hasher: &mut Hasher, timed: &TimedEvent) {
    hasher.update(&timed.timestamp_ns.to_le_bytes());
    match timed.event {
        SensorEvent::Speed(update) => {
            hasher.update(b"S");
            hasher.update(&update.velocity_mps.to_le_bytes());
        }
        SensorEvent::Obstacle(obstacle) => {
            hasher.update(b"O");
            hasher.update(&obstacle.distance_m.to_le_bytes());
            hasher.update(&obstacle.velocity_mps.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SimulatorConfig {
        SimulatorConfig {
            seed,
            ..SimulatorConfig::default()
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = Simulator::new(config(7));
        let mut b = Simulator::new(config(7));
        assert_eq!(a.record(200), b.record(200));
        assert_eq!(a.stream_hash(), b.stream_hash());
    }

    #[test]
    fn different_seed_different_hash() {
        let mut a = Simulator::new(config(1));
        let mut b = Simulator::new(config(2));
        a.record(50);
        b.record(50);
        assert_ne!(a.stream_hash(), b.stream_hash());
    }

    #[test]
    fn readings_stay_in_envelope() {
        let cfg = SimulatorConfig {
            obstacle_probability: 0.5,
            ..config(11)
        };
        let (max_speed, max_distance) = (cfg.max_speed_mps, cfg.max_distance_m);
        let scenario = Simulator::new(cfg).record(1_000);

        for timed in &scenario.events {
            match timed.event {
                SensorEvent::Speed(u) => {
                    assert!((0.0..=max_speed).contains(&u.velocity_mps));
                }
                SensorEvent::Obstacle(o) => {
                    assert!(o.distance_m > 0.0 && o.distance_m <= max_distance);
                    assert!((0.0..=max_speed).contains(&o.velocity_mps));
                }
            }
        }
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn speed_walk_is_bounded_per_step() {
        let cfg = SimulatorConfig {
            obstacle_probability: 0.0,
            ..config(5)
        };
        let scenario = Simulator::new(cfg).record(500);
        for pair in scenario.events.windows(2) {
            if let (SensorEvent::Speed(a), SensorEvent::Speed(b)) = (pair[0].event, pair[1].event)
            {
                assert!((b.velocity_mps - a.velocity_mps).abs() <= MAX_SPEED_STEP_MPS + 1e-9);
            }
        }
    }

    #[test]
    fn ticks_advance_clock() {
        let cfg = SimulatorConfig {
            tick_ms: 50,
            ..config(3)
        };
        let mut sim = Simulator::new(cfg);
        let first = sim.next_event().unwrap();
        let second = sim.next_event().unwrap();
        assert_eq!(first.timestamp_ns, 50_000_000);
        assert_eq!(second.timestamp_ns, 100_000_000);
        assert_eq!(sim.clock().now_ns(), 100_000_000);
    }

    #[test]
    fn full_dropout_loses_everything() {
        let cfg = SimulatorConfig {
            sensor_dropout: 1.0,
            ..config(9)
        };
        let mut sim = Simulator::new(cfg);
        let scenario = sim.record(20);
        assert!(scenario.is_empty());
        assert_eq!(sim.dropped(), 20);
        assert_eq!(sim.clock().now_ns(), 20 * 100 * NANOS_PER_MILLI);
    }

    #[test]
    fn dropouts_change_the_hash() {
        let mut clean = Simulator::new(config(4));
        let mut lossy = Simulator::new(SimulatorConfig {
            sensor_dropout: 0.5,
            ..config(4)
        });
        clean.record(100);
        lossy.record(100);
        assert!(lossy.dropped() > 0);
        assert_ne!(clean.stream_hash(), lossy.stream_hash());
    }

    #[test]
    fn unvalidated_non_finite_config_does_not_panic() {
        let cfg = SimulatorConfig {
            max_speed_mps: f64::INFINITY,
            obstacle_probability: f64::NAN,
            sensor_dropout: f64::NAN,
            ..config(6)
        };
        let scenario = Simulator::new(cfg).record(5);
        assert_eq!(scenario.len(), 5);
    }

    #[test]
    fn iterator_yields_ticks() {
        let sim = Simulator::new(config(8));
        assert_eq!(sim.take(10).flatten().count(), 10);
    }
}
