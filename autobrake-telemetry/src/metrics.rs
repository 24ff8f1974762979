//! ## autobrake-telemetry::metrics
//! **Prometheus collectors for controller traffic**
//!
//! Counters for every reading and every brake command, a histogram of the
//! time-to-collision carried by brake commands, and a gauge holding the last
//! reported ego speed.

use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};

use crate::TelemetryError;

/// Time-to-collision buckets in seconds.
const TTC_BUCKETS: [f64; 8] = [0.25, 0.5, 1.0, 1.5, 2.0, 3.0, 5.0, 10.0];

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub speed_updates: IntCounter,
    pub obstacles: IntCounter,
    pub brake_commands: IntCounter,
    pub time_to_collision: Histogram,
    pub velocity: Gauge,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let speed_updates = IntCounter::new(
            "autobrake_speed_updates_total",
            "Total speed updates delivered",
        )?;
        let obstacles = IntCounter::new(
            "autobrake_obstacles_total",
            "Total obstacle reports delivered",
        )?;
        let brake_commands = IntCounter::new(
            "autobrake_brake_commands_total",
            "Total brake commands published",
        )?;
        let time_to_collision = Histogram::with_opts(
            HistogramOpts::new(
                "autobrake_time_to_collision_seconds",
                "Time to collision carried by brake commands",
            )
            .buckets(TTC_BUCKETS.to_vec()),
        )?;
        let velocity = Gauge::new("autobrake_velocity_mps", "Last reported ego speed")?;

        registry.register(Box::new(speed_updates.clone()))?;
        registry.register(Box::new(obstacles.clone()))?;
        registry.register(Box::new(brake_commands.clone()))?;
        registry.register(Box::new(time_to_collision.clone()))?;
        registry.register(Box::new(velocity.clone()))?;

        Ok(Self {
            registry,
            speed_updates,
            obstacles,
            brake_commands,
            time_to_collision,
            velocity,
        })
    }

    pub fn record_speed(&self, velocity_mps: f64) {
        self.speed_updates.inc();
        self.velocity.set(velocity_mps);
    }

    pub fn record_obstacle(&self) {
        self.obstacles.inc();
    }

    pub fn record_brake(&self, time_to_collision_s: f64) {
        self.brake_commands.inc();
        self.time_to_collision.observe(time_to_collision_s);
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn gather_metrics(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
