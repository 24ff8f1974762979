//! Runtime core: bus, controller, actuator and metrics wired together, plus
//! the simulation, replay and live run modes.
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use blake3::Hasher;
use opentelemetry::KeyValue;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, instrument, warn};

use autobrake_config::AutobrakeConfig;
use autobrake_core::{
    BrakeCommand, CollisionController, InProcessBus, ObstacleDetected, SensorEvent, ServiceBus,
    SpeedUpdate,
};
use autobrake_simulator::{hash_event, ReplayEngine, Scenario, Simulator, TimedEvent, VirtualClock};
use autobrake_telemetry::{EventLogger, MetricsRecorder};

use crate::engine::actuator::BrakeActuator;
use crate::engine::diagnostics::DiagnosticsCollector;
use crate::engine::error::EngineError;

/// Outcome of one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub events_dispatched: usize,
    pub brake_commands: usize,
    pub min_time_to_collision_s: Option<f64>,
    /// Hex BLAKE3 digest over the dispatched readings and the brake commands
    /// they produced.
    pub state_hash: String,
}

#[derive(Serialize)]
struct BugReport<'a> {
    error: &'static str,
    expected: &'a str,
    actual: &'a str,
    report: &'a RunReport,
    config: &'a AutobrakeConfig,
}

/// Accumulates one run's readings into its state hash.
struct RunAccumulator {
    hasher: Hasher,
    events_dispatched: usize,
}

impl RunAccumulator {
    fn start(actuator: &BrakeActuator) -> Self {
        actuator.reset();
        Self {
            hasher: Hasher::new(),
            events_dispatched: 0,
        }
    }

    fn dispatch(&mut self, bus: &InProcessBus, timed: TimedEvent) {
        hash_event(&mut self.hasher, &timed);
        bus.publish_sensor(timed.event);
        self.events_dispatched += 1;
    }

    fn finish(mut self, actuator: &BrakeActuator) -> RunReport {
        self.hasher.update(actuator.final_hash().as_bytes());
        RunReport {
            events_dispatched: self.events_dispatched,
            brake_commands: actuator.commands(),
            min_time_to_collision_s: actuator.min_time_to_collision_s(),
            state_hash: hex::encode(self.hasher.finalize().as_bytes()),
        }
    }
}

/// Owns the controller and everything around it.
///
/// Reports are reproducible for a freshly built runtime: the controller keeps
/// its last known speed from one run to the next.
pub struct AutobrakeRuntime {
    config: Arc<AutobrakeConfig>,
    bus: Arc<InProcessBus>,
    controller: CollisionController<InProcessBus>,
    actuator: Arc<BrakeActuator>,
    metrics: Option<Arc<MetricsRecorder>>,
    diagnostics: Mutex<DiagnosticsCollector>,
}

impl AutobrakeRuntime {
    /// Builds the runtime from an already loaded configuration.
    pub fn new(config: AutobrakeConfig) -> Result<Self, EngineError> {
        info!("Initializing autobrake runtime");
        debug!("Controller config: {:?}", config.controller);

        let bus = Arc::new(InProcessBus::new());

        let metrics = if config.telemetry.metrics_enabled {
            let metrics = Arc::new(MetricsRecorder::new()?);
            attach_metrics(&bus, &metrics);
            Some(metrics)
        } else {
            None
        };

        let controller = CollisionController::new(bus.clone());
        controller.set_collision_threshold_s(config.controller.collision_threshold_s)?;

        let actuator = Arc::new(BrakeActuator::new());
        let sink = actuator.clone();
        bus.subscribe_brake(Box::new(move |command: &BrakeCommand| sink.apply(command)));

        Ok(Self {
            config: Arc::new(config),
            bus,
            controller,
            actuator,
            metrics,
            diagnostics: Mutex::new(DiagnosticsCollector::default()),
        })
    }

    /// Loads configuration from the default files and environment, then
    /// builds the runtime.
    pub fn load() -> Result<Self, EngineError> {
        Self::new(AutobrakeConfig::load()?)
    }

    /// Directory bug reports are written to. Defaults to the working directory.
    pub fn with_report_dir(self, dir: impl Into<PathBuf>) -> Self {
        *self.diagnostics.lock() = DiagnosticsCollector::new(dir);
        self
    }

    /// Feeds `event_count` simulated ticks through the controller. Readings
    /// lost to sensor dropout are not dispatched.
    #[instrument(skip(self))]
    pub fn run_simulation(&self, event_count: usize) -> Result<RunReport, EngineError> {
        debug!(
            "Starting simulation with {} events, seed {}",
            event_count, self.config.simulator.seed
        );

        let mut simulator = Simulator::new(self.config.simulator.clone());
        let mut run = RunAccumulator::start(&self.actuator);
        for _ in 0..event_count {
            if let Some(timed) = simulator.next_event() {
                run.dispatch(&self.bus, timed);
            }
        }
        let report = run.finish(&self.actuator);

        info!(
            "Simulation complete. {} readings dropped. State hash: {}",
            simulator.dropped(),
            report.state_hash
        );
        EventLogger::log_event(
            "simulation_complete",
            &[
                KeyValue::new("event_count", event_count as i64),
                KeyValue::new("seed", self.config.simulator.seed.to_string()),
                KeyValue::new("brake_commands", report.brake_commands as i64),
                KeyValue::new("final_hash", report.state_hash.clone()),
            ],
        );
        Ok(report)
    }

    /// Replays a recorded scenario through the controller.
    #[instrument(skip_all, fields(seed = scenario.seed, events = scenario.len()))]
    pub fn run_replay(&self, scenario: Scenario) -> Result<RunReport, EngineError> {
        scenario.validate()?;
        let seed = scenario.seed;

        let clock = VirtualClock::new(0);
        let mut run = RunAccumulator::start(&self.actuator);
        for timed in ReplayEngine::new(scenario, clock.clone()) {
            run.dispatch(&self.bus, timed);
        }
        let report = run.finish(&self.actuator);

        info!(
            "Replay complete at {} ns. State hash: {}",
            clock.now_ns(),
            report.state_hash
        );
        EventLogger::log_event(
            "replay_complete",
            &[
                KeyValue::new("seed", seed.to_string()),
                KeyValue::new("brake_commands", report.brake_commands as i64),
                KeyValue::new("final_hash", report.state_hash.clone()),
            ],
        );
        Ok(report)
    }

    /// Reads newline-delimited JSON sensor events from `reader` until EOF or
    /// Ctrl-C. Blank lines are skipped. A malformed line aborts the run when
    /// `strict` is set and is logged and skipped otherwise.
    ///
    /// Live readings are stamped with wall-clock time since the run started,
    /// so the state hash of a live run is not reproducible.
    #[instrument(skip(self, reader))]
    pub async fn run_live<R>(&self, reader: R, strict: bool) -> Result<RunReport, EngineError>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("Starting live feed");

        let started = Instant::now();
        let mut lines = reader.lines();
        let mut run = RunAccumulator::start(&self.actuator);
        let mut line_number = 0usize;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            let line = tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Interrupted, stopping live feed");
                    break;
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                break;
            };
            line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<SensorEvent>(trimmed) {
                Ok(event) => run.dispatch(
                    &self.bus,
                    TimedEvent {
                        timestamp_ns: started.elapsed().as_nanos() as u64,
                        event,
                    },
                ),
                Err(source) if strict => {
                    error!(line = line_number, "Malformed sensor event: {source}");
                    return Err(EngineError::Feed {
                        line: line_number,
                        source,
                    });
                }
                Err(e) => warn!(line = line_number, "Skipping malformed sensor event: {e}"),
            }
        }

        let report = run.finish(&self.actuator);
        info!(
            "Live feed closed after {} events, {} brake commands",
            report.events_dispatched, report.brake_commands
        );
        EventLogger::log_event(
            "live_complete",
            &[
                KeyValue::new("events_dispatched", report.events_dispatched as i64),
                KeyValue::new("brake_commands", report.brake_commands as i64),
            ],
        );
        Ok(report)
    }

    /// Compares a run's state hash with `expected`. On mismatch a bug report
    /// is written and [`EngineError::HashMismatch`] returned.
    #[instrument(skip(self, report))]
    pub fn validate_hash(&self, report: &RunReport, expected: &str) -> Result<(), EngineError> {
        debug!("Validating state hash");
        if report.state_hash == expected {
            info!("State hash validation successful");
            return Ok(());
        }

        error!("Hash mismatch! Expected: {expected}");
        let bug = BugReport {
            error: "state hash mismatch",
            expected,
            actual: &report.state_hash,
            report,
            config: &self.config,
        };
        let body = serde_yaml::to_string(&bug).unwrap_or_else(|e| {
            format!(
                "error: state hash mismatch\nexpected: {expected}\nactual: {}\n# report rendering failed: {e}\n",
                report.state_hash
            )
        });

        let path = self.diagnostics.lock().record_bug_report(&body)?;
        error!("Bug report saved to: {}", path.display());

        Err(EngineError::HashMismatch {
            expected: expected.to_string(),
            actual: report.state_hash.clone(),
        })
    }

    pub fn config(&self) -> &AutobrakeConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<InProcessBus> {
        &self.bus
    }

    pub fn controller(&self) -> &CollisionController<InProcessBus> {
        &self.controller
    }

    pub fn actuator(&self) -> &Arc<BrakeActuator> {
        &self.actuator
    }

    pub fn metrics(&self) -> Option<&Arc<MetricsRecorder>> {
        self.metrics.as_ref()
    }

    /// Paths of the bug reports written so far.
    pub fn bug_reports(&self) -> Vec<PathBuf> {
        self.diagnostics.lock().bug_reports().to_vec()
    }
}

fn attach_metrics(bus: &InProcessBus, metrics: &Arc<MetricsRecorder>) {
    let speed = metrics.clone();
    bus.subscribe_speed(Box::new(move |update: &SpeedUpdate| {
        speed.record_speed(update.velocity_mps)
    }));

    let obstacles = metrics.clone();
    bus.subscribe_obstacle(Box::new(move |_: &ObstacleDetected| {
        obstacles.record_obstacle()
    }));

    let brakes = metrics.clone();
    bus.subscribe_brake(Box::new(move |command: &BrakeCommand| {
        brakes.record_brake(command.time_to_collision_s)
    }));
}
