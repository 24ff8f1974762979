//! ## autobrake-core::controller
//! **Time-to-collision braking decision**
//!
//! The controller tracks two values: the latest ego speed and the collision
//! threshold. Every obstacle report is judged on its own against the latest
//! speed:
//!
//! 1. `relative = ego_velocity - obstacle_velocity`
//! 2. not closing in (`relative <= 0`): nothing happens
//! 3. `ttc = distance / relative`
//! 4. `0 < ttc <= threshold`: exactly one [`BrakeCommand`] is published
//!
//! Both values are stored as `f64` bit patterns in atomics, so each state
//! transition is a single store and no reader can see a torn value.
//! Delivery ordering is the bus's job; the controller never locks.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bus::ServiceBus;
use crate::error::ControllerError;
use crate::events::{BrakeCommand, ObstacleDetected, SensorEvent, SpeedUpdate};

/// Threshold in force right after construction.
pub const DEFAULT_COLLISION_THRESHOLD_S: f64 = 5.0;

/// Smallest accepted threshold. Faster reaction windows are refused.
pub const MIN_COLLISION_THRESHOLD_S: f64 = 1.0;

struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Mutable state owned by one controller.
pub struct ControllerState {
    velocity_mps: AtomicF64,
    collision_threshold_s: AtomicF64,
}

impl ControllerState {
    fn new() -> Self {
        Self {
            velocity_mps: AtomicF64::new(0.0),
            collision_threshold_s: AtomicF64::new(DEFAULT_COLLISION_THRESHOLD_S),
        }
    }

    #[inline]
    pub fn velocity_mps(&self) -> f64 {
        self.velocity_mps.load()
    }

    #[inline]
    pub fn collision_threshold_s(&self) -> f64 {
        self.collision_threshold_s.load()
    }

    fn set_collision_threshold_s(&self, value: f64) -> Result<(), ControllerError> {
        if value.is_nan() || value < MIN_COLLISION_THRESHOLD_S {
            warn!(
                requested = value,
                current = self.collision_threshold_s(),
                "Rejected collision threshold below floor"
            );
            return Err(ControllerError::InvalidParameter {
                name: "collision_threshold_s",
                value,
                minimum: MIN_COLLISION_THRESHOLD_S,
            });
        }

        self.collision_threshold_s.store(value);
        debug!(collision_threshold_s = value, "Collision threshold updated");
        Ok(())
    }

    /// Applies the braking rule to `obstacle` without publishing anything.
    pub fn evaluate(&self, obstacle: &ObstacleDetected) -> Option<BrakeCommand> {
        let relative_velocity_mps = self.velocity_mps() - obstacle.velocity_mps;
        if relative_velocity_mps <= 0.0 {
            return None;
        }

        let time_to_collision_s = obstacle.distance_m / relative_velocity_mps;
        if time_to_collision_s > 0.0 && time_to_collision_s <= self.collision_threshold_s() {
            Some(BrakeCommand {
                time_to_collision_s,
            })
        } else {
            None
        }
    }

    fn observe<B: ServiceBus + ?Sized>(&self, bus: &B, event: &SensorEvent) {
        match event {
            SensorEvent::Speed(update) => {
                self.velocity_mps.store(update.velocity_mps);
                debug!(velocity_mps = update.velocity_mps, "Speed updated");
            }
            SensorEvent::Obstacle(obstacle) => {
                if let Some(command) = self.evaluate(obstacle) {
                    info!(
                        time_to_collision_s = command.time_to_collision_s,
                        distance_m = obstacle.distance_m,
                        "Imminent collision, braking"
                    );
                    bus.publish(command);
                }
            }
        }
    }
}

/// Point-in-time copy of the controller state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    pub velocity_mps: f64,
    pub collision_threshold_s: f64,
}

/// Reactive collision-avoidance controller.
///
/// Subscribes to speed and obstacle events on construction and publishes a
/// [`BrakeCommand`] on the same bus whenever the decision rule fires. The
/// handlers it leaves on the bus hold only weak references: once the
/// controller is dropped they do nothing.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use autobrake_core::{CollisionController, ObstacleDetected, RecordingBus, SpeedUpdate};
///
/// let bus = Arc::new(RecordingBus::new());
/// let controller = CollisionController::new(bus.clone());
/// controller.set_collision_threshold_s(10.0).unwrap();
///
/// bus.deliver_speed(SpeedUpdate::new(100.0));
/// bus.deliver_obstacle(ObstacleDetected::new(100.0, 0.0));
///
/// assert_eq!(bus.commands_published(), 1);
/// assert_eq!(bus.last_command().unwrap().time_to_collision_s, 1.0);
/// ```
pub struct CollisionController<B: ServiceBus + ?Sized + 'static> {
    bus: Arc<B>,
    state: Arc<ControllerState>,
}

impl<B: ServiceBus + ?Sized + 'static> CollisionController<B> {
    /// Creates the controller and registers its two subscriptions on `bus`
    /// before returning.
    pub fn new(bus: Arc<B>) -> Self {
        let state = Arc::new(ControllerState::new());

        let speed_state = Arc::downgrade(&state);
        let speed_bus = Arc::downgrade(&bus);
        bus.subscribe_speed(Box::new(move |update: &SpeedUpdate| {
            if let (Some(state), Some(bus)) = (speed_state.upgrade(), speed_bus.upgrade()) {
                state.observe(&*bus, &SensorEvent::Speed(*update));
            }
        }));

        let obstacle_state = Arc::downgrade(&state);
        let obstacle_bus = Arc::downgrade(&bus);
        bus.subscribe_obstacle(Box::new(move |obstacle: &ObstacleDetected| {
            if let (Some(state), Some(bus)) = (obstacle_state.upgrade(), obstacle_bus.upgrade()) {
                state.observe(&*bus, &SensorEvent::Obstacle(*obstacle));
            }
        }));

        debug!("Collision controller subscribed");
        Self { bus, state }
    }

    /// Feeds one reading straight into the controller, bypassing the
    /// subscriptions. Brake commands still go out on the bus.
    pub fn observe(&self, event: &SensorEvent) {
        self.state.observe(&*self.bus, event);
    }

    /// Replaces the threshold. Values below one second (or NaN) are
    /// rejected and the previous threshold stays in force.
    pub fn set_collision_threshold_s(&self, value: f64) -> Result<(), ControllerError> {
        self.state.set_collision_threshold_s(value)
    }

    pub fn collision_threshold_s(&self) -> f64 {
        self.state.collision_threshold_s()
    }

    pub fn velocity_mps(&self) -> f64 {
        self.state.velocity_mps()
    }

    /// Decision rule applied to `obstacle` against the current state,
    /// without publishing.
    pub fn evaluate(&self, obstacle: &ObstacleDetected) -> Option<BrakeCommand> {
        self.state.evaluate(obstacle)
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            velocity_mps: self.velocity_mps(),
            collision_threshold_s: self.collision_threshold_s(),
        }
    }

    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }
}

impl<B: ServiceBus + ?Sized + 'static> fmt::Debug for CollisionController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionController")
            .field("velocity_mps", &self.velocity_mps())
            .field("collision_threshold_s", &self.collision_threshold_s())
            .finish()
    }
}
