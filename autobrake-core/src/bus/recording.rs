//! Recording test double.

use parking_lot::Mutex;

use super::{Handler, ServiceBus};
use crate::events::{BrakeCommand, ObstacleDetected, SpeedUpdate};

/// Deterministic [`ServiceBus`] that keeps the handlers it was given and
/// records every published brake command.
///
/// Tests drive the subscriber directly with [`RecordingBus::deliver_speed`]
/// and [`RecordingBus::deliver_obstacle`], then assert on
/// [`RecordingBus::commands_published`] and [`RecordingBus::last_command`].
#[derive(Default)]
pub struct RecordingBus {
    speed_handlers: Mutex<Vec<Handler<SpeedUpdate>>>,
    obstacle_handlers: Mutex<Vec<Handler<ObstacleDetected>>>,
    published: Mutex<Vec<BrakeCommand>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invokes every captured speed handler with `update`.
    pub fn deliver_speed(&self, update: SpeedUpdate) {
        for handler in self.speed_handlers.lock().iter() {
            handler(&update);
        }
    }

    /// Invokes every captured obstacle handler with `obstacle`.
    pub fn deliver_obstacle(&self, obstacle: ObstacleDetected) {
        for handler in self.obstacle_handlers.lock().iter() {
            handler(&obstacle);
        }
    }

    pub fn commands_published(&self) -> usize {
        self.published.lock().len()
    }

    pub fn last_command(&self) -> Option<BrakeCommand> {
        self.published.lock().last().copied()
    }

    /// Every command published so far, oldest first.
    pub fn published(&self) -> Vec<BrakeCommand> {
        self.published.lock().clone()
    }

    pub fn speed_subscriptions(&self) -> usize {
        self.speed_handlers.lock().len()
    }

    pub fn obstacle_subscriptions(&self) -> usize {
        self.obstacle_handlers.lock().len()
    }

    /// Forgets recorded commands; captured handlers stay registered.
    pub fn clear(&self) {
        self.published.lock().clear();
    }
}

impl ServiceBus for RecordingBus {
    fn publish(&self, command: BrakeCommand) {
        self.published.lock().push(command);
    }

    fn subscribe_speed(&self, handler: Handler<SpeedUpdate>) {
        self.speed_handlers.lock().push(handler);
    }

    fn subscribe_obstacle(&self, handler: Handler<ObstacleDetected>) {
        self.obstacle_handlers.lock().push(handler);
    }
}
