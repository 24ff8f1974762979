//! ## autobrake-core::bus
//! **Synchronous publish/subscribe capability used by the controller**
//!
//! The controller only needs three capabilities from its transport:
//! subscribe to speed updates, subscribe to obstacle reports, and publish
//! brake commands. [`ServiceBus`] names exactly that set. Two backends ship
//! with the crate:
//! - [`InProcessBus`]: production dispatcher with typed topics for all kinds
//! - [`RecordingBus`]: test double that captures handlers and published commands
//!
//! Delivery is synchronous and in subscription order. A publish call returns
//! only after every subscriber for that kind has run.

mod in_process;
mod recording;
mod topic;

pub use in_process::{InProcessBus, SubscriberCounts};
pub use recording::RecordingBus;

use crate::events::{BrakeCommand, ObstacleDetected, SpeedUpdate};

/// Callback invoked with one event per delivery.
pub type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Transport capability required by [`crate::CollisionController`].
pub trait ServiceBus: Send + Sync {
    /// Delivers a brake command to every brake subscriber before returning.
    fn publish(&self, command: BrakeCommand);

    /// Registers a handler for [`SpeedUpdate`] events.
    fn subscribe_speed(&self, handler: Handler<SpeedUpdate>);

    /// Registers a handler for [`ObstacleDetected`] events.
    fn subscribe_obstacle(&self, handler: Handler<ObstacleDetected>);
}
