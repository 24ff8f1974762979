//! In-process dispatcher carrying all three event kinds.

use tracing::trace;

use super::topic::Topic;
use super::{Handler, ServiceBus};
use crate::events::{BrakeCommand, ObstacleDetected, SensorEvent, SpeedUpdate};

/// Production bus. Sensors publish readings, actuators subscribe to brake
/// commands, and the controller sits in between through [`ServiceBus`].
///
/// Share it between components with `Arc<InProcessBus>`.
#[derive(Default)]
pub struct InProcessBus {
    speed: Topic<SpeedUpdate>,
    obstacle: Topic<ObstacleDetected>,
    brake: Topic<BrakeCommand>,
}

/// Number of registered handlers per event kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubscriberCounts {
    pub speed: usize,
    pub obstacle: usize,
    pub brake: usize,
}

impl InProcessBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a speed reading. Returns the number of handlers that ran.
    #[inline]
    pub fn publish_speed(&self, update: SpeedUpdate) -> usize {
        trace!(velocity_mps = update.velocity_mps, "publish speed");
        self.speed.dispatch(&update)
    }

    /// Publishes an obstacle report. Returns the number of handlers that ran.
    #[inline]
    pub fn publish_obstacle(&self, obstacle: ObstacleDetected) -> usize {
        trace!(
            distance_m = obstacle.distance_m,
            velocity_mps = obstacle.velocity_mps,
            "publish obstacle"
        );
        self.obstacle.dispatch(&obstacle)
    }

    /// Routes a tagged reading to the matching topic.
    pub fn publish_sensor(&self, event: SensorEvent) -> usize {
        match event {
            SensorEvent::Speed(update) => self.publish_speed(update),
            SensorEvent::Obstacle(obstacle) => self.publish_obstacle(obstacle),
        }
    }

    /// Registers an actuator-side handler for brake commands.
    pub fn subscribe_brake(&self, handler: Handler<BrakeCommand>) {
        self.brake.subscribe(handler);
    }

    pub fn subscriber_counts(&self) -> SubscriberCounts {
        SubscriberCounts {
            speed: self.speed.len(),
            obstacle: self.obstacle.len(),
            brake: self.brake.len(),
        }
    }
}

impl ServiceBus for InProcessBus {
    fn publish(&self, command: BrakeCommand) {
        trace!(
            time_to_collision_s = command.time_to_collision_s,
            "publish brake"
        );
        self.brake.dispatch(&command);
    }

    fn subscribe_speed(&self, handler: Handler<SpeedUpdate>) {
        self.speed.subscribe(handler);
    }

    fn subscribe_obstacle(&self, handler: Handler<ObstacleDetected>) {
        self.obstacle.subscribe(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn delivers_each_kind_to_its_own_subscribers() {
        let bus = InProcessBus::new();
        let speeds = Arc::new(Mutex::new(Vec::new()));
        let obstacles = Arc::new(Mutex::new(Vec::new()));

        let sink = speeds.clone();
        bus.subscribe_speed(Box::new(move |u: &SpeedUpdate| {
            sink.lock().push(u.velocity_mps)
        }));
        let sink = obstacles.clone();
        bus.subscribe_obstacle(Box::new(move |o: &ObstacleDetected| {
            sink.lock().push(o.distance_m)
        }));

        assert_eq!(bus.publish_speed(SpeedUpdate::new(12.0)), 1);
        assert_eq!(bus.publish_obstacle(ObstacleDetected::new(40.0, 2.0)), 1);
        assert_eq!(bus.publish_sensor(SpeedUpdate::new(13.0).into()), 1);

        assert_eq!(*speeds.lock(), vec![12.0, 13.0]);
        assert_eq!(*obstacles.lock(), vec![40.0]);
    }

    #[test]
    fn brake_commands_reach_every_subscriber_before_publish_returns() {
        let bus = InProcessBus::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        for id in 0..2 {
            let sink = received.clone();
            bus.subscribe_brake(Box::new(move |cmd: &BrakeCommand| {
                sink.lock().push((id, cmd.time_to_collision_s))
            }));
        }

        bus.publish(BrakeCommand {
            time_to_collision_s: 1.5,
        });
        assert_eq!(*received.lock(), vec![(0, 1.5), (1, 1.5)]);
    }

    #[test]
    fn publishing_without_subscribers_is_a_noop() {
        let bus = InProcessBus::new();
        assert_eq!(bus.publish_speed(SpeedUpdate::new(1.0)), 0);
        bus.publish(BrakeCommand::default());
        assert_eq!(bus.subscriber_counts(), SubscriberCounts::default());
    }
}
