//! Replay module.
//!
//! Plays a recorded [`Scenario`] back in order, moving a [`VirtualClock`] to
//! each reading's timestamp before handing it out.

use crate::scenario::{Scenario, TimedEvent};
use crate::virtual_clock::VirtualClock;

pub struct ReplayEngine {
    scenario: Scenario,
    clock: VirtualClock,
    position: usize,
}

impl ReplayEngine {
    pub fn new(scenario: Scenario, clock: VirtualClock) -> Self {
        Self {
            scenario,
            clock,
            position: 0,
        }
    }

    /// Next recorded reading, with the clock advanced to its timestamp.
    pub fn next_event(&mut self) -> Option<TimedEvent> {
        let timed = *self.scenario.events.get(self.position)?;
        self.position += 1;
        self.clock.advance_to(timed.timestamp_ns);
        Some(timed)
    }

    pub fn remaining(&self) -> usize {
        self.scenario.events.len() - self.position
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }
}

impl Iterator for ReplayEngine {
    type Item = TimedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autobrake_config::SimulatorConfig;
    use autobrake_core::{ObstacleDetected, SpeedUpdate};

    fn scenario() -> Scenario {
        let mut scenario = Scenario::new(1, SimulatorConfig::default());
        scenario.events = vec![
            TimedEvent {
                timestamp_ns: 100,
                event: SpeedUpdate::new(10.0).into(),
            },
            TimedEvent {
                timestamp_ns: 250,
                event: ObstacleDetected::new(5.0, 0.0).into(),
            },
        ];
        scenario
    }

    #[test]
    fn replays_in_order_and_moves_clock() {
        let clock = VirtualClock::new(0);
        let mut replay = ReplayEngine::new(scenario(), clock.clone());
        assert_eq!(replay.remaining(), 2);

        assert_eq!(replay.next_event().unwrap().timestamp_ns, 100);
        assert_eq!(clock.now_ns(), 100);
        assert_eq!(replay.next_event().unwrap().timestamp_ns, 250);
        assert_eq!(clock.now_ns(), 250);

        assert!(replay.next_event().is_none());
        assert_eq!(replay.remaining(), 0);
    }

    #[test]
    fn clock_ahead_of_scenario_stays_put() {
        let replay = ReplayEngine::new(scenario(), VirtualClock::new(1_000));
        let clock = replay.clock().clone();
        assert_eq!(replay.count(), 2);
        assert_eq!(clock.now_ns(), 1_000);
    }
}
