use blake3::Hasher;
use parking_lot::Mutex;
use tracing::warn;

use autobrake_core::BrakeCommand;

struct ActuatorState {
    commands: usize,
    min_time_to_collision_s: Option<f64>,
    hasher: Hasher,
}

impl Default for ActuatorState {
    fn default() -> Self {
        Self {
            commands: 0,
            min_time_to_collision_s: None,
            hasher: Hasher::new(),
        }
    }
}

/// Brake-command sink standing in for the braking hardware.
#[derive(Default)]
pub struct BrakeActuator {
    state: Mutex<ActuatorState>,
}

impl BrakeActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&self, command: &BrakeCommand) {
        warn!(
            time_to_collision_s = command.time_to_collision_s,
            "Brake applied"
        );

        let mut state = self.state.lock();
        state.commands += 1;
        state.min_time_to_collision_s = Some(match state.min_time_to_collision_s {
            Some(min) => min.min(command.time_to_collision_s),
            None => command.time_to_collision_s,
        });
        state
            .hasher
            .update(&command.time_to_collision_s.to_le_bytes());
    }

    pub fn commands(&self) -> usize {
        self.state.lock().commands
    }

    pub fn min_time_to_collision_s(&self) -> Option<f64> {
        self.state.lock().min_time_to_collision_s
    }

    /// Hex BLAKE3 digest over every applied command, in order.
    pub fn final_hash(&self) -> String {
        hex::encode(self.state.lock().hasher.finalize().as_bytes())
    }

    pub fn reset(&self) {
        *self.state.lock() = ActuatorState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn command(ttc: f64) -> BrakeCommand {
        BrakeCommand {
            time_to_collision_s: ttc,
        }
    }

    #[traced_test]
    #[test]
    fn tracks_count_and_minimum() {
        let actuator = BrakeActuator::new();
        assert_eq!(actuator.min_time_to_collision_s(), None);

        actuator.apply(&command(3.0));
        actuator.apply(&command(1.5));
        actuator.apply(&command(2.0));

        assert_eq!(actuator.commands(), 3);
        assert_eq!(actuator.min_time_to_collision_s(), Some(1.5));
        assert!(logs_contain("Brake applied"));
    }

    #[test]
    fn hash_depends_on_command_order() {
        let a = BrakeActuator::new();
        let b = BrakeActuator::new();
        a.apply(&command(1.0));
        a.apply(&command(2.0));
        b.apply(&command(2.0));
        b.apply(&command(1.0));
        assert_ne!(a.final_hash(), b.final_hash());
    }

    #[test]
    fn reset_forgets_history() {
        let actuator = BrakeActuator::new();
        let empty = actuator.final_hash();
        actuator.apply(&command(1.0));
        actuator.reset();
        assert_eq!(actuator.commands(), 0);
        assert_eq!(actuator.final_hash(), empty);
    }
}
