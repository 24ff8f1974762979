//! Sensor and actuator event types.

use serde::{Deserialize, Serialize};

/// Instantaneous ego-vehicle speed. Negative values mean reversing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedUpdate {
    pub velocity_mps: f64,
}

impl SpeedUpdate {
    #[inline]
    pub fn new(velocity_mps: f64) -> Self {
        Self { velocity_mps }
    }
}

/// Forward obstacle as seen at the moment of detection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDetected {
    /// Distance to the obstacle in metres
    pub distance_m: f64,

    /// Obstacle speed along the ego heading in metres per second
    pub velocity_mps: f64,
}

impl ObstacleDetected {
    #[inline]
    pub fn new(distance_m: f64, velocity_mps: f64) -> Self {
        Self {
            distance_m,
            velocity_mps,
        }
    }
}

/// Brake request published by the controller.
///
/// `time_to_collision_s` is strictly positive and no larger than the
/// controller threshold in force when the command was issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrakeCommand {
    pub time_to_collision_s: f64,
}

/// Inbound reading of either kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorEvent {
    Speed(SpeedUpdate),
    Obstacle(ObstacleDetected),
}

impl SensorEvent {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SensorEvent::Speed(_) => "speed",
            SensorEvent::Obstacle(_) => "obstacle",
        }
    }
}

impl From<SpeedUpdate> for SensorEvent {
    fn from(update: SpeedUpdate) -> Self {
        SensorEvent::Speed(update)
    }
}

impl From<ObstacleDetected> for SensorEvent {
    fn from(obstacle: ObstacleDetected) -> Self {
        SensorEvent::Obstacle(obstacle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_event_is_internally_tagged() {
        let event = SensorEvent::from(ObstacleDetected::new(12.5, 3.0));
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"obstacle","distance_m":12.5,"velocity_mps":3.0}"#
        );

        let parsed: SensorEvent =
            serde_json::from_str(r#"{"kind":"speed","velocity_mps":-2.0}"#).unwrap();
        assert_eq!(parsed, SensorEvent::Speed(SpeedUpdate::new(-2.0)));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(SensorEvent::from(SpeedUpdate::new(1.0)).kind(), "speed");
        assert_eq!(
            SensorEvent::from(ObstacleDetected::new(1.0, 0.0)).kind(),
            "obstacle"
        );
    }
}
