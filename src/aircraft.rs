use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::dynamics::z_angle;
use crate::error::ConfigError;
use crate::motor::Motor;
use crate::world::{World, STANDARD_GRAVITY};

/// Static description of the airframe. Never mutated by the simulation.
///
/// # Fields
///
/// * `radius` - Distance from the centre of the craft to the outermost motor shaft (m)
/// * `mass` - Total mass of the craft (kg)
/// * `max_thrust` - Maximum thrust of each motor (N)
/// * `adjust_rate` - Fraction of the target force a motor closes per physics step, in (0, 1]
/// * `beamwidth` - Thickness of the frame beam carrying the motors (m)
/// * `motor_count` - Number of motors spread along the beam
/// * `drag_coefficient` - Dimensionless drag coefficient applied to both drag terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftConfig {
    pub radius: f64,
    pub mass: f64,
    pub max_thrust: f64,
    pub adjust_rate: f64,
    pub beamwidth: f64,
    pub motor_count: usize,
    pub drag_coefficient: f64,
}

impl Default for AircraftConfig {
    fn default() -> Self {
        Self {
            radius: 0.30,
            mass: 1.2,
            max_thrust: 2.0 * STANDARD_GRAVITY * 1.2,
            adjust_rate: 0.01,
            beamwidth: 0.015,
            motor_count: 2,
            drag_coefficient: 1.0,
        }
    }
}

impl AircraftConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::invalid(
                "aircraft.radius",
                self.radius,
                "must be positive",
            ));
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(ConfigError::invalid(
                "aircraft.mass",
                self.mass,
                "must be positive",
            ));
        }
        if !(self.max_thrust.is_finite() && self.max_thrust > 0.0) {
            return Err(ConfigError::invalid(
                "aircraft.max_thrust",
                self.max_thrust,
                "must be positive",
            ));
        }
        if !(self.adjust_rate > 0.0 && self.adjust_rate <= 1.0) {
            return Err(ConfigError::invalid(
                "aircraft.adjust_rate",
                self.adjust_rate,
                "must lie in (0, 1]",
            ));
        }
        if !(self.beamwidth.is_finite() && self.beamwidth >= 0.0) {
            return Err(ConfigError::invalid(
                "aircraft.beamwidth",
                self.beamwidth,
                "must be non-negative",
            ));
        }
        if self.motor_count == 0 {
            return Err(ConfigError::invalid(
                "aircraft.motor_count",
                0.0,
                "at least one motor is required",
            ));
        }
        if !(self.drag_coefficient.is_finite() && self.drag_coefficient >= 0.0) {
            return Err(ConfigError::invalid(
                "aircraft.drag_coefficient",
                self.drag_coefficient,
                "must be non-negative",
            ));
        }
        Ok(())
    }

    /// Area presented to linear motion (m²).
    pub fn frontal_area(&self) -> f64 {
        4.0 * self.radius * self.beamwidth
    }

    /// Volume swept against the fluid while spinning (m³).
    pub fn rotational_drag_volume(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.radius.powi(2) * self.beamwidth
    }

    /// Point-mass-at-the-rim moment of inertia (kg⋅m²).
    pub fn moment_of_inertia(&self) -> f64 {
        self.mass * self.radius.powi(2)
    }

    pub fn total_max_thrust(&self) -> f64 {
        self.max_thrust * self.motor_count as f64
    }

    /// Motor shaft offsets, spread evenly along body x from `-radius` to `+radius`.
    pub fn motor_offsets(&self) -> Vec<Vector3<f64>> {
        if self.motor_count == 1 {
            return vec![Vector3::zeros()];
        }
        let span = (self.motor_count - 1) as f64;
        (0..self.motor_count)
            .map(|i| Vector3::new(self.radius * (2.0 * i as f64 / span - 1.0), 0.0, 0.0))
            .collect()
    }
}

/// Dynamic state of the airframe plus its static configuration.
///
/// All vectors are in the world frame unless noted. `normal` is the body up
/// axis and stands in for full attitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Aircraft {
    config: AircraftConfig,
    pub motors: Vec<Motor>,
    pub angular_momentum: Vector3<f64>,
    pub momentum: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub position: Vector3<f64>,
    /// Last net specific force, expressed in the body frame
    pub acceleration: Vector3<f64>,
}

impl Aircraft {
    pub fn new(config: AircraftConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let motors = config
            .motor_offsets()
            .into_iter()
            .map(|offset| Motor::new(offset, config.max_thrust))
            .collect();
        Ok(Self {
            config,
            motors,
            angular_momentum: Vector3::zeros(),
            momentum: Vector3::zeros(),
            normal: Vector3::y(),
            position: Vector3::zeros(),
            acceleration: Vector3::zeros(),
        })
    }

    pub fn config(&self) -> &AircraftConfig {
        &self.config
    }

    pub fn motors(&self) -> &[Motor] {
        &self.motors
    }

    /// Returns every dynamic field to rest and recomputes the motor offsets.
    pub fn reset(&mut self) {
        for (motor, offset) in self.motors.iter_mut().zip(self.config.motor_offsets()) {
            motor.position = offset;
            motor.reset();
        }
        self.angular_momentum = Vector3::zeros();
        self.momentum = Vector3::zeros();
        self.normal = Vector3::y();
        self.position = Vector3::zeros();
        self.acceleration = Vector3::zeros();
    }

    /// Spins every motor up to an equal share of the craft's weight.
    pub fn trim_hover(&mut self, world: &World) {
        let share = world.weight(self.config.mass) / self.motors.len() as f64;
        for motor in &mut self.motors {
            motor.hold(share);
        }
    }

    /// Roll angle of the body up axis away from world up (radians).
    pub fn angle(&self) -> f64 {
        z_angle(&self.normal)
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.momentum / self.config.mass
    }

    pub fn speed(&self) -> f64 {
        self.velocity().norm()
    }

    /// Rotation rate driven by the stored angular momentum (rad/s).
    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_momentum / self.config.moment_of_inertia()
    }

    /// Magnitude of the summed current motor forces (N).
    pub fn total_thrust(&self) -> f64 {
        self.motors
            .iter()
            .fold(Vector3::zeros(), |acc, motor| acc + motor.current_force)
            .norm()
    }
}
