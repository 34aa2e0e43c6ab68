use nalgebra::Vector3;
use serde::Serialize;

use crate::aircraft::Aircraft;
use crate::config::Config;
use crate::control::{AttitudeController, Channels};
use crate::dynamics::Simulator;
use crate::error::ConfigError;
use crate::rng::SeedSource;
use crate::sensors::{Sensor, SensorKind};
use crate::world::World;

/// Read-only snapshot for renderers and HUDs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub time: f64,
    pub position: [f64; 3],
    /// Roll angle of the body up axis (radians)
    pub angle: f64,
    pub speed: f64,
    pub target_thrusts: Vec<f64>,
    pub current_thrusts: Vec<f64>,
    pub target_angle: f64,
    pub thrustscalar: f64,
}

/// One aircraft flying in one world, with its controller and time cursor.
///
/// The caller owns pacing: feed it stick input, ask it to advance to the next
/// frame time, then read telemetry.
pub struct Flight {
    world: World,
    aircraft: Aircraft,
    controller: AttitudeController,
    accelerometer: Sensor,
    simulator: Simulator,
    start_trimmed: bool,
    t_now: f64,
}

impl Flight {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let sim = &config.simulation;
        let seeds = SeedSource::new(sim.seed);

        let aircraft = Aircraft::new(config.aircraft)?;
        let gyro = Sensor::new(SensorKind::Gyro, sim.gyro_sigma, seeds.rng_for(SensorKind::Gyro))?;
        let accelerometer = Sensor::new(
            SensorKind::Accelerometer,
            sim.accelerometer_sigma,
            seeds.rng_for(SensorKind::Accelerometer),
        )?;
        let controller =
            AttitudeController::new(sim.mode, sim.cycle_time, config.gains, gyro, &aircraft)?;

        let mut flight = Self {
            world: config.world,
            aircraft,
            controller,
            accelerometer,
            simulator: Simulator::new(sim.steps, sim.renormalize_orientation),
            start_trimmed: sim.start_trimmed,
            t_now: 0.0,
        };
        if flight.start_trimmed {
            flight.aircraft.trim_hover(&flight.world);
        }
        Ok(flight)
    }

    pub fn set_channels(&mut self, channels: Channels) {
        self.controller.set_channels(channels);
    }

    /// Simulates up to `t_future` and returns the new time cursor.
    pub fn advance_to(&mut self, t_future: f64) -> f64 {
        self.t_now = self.simulator.simulate(
            self.t_now,
            t_future,
            &mut self.aircraft,
            &mut self.controller,
            &self.world,
        );
        self.t_now
    }

    pub fn advance_by(&mut self, seconds: f64) -> f64 {
        self.advance_to(self.t_now + seconds)
    }

    /// Puts aircraft and controller back at rest. Simulated time keeps running.
    pub fn reset(&mut self) {
        self.aircraft.reset();
        self.controller.reset();
        if self.start_trimmed {
            self.aircraft.trim_hover(&self.world);
        }
        log::debug!("flight reset at t = {:.4} s", self.t_now);
    }

    pub fn read_accelerometer(&mut self) -> Vector3<f64> {
        self.accelerometer.read(&self.aircraft)
    }

    pub fn telemetry(&self) -> Telemetry {
        let motors = self.aircraft.motors();
        Telemetry {
            time: self.t_now,
            position: self.aircraft.position.into(),
            angle: self.aircraft.angle(),
            speed: self.aircraft.speed(),
            target_thrusts: motors.iter().map(|m| m.target_thrust()).collect(),
            current_thrusts: motors.iter().map(|m| m.current_thrust()).collect(),
            target_angle: self.controller.target_angle(),
            thrustscalar: self.controller.thrustscalar(),
        }
    }

    // Getters
    pub fn time(&self) -> f64 {
        self.t_now
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn aircraft(&self) -> &Aircraft {
        &self.aircraft
    }

    pub fn controller(&self) -> &AttitudeController {
        &self.controller
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }
}
