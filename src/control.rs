use std::f64::consts::{FRAC_PI_4, PI, TAU};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::aircraft::Aircraft;
use crate::dynamics::z_angle;
use crate::error::ConfigError;
use crate::sensors::{Sensor, SensorKind};
use crate::world::World;

/// Tolerance on the cycle-time gate, absorbing rounding in the physics clock (seconds).
const DUE_SLACK: f64 = 1e-9;

/// How roll stick deflection is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightMode {
    /// Stick position is the target angle; the craft self-levels on release
    #[default]
    Stable,
    /// Stick deflection is a rotation rate; the target angle free-integrates
    Acro,
}

/// Gains of the attitude PID loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 0.02,
            ki: 0.04,
            kd: 0.003,
        }
    }
}

/// Raw stick channels, each in [-1, 1].
///
/// Yaw and pitch are carried for completeness but the planar airframe only
/// responds to throttle and roll.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Channels {
    pub throttle: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Channels {
    pub fn from_array(values: [f64; 4]) -> Self {
        Self {
            throttle: values[0],
            yaw: values[1],
            pitch: values[2],
            roll: values[3],
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.throttle, self.yaw, self.pitch, self.roll]
    }

    pub fn clamped(&self) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        Self {
            throttle: clamp(self.throttle),
            yaw: clamp(self.yaw),
            pitch: clamp(self.pitch),
            roll: clamp(self.roll),
        }
    }
}

/// Digital attitude controller for a differential-thrust airframe.
///
/// The controller runs at its own cycle time, slower than the physics loop,
/// the way a flight controller samples a continuous airframe. Each cycle it:
/// 1. Maps the stick channels to a thrust scalar and a target roll angle
/// 2. Reads the gyro and runs a PID loop on the roll error
/// 3. Splits the PID output into per-motor thrust fractions
///
/// # Control Architecture
///
/// Sticks → handle_input → target angle, thrustscalar
///                               ↓
/// Gyro → z_angle → PID → steering split → tilt compensation → normalise → × thrustscalar
///                                                                          ↓
///                                                      per-motor fractions [0, 1]
///
pub struct AttitudeController {
    mode: FlightMode,
    /// Seconds between control cycles
    cycle_time: f64,
    gains: PidGains,
    gyro: Sensor,
    channels: Channels,

    // Controller state
    /// Roll angle the loop is steering towards, kept in (-π, π]
    target_angle: f64,
    integral: f64,
    previous_error: f64,
    thrustscalar: f64,
    /// Last per-motor command, as fractions of max thrust
    thrust: Vec<f64>,
    last_run: f64,
}

impl AttitudeController {
    /// Creates a controller for the given aircraft.
    ///
    /// # Arguments
    ///
    /// * `mode` - Stick interpretation, fixed for the controller's lifetime
    /// * `cycle_time` - Control period in seconds (e.g. 0.002 for a 500 Hz loop)
    /// * `gains` - PID gains
    /// * `gyro` - Orientation sensor the loop closes on
    /// * `aircraft` - Airframe the command vector is sized for
    ///
    /// # Returns
    ///
    /// A controller at rest, or a `ConfigError` for a non-positive cycle time
    ///
    /// # Example
    ///
    /// let gyro = Sensor::exact(SensorKind::Gyro);
    /// let controller = AttitudeController::new(
    ///     FlightMode::Stable, 0.002, PidGains::default(), gyro, &aircraft,
    /// )?;
    pub fn new(
        mode: FlightMode,
        cycle_time: f64,
        gains: PidGains,
        gyro: Sensor,
        aircraft: &Aircraft,
    ) -> Result<Self, ConfigError> {
        if !(cycle_time.is_finite() && cycle_time > 0.0) {
            return Err(ConfigError::invalid(
                "simulation.cycle_time",
                cycle_time,
                "must be positive",
            ));
        }
        if gyro.kind() != SensorKind::Gyro {
            log::warn!("attitude controller closing its loop on a {:?}", gyro.kind());
        }

        Ok(Self {
            mode,
            cycle_time,
            gains,
            gyro,
            channels: Channels::default(),
            target_angle: 0.0,
            integral: 0.0,
            previous_error: 0.0,
            thrustscalar: 0.0,
            thrust: vec![0.0; aircraft.motors().len()],
            last_run: f64::NEG_INFINITY,
        })
    }

    pub fn set_channels(&mut self, channels: Channels) {
        self.channels = channels.clamped();
    }

    /// Maps the stick channels onto `thrustscalar` and `target_angle`.
    ///
    /// A throttle of exactly zero is the centre stick and selects the hover
    /// thrustscalar, the fraction of total motor thrust that carries the
    /// craft's weight. In acro mode roll integrates into the target angle at
    /// up to 10 rad/s, wrapped back into (-π, π]. In stable mode roll maps
    /// directly onto ±π/4.
    pub fn handle_input(&mut self, aircraft: &Aircraft, world: &World) {
        let config = aircraft.config();
        self.thrustscalar = if self.channels.throttle == 0.0 {
            world.weight(config.mass) / config.total_max_thrust()
        } else {
            (self.channels.throttle + 1.0) / 2.0
        };

        match self.mode {
            FlightMode::Acro => {
                self.target_angle += self.channels.roll * self.cycle_time * 10.0;
                self.target_angle = wrap_angle(self.target_angle);
            }
            FlightMode::Stable => {
                self.target_angle = self.channels.roll * FRAC_PI_4;
            }
        }
    }

    /// One PID update on the roll error.
    ///
    /// # Arguments
    ///
    /// * `measured` - Orientation reading; only its roll angle is used
    /// * `dt` - Time since the previous update (seconds)
    ///
    /// # Returns
    ///
    /// `kp·e + ki·∫e + kd·de/dt`
    pub fn pid(&mut self, measured: &Vector3<f64>, dt: f64) -> f64 {
        let error = self.target_angle - z_angle(measured);
        self.integral += error * dt;
        let derivative = (error - self.previous_error) / dt;
        self.previous_error = error;

        self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative
    }

    /// Runs one full control cycle and returns the per-motor thrust fractions.
    ///
    /// The PID output is split across motors by their steering weight
    /// (`+1` for the motor at `-radius`, `-1` for the one at `+radius`), divided
    /// by the cosine of the measured tilt to recover the vertical component,
    /// then normalised by the largest fraction so that steering authority
    /// survives at full throttle. Division by the tilt cosine is singular when
    /// the craft is on its side.
    pub fn force(&mut self, aircraft: &Aircraft, world: &World) -> &[f64] {
        self.handle_input(aircraft, world);

        let reading = self.gyro.read(aircraft);
        let mut angle = self.pid(&reading, self.cycle_time);
        if !(-PI..=PI).contains(&angle) {
            angle = -angle;
        }

        let tilt = z_angle(&reading).cos();
        let radius = aircraft.config().radius;
        let mut fractions: Vec<f64> = aircraft
            .motors()
            .iter()
            .map(|motor| {
                let weight = -motor.position.x / radius;
                (PI + weight * angle) / TAU / tilt
            })
            .collect();

        let peak = fractions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for fraction in &mut fractions {
            if *fraction != 0.0 && peak != 0.0 {
                *fraction /= peak;
            }
            *fraction *= self.thrustscalar;
        }

        log::trace!(
            "control cycle: target {:.4} rad, pid {:.4}, thrustscalar {:.3}",
            self.target_angle,
            angle,
            self.thrustscalar
        );

        self.thrust = fractions;
        &self.thrust
    }

    /// Whether a full cycle time has elapsed since the last control run.
    pub fn is_due(&self, t_now: f64) -> bool {
        self.last_run + self.cycle_time <= t_now + DUE_SLACK
    }

    pub fn mark_run(&mut self, t_now: f64) {
        self.last_run = t_now;
    }

    /// Clears the loop state. Mode, gains and cycle time are kept.
    pub fn reset(&mut self) {
        self.target_angle = 0.0;
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.thrustscalar = 0.0;
        self.thrust.iter_mut().for_each(|f| *f = 0.0);
        self.last_run = f64::NEG_INFINITY;
    }

    // Getters
    pub fn mode(&self) -> FlightMode {
        self.mode
    }

    pub fn cycle_time(&self) -> f64 {
        self.cycle_time
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn target_angle(&self) -> f64 {
        self.target_angle
    }

    pub fn thrustscalar(&self) -> f64 {
        self.thrustscalar
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn previous_error(&self) -> f64 {
        self.previous_error
    }

    pub fn thrust_command(&self) -> &[f64] {
        &self.thrust
    }

    pub fn last_run(&self) -> f64 {
        self.last_run
    }
}

/// Wraps an angle into (-π, π] by whole turns.
pub fn wrap_angle(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}
