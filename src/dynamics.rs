use std::f64::consts::PI;

use nalgebra::{Rotation3, Vector3};

use crate::aircraft::Aircraft;
use crate::control::AttitudeController;
use crate::world::World;

/// Fraction of a physics step by which the time cursor may fall short of the
/// target and still count as arrived. Absorbs rounding in `t_now += dt`.
const STEP_SLACK: f64 = 1e-6;

/// Catch-up intervals longer than this are logged as warnings (seconds).
const LONG_CATCH_UP: f64 = 1.0;

/// Roll angle of an orientation vector about the world z axis.
///
/// Zero when `v` points straight up, positive when it leans towards +x.
pub fn z_angle(v: &Vector3<f64>) -> f64 {
    v.x.atan2(v.y)
}

/// Combined rotation about x, then y, then z: `Rx(a.x) * Ry(a.y) * Rz(a.z)`.
///
/// Elementary rotations do not commute, so this is only a first-order
/// approximation of integrating an angular velocity over a finite step.
pub fn rotation_xyz(angles: &Vector3<f64>) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angles.x)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), angles.y)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), angles.z)
}

/// Rotation taking the world frame into the body frame described by `normal`.
///
/// This is the smallest rotation carrying `normal` onto the reference up axis.
/// An upside-down craft turns through π about z; a zero normal has no defined
/// attitude and maps through the identity.
pub fn world_to_body(normal: &Vector3<f64>) -> Rotation3<f64> {
    if normal.norm() == 0.0 {
        return Rotation3::identity();
    }
    Rotation3::rotation_between(normal, &Vector3::y())
        .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::z_axis(), PI))
}

/// Restores the direction of a drag vector whose sign was lost to squaring.
///
/// Returns a vector with the magnitude of `raw_drag` pointing exactly against
/// `reference` (a velocity or angular momentum). With no motion there is no
/// drag.
pub fn correct_drag(raw_drag: &Vector3<f64>, reference: &Vector3<f64>) -> Vector3<f64> {
    let reference_norm = reference.norm();
    if reference_norm == 0.0 {
        return Vector3::zeros();
    }
    -reference * (raw_drag.norm() / reference_norm)
}

/// Fixed-step rigid-body integrator.
///
/// Physics advances in steps of `1/steps` seconds. The attitude controller is
/// sampled inside the loop whenever its own cycle time has elapsed, so a slow
/// digital controller drives a finely integrated airframe.
///
/// # Physics Convention
///
/// `angular_momentum` integrates raw torque (`L += (τ + drag)·dt`). The rate
/// that rotates the airframe is `L / I` with `I = mass·radius²`, and the
/// rotational drag is computed from that same rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simulator {
    /// Physics rate (Hz)
    steps: u32,
    /// Rescale `normal` to unit length after every rotation
    renormalize: bool,
}

impl Simulator {
    pub fn new(steps: u32, renormalize: bool) -> Self {
        Self {
            steps: steps.max(1),
            renormalize,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Physics timestep (seconds).
    pub fn dt(&self) -> f64 {
        1.0 / self.steps as f64
    }

    /// Advances the aircraft from `t_now` until `t_future` has been reached.
    ///
    /// # Arguments
    ///
    /// * `t_now` - Simulated-time cursor returned by the previous call (seconds)
    /// * `t_future` - Time to catch up to (seconds)
    /// * `aircraft` - Airframe state, advanced in place
    /// * `controller` - Attitude controller, run whenever it is due
    /// * `world` - Environment constants
    ///
    /// # Returns
    ///
    /// The new time cursor, `>= t_future` up to rounding. Pass it back in as
    /// `t_now` on the next call so that no time is skipped or repeated.
    ///
    /// # Example
    ///
    /// let mut t = 0.0;
    /// for frame in 1..=60 {
    ///     t = simulator.simulate(t, frame as f64 / 60.0, &mut aircraft, &mut controller, &world);
    /// }
    pub fn simulate(
        &self,
        mut t_now: f64,
        t_future: f64,
        aircraft: &mut Aircraft,
        controller: &mut AttitudeController,
        world: &World,
    ) -> f64 {
        let dt = self.dt();
        let gap = t_future - t_now;
        if gap > LONG_CATCH_UP {
            log::warn!("catching up {:.3} s of simulated time", gap);
        }

        let mut substeps: u64 = 0;
        while t_now + dt * STEP_SLACK < t_future {
            if controller.is_due(t_now) {
                controller.force(aircraft, world);
                controller.mark_run(t_now);
            }
            self.step(aircraft, controller.thrust_command(), world, dt);
            t_now += dt;
            substeps += 1;
        }

        log::debug!("simulated {} substeps, cursor at {:.6} s", substeps, t_now);
        t_now
    }

    /// Advances the aircraft by exactly one physics step of length `dt`.
    ///
    /// `command` holds one thrust fraction per motor; missing entries leave
    /// the motor's target untouched.
    pub fn step(&self, aircraft: &mut Aircraft, command: &[f64], world: &World, dt: f64) {
        let config = *aircraft.config();

        // Motors
        let mut torque = Vector3::zeros();
        for (motor, &fraction) in aircraft.motors.iter_mut().zip(command) {
            motor.command(fraction);
        }
        for motor in aircraft.motors.iter_mut() {
            motor.update(config.adjust_rate);
            torque += motor.torque();
        }

        // Rotation
        let omega = aircraft.angular_velocity();
        let rotational_drag = correct_drag(
            &(omega.component_mul(&omega)
                * (0.5
                    * world.fluid_density
                    * config.drag_coefficient
                    * config.rotational_drag_volume())),
            &aircraft.angular_momentum,
        );
        aircraft.angular_momentum += (torque + rotational_drag) * dt;
        let rotation = rotation_xyz(&(aircraft.angular_velocity() * dt));
        aircraft.normal = rotation * aircraft.normal;
        if self.renormalize {
            let length = aircraft.normal.norm();
            if length > 0.0 {
                aircraft.normal /= length;
            }
        }

        // Translation
        let velocity = aircraft.velocity();
        let drag = correct_drag(
            &(velocity.component_mul(&velocity)
                * (0.5 * world.fluid_density * config.drag_coefficient * config.frontal_area())),
            &aircraft.momentum,
        );

        let normal_length = aircraft.normal.norm();
        let ratio = if normal_length > 0.0 {
            aircraft.total_thrust() / normal_length
        } else {
            log::debug!("zero-length orientation, thrust not applied");
            0.0
        };

        let gravity = Vector3::new(0.0, -world.weight(config.mass), 0.0);
        let netforce = aircraft.normal * ratio + gravity + drag;
        aircraft.momentum += netforce * dt;
        aircraft.position += aircraft.momentum / config.mass * dt;

        aircraft.acceleration = world_to_body(&aircraft.normal) * (netforce / config.mass);
    }
}
