use nalgebra::Vector3;

/// A single thrust-producing motor mounted on the airframe.
///
/// Thrust acts purely along the motor's local up axis, so both force vectors
/// only ever carry a y component in the body frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Motor {
    /// Offset of the motor shaft from the centre of mass, body frame (m)
    pub position: Vector3<f64>,
    /// Largest thrust the motor can produce (N)
    pub max_thrust: f64,
    /// Force the motor is spinning towards (N)
    pub target_force: Vector3<f64>,
    /// Force the motor is producing right now (N)
    pub current_force: Vector3<f64>,
}

impl Motor {
    pub fn new(position: Vector3<f64>, max_thrust: f64) -> Self {
        Self {
            position,
            max_thrust,
            target_force: Vector3::zeros(),
            current_force: Vector3::zeros(),
        }
    }

    /// Sets the target force from a command expressed as a fraction of max thrust.
    ///
    /// The fraction is clamped to [0, 1]; a non-finite command spins the motor down.
    pub fn command(&mut self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.target_force = Vector3::new(0.0, fraction * self.max_thrust, 0.0);
    }

    /// Relaxes the current force towards the target by one physics step.
    pub fn update(&mut self, adjust_rate: f64) {
        self.current_force =
            self.current_force * (1.0 - adjust_rate) + self.target_force * adjust_rate;
    }

    /// Torque about the centre of mass produced by the current force.
    pub fn torque(&self) -> Vector3<f64> {
        self.position.cross(&self.current_force)
    }

    /// Pins both target and current force to a steady vertical thrust.
    pub fn hold(&mut self, thrust: f64) {
        let thrust = thrust.clamp(0.0, self.max_thrust);
        self.target_force = Vector3::new(0.0, thrust, 0.0);
        self.current_force = self.target_force;
    }

    pub fn reset(&mut self) {
        self.target_force = Vector3::zeros();
        self.current_force = Vector3::zeros();
    }

    // Getters
    pub fn current_thrust(&self) -> f64 {
        self.current_force.y
    }

    pub fn target_thrust(&self) -> f64 {
        self.target_force.y
    }
}
