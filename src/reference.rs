use fast_ode;
use nalgebra::Vector3;

use crate::aircraft::AircraftConfig;
use crate::dynamics::correct_drag;
use crate::error::SimError;
use crate::world::World;

/// Continuous-time model of the translational subsystem.
///
/// The airframe is held at a fixed attitude with a constant thrust vector, so
/// only gravity, thrust and quadratic drag act on it. Solving this with an
/// adaptive integrator gives a yardstick for the fixed-step simulator.
///
/// # State layout
///
/// [pos_x, pos_y, pos_z, vel_x, vel_y, vel_z]
pub struct TranslationOde {
    pub mass: f64,
    pub g: f64,
    /// `0.5 · fluid_density · drag_coefficient · frontal_area`
    pub drag_factor: f64,
    /// Constant applied thrust, world frame (N)
    pub thrust: Vector3<f64>,
}

impl TranslationOde {
    pub fn new(config: &AircraftConfig, world: &World, thrust: Vector3<f64>) -> Self {
        Self {
            mass: config.mass,
            g: world.g,
            drag_factor: 0.5
                * world.fluid_density
                * config.drag_coefficient
                * config.frontal_area(),
            thrust,
        }
    }
}

impl fast_ode::DifferentialEquation<6> for TranslationOde {
    fn ode_dot_y(&self, _t: f64, y: &fast_ode::Coord<6>) -> (fast_ode::Coord<6>, bool) {
        let state = y.0;
        let velocity = Vector3::new(state[3], state[4], state[5]);

        let drag = correct_drag(
            &(velocity.component_mul(&velocity) * self.drag_factor),
            &velocity,
        );
        let gravity = Vector3::new(0.0, -self.g * self.mass, 0.0);
        let acceleration = (self.thrust + gravity + drag) / self.mass;

        (
            fast_ode::Coord([
                velocity.x,
                velocity.y,
                velocity.z,
                acceleration.x,
                acceleration.y,
                acceleration.z,
            ]),
            true,
        )
    }
}

/// Solves the translational model over `time_span`.
///
/// # Arguments
///
/// * `config` - Airframe supplying mass and drag geometry
/// * `world` - Environment constants
/// * `thrust` - Constant thrust vector, world frame (N)
/// * `position`, `velocity` - Initial conditions
/// * `time_span` - (t_start, t_end) in seconds
/// * `tolerance` - Relative tolerance of the adaptive solver
///
/// # Returns
///
/// * `Ok((position, velocity))` at `t_end`
/// * `Err(SimError::IntegrationFailed)` if the solver gives up
pub fn reference_translation(
    config: &AircraftConfig,
    world: &World,
    thrust: Vector3<f64>,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    time_span: (f64, f64),
    tolerance: f64,
) -> Result<(Vector3<f64>, Vector3<f64>), SimError> {
    let ode = TranslationOde::new(config, world, thrust);
    let initial = fast_ode::Coord([
        position.x, position.y, position.z, velocity.x, velocity.y, velocity.z,
    ]);

    let result = fast_ode::solve_ivp(
        &ode,
        time_span,
        initial,
        |_, _| true,
        tolerance,
        tolerance * 10.0,
    );

    match result {
        fast_ode::IvpResult::FinalTimeReached(final_coord) => {
            let s = final_coord.0;
            Ok((
                Vector3::new(s[0], s[1], s[2]),
                Vector3::new(s[3], s[4], s[5]),
            ))
        }
        _ => Err(SimError::IntegrationFailed {
            t_start: time_span.0,
            t_end: time_span.1,
        }),
    }
}
