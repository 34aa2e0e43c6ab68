use std::f64::consts::PI;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use diffthrust::reference::reference_translation;
use diffthrust::{
    Aircraft, AircraftConfig, AttitudeController, Channels, Config, Flight, FlightMode, Motor,
    PidGains, Sensor, SensorKind, SimulationConfig, Simulator, World,
};

fn scenario_config() -> Config {
    Config {
        world: World::new(9.81, 1.225),
        aircraft: AircraftConfig {
            radius: 0.30,
            mass: 1.2,
            max_thrust: 23.544,
            adjust_rate: 0.01,
            ..AircraftConfig::default()
        },
        simulation: SimulationConfig {
            steps: 5000,
            mode: FlightMode::Stable,
            start_trimmed: true,
            ..SimulationConfig::default()
        },
        ..Config::default()
    }
}

fn exact_controller(mode: FlightMode, aircraft: &Aircraft) -> AttitudeController {
    AttitudeController::new(
        mode,
        0.002,
        PidGains::default(),
        Sensor::exact(SensorKind::Gyro),
        aircraft,
    )
    .unwrap()
}

#[test]
fn test_rest_invariant() {
    let world = World::default();
    let simulator = Simulator::new(5000, true);
    let mut aircraft = Aircraft::new(AircraftConfig::default()).unwrap();
    let mut controller = exact_controller(FlightMode::Stable, &aircraft);

    let mut t = 0.0;
    for frame in 1..=30 {
        t = simulator.simulate(t, frame as f64 / 60.0, &mut aircraft, &mut controller, &world);
        assert_eq!(aircraft.angular_momentum, Vector3::zeros());
        assert_eq!(aircraft.normal, Vector3::y());
    }
    // Motors are still spinning up, so the craft sinks straight down
    assert_eq!(aircraft.position.x, 0.0);
    assert_eq!(aircraft.position.z, 0.0);
}

#[test]
fn test_motor_lag_decays_geometrically() {
    for &adjust_rate in &[0.01, 0.1, 0.5] {
        let mut motor = Motor::new(Vector3::new(-0.3, 0.0, 0.0), 20.0);
        motor.hold(3.0);
        motor.command(0.9);

        let initial_gap = (motor.current_force - motor.target_force).norm();
        for n in 1..=500 {
            motor.update(adjust_rate);
            let gap = (motor.current_force - motor.target_force).norm();
            let bound = (1.0 - adjust_rate).powi(n) * initial_gap;
            assert!(
                gap <= bound + 1e-12,
                "rate {}, step {}: gap {} > bound {}",
                adjust_rate,
                n,
                gap,
                bound
            );
            assert!(motor.current_thrust() <= motor.target_thrust());
        }
    }
}

#[test]
fn test_acro_target_angle_stays_wrapped() {
    let world = World::default();
    let aircraft = Aircraft::new(AircraftConfig::default()).unwrap();
    let mut controller = exact_controller(FlightMode::Acro, &aircraft);
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for _ in 0..20_000 {
        let roll: f64 = rng.gen_range(-1.0..=1.0);
        // Bias towards saturated sticks so full turns actually happen
        let roll = if rng.gen_bool(0.3) { roll.signum() } else { roll };
        controller.set_channels(Channels::from_array([0.0, 0.0, 0.0, roll]));
        controller.handle_input(&aircraft, &world);

        let angle = controller.target_angle();
        assert!(angle > -PI && angle <= PI, "target angle {} escaped", angle);
    }
}

#[test]
fn test_acro_wrap_during_flight() {
    let mut config = scenario_config();
    config.simulation.mode = FlightMode::Acro;
    let mut flight = Flight::new(&config).unwrap();
    flight.set_channels(Channels::from_array([0.2, 0.0, 0.0, 1.0]));

    for frame in 1..=60 {
        flight.advance_to(frame as f64 / 60.0);
        let angle = flight.controller().target_angle();
        assert!(angle > -PI && angle <= PI);
    }
}

#[test]
fn test_exact_sensors_read_state() {
    let mut flight = Flight::new(&scenario_config()).unwrap();
    flight.set_channels(Channels::from_array([0.3, 0.0, 0.0, -0.6]));

    let mut gyro = Sensor::exact(SensorKind::Gyro);
    for frame in 1..=20 {
        flight.advance_to(frame as f64 / 100.0);
        let aircraft = flight.aircraft().clone();
        assert_eq!(gyro.read(&aircraft), aircraft.normal);
        assert_eq!(flight.read_accelerometer(), aircraft.acceleration);
    }
}

#[test]
fn test_hover_thrustscalar_is_a_quarter() {
    let config = scenario_config();
    let aircraft = Aircraft::new(config.aircraft).unwrap();
    let mut controller = exact_controller(FlightMode::Stable, &aircraft);

    controller.set_channels(Channels::default());
    controller.handle_input(&aircraft, &config.world);

    assert_relative_eq!(controller.thrustscalar(), 0.25, epsilon = 1e-12);
}

#[test]
fn test_substeps_compose() {
    let mut config = scenario_config();
    config.simulation.gyro_sigma = 0.01;
    config.simulation.seed = 7;
    let dt = config.simulation.dt();
    let sticks = Channels::from_array([0.4, 0.0, 0.0, 0.8]);

    let mut split = Flight::new(&config).unwrap();
    split.set_channels(sticks);
    split.advance_to(2.0 * dt);
    split.advance_to(4.0 * dt);

    let mut whole = Flight::new(&config).unwrap();
    whole.set_channels(sticks);
    whole.advance_to(4.0 * dt);

    assert_eq!(split.time(), whole.time());
    assert_eq!(split.aircraft(), whole.aircraft());
    assert_eq!(split.telemetry(), whole.telemetry());

    let (a, b) = (split.controller(), whole.controller());
    assert_eq!(a.target_angle(), b.target_angle());
    assert_eq!(a.integral(), b.integral());
    assert_eq!(a.previous_error(), b.previous_error());
    assert_eq!(a.thrust_command(), b.thrust_command());
    assert_eq!(a.last_run(), b.last_run());
}

#[test]
fn test_same_seed_replays_run() {
    let mut config = scenario_config();
    config.simulation.gyro_sigma = 0.02;
    config.simulation.accelerometer_sigma = 0.1;
    config.simulation.seed = 99;

    let run = |config: &Config| {
        let mut flight = Flight::new(config).unwrap();
        flight.set_channels(Channels::from_array([0.0, 0.0, 0.0, 0.5]));
        flight.advance_to(0.25);
        (flight.aircraft().clone(), flight.read_accelerometer())
    };

    assert_eq!(run(&config), run(&config));
}

#[test]
fn test_trimmed_hover_scenario() {
    let mut flight = Flight::new(&scenario_config()).unwrap();

    for frame in 1..=60 {
        flight.advance_to(frame as f64 / 60.0);
    }

    let aircraft = flight.aircraft();
    assert_abs_diff_eq!(flight.time(), 1.0, epsilon = 1e-9);
    assert!(aircraft.position.norm() < 1e-6, "drifted to {}", aircraft.position);
    assert_eq!(aircraft.normal, Vector3::y());
    assert_eq!(aircraft.angular_momentum, Vector3::zeros());
    assert_relative_eq!(flight.controller().thrustscalar(), 0.25, epsilon = 1e-12);
}

#[test]
fn test_large_gap_is_caught_up() {
    let mut paused = Flight::new(&scenario_config()).unwrap();
    paused.advance_to(0.5);

    let mut smooth = Flight::new(&scenario_config()).unwrap();
    for frame in 1..=30 {
        smooth.advance_to(frame as f64 / 60.0);
    }

    assert_abs_diff_eq!(paused.time(), smooth.time(), epsilon = 1e-9);
    assert_relative_eq!(
        paused.aircraft().position,
        smooth.aircraft().position,
        epsilon = 1e-9
    );
}

/// Runs the fixed-step integrator with every motor pinned to `thrust_each`.
fn fixed_step_translation(
    config: AircraftConfig,
    world: &World,
    normal: Vector3<f64>,
    thrust_each: f64,
    velocity: Vector3<f64>,
    seconds: f64,
) -> Aircraft {
    let simulator = Simulator::new(5000, true);
    let mut aircraft = Aircraft::new(config).unwrap();
    aircraft.normal = normal;
    aircraft.momentum = velocity * config.mass;
    for motor in &mut aircraft.motors {
        motor.hold(thrust_each);
    }
    let fraction = thrust_each / config.max_thrust;
    let command = vec![fraction; config.motor_count];

    let steps = (seconds * simulator.steps() as f64).round() as usize;
    for _ in 0..steps {
        simulator.step(&mut aircraft, &command, world, simulator.dt());
    }
    aircraft
}

#[test]
fn test_free_fall_matches_reference() {
    let config = AircraftConfig::default();
    let world = World::default();

    let aircraft =
        fixed_step_translation(config, &world, Vector3::y(), 0.0, Vector3::zeros(), 2.0);
    let (position, velocity) = reference_translation(
        &config,
        &world,
        Vector3::zeros(),
        Vector3::zeros(),
        Vector3::zeros(),
        (0.0, 2.0),
        1e-9,
    )
    .unwrap();

    assert_relative_eq!(aircraft.velocity(), velocity, max_relative = 1e-2);
    assert_relative_eq!(aircraft.position, position, max_relative = 1e-2);
}

#[test]
fn test_horizontal_throw_matches_reference() {
    let config = AircraftConfig::default();
    let world = World::default();
    let launch = Vector3::new(3.0, 1.0, 0.0);

    let aircraft = fixed_step_translation(config, &world, Vector3::y(), 0.0, launch, 1.0);
    let (position, velocity) = reference_translation(
        &config,
        &world,
        Vector3::zeros(),
        Vector3::zeros(),
        launch,
        (0.0, 1.0),
        1e-9,
    )
    .unwrap();

    assert_abs_diff_eq!(aircraft.velocity(), velocity, epsilon = 1e-2);
    assert_abs_diff_eq!(aircraft.position, position, epsilon = 1e-2);
}

#[test]
fn test_tilted_thrust_matches_reference() {
    let config = AircraftConfig::default();
    let world = World::default();
    let normal = Vector3::new(0.6, 0.8, 0.0);
    let thrust_each = world.weight(config.mass) / config.motor_count as f64;

    let aircraft = fixed_step_translation(config, &world, normal, thrust_each, Vector3::zeros(), 1.0);
    let (position, velocity) = reference_translation(
        &config,
        &world,
        normal * world.weight(config.mass),
        Vector3::zeros(),
        Vector3::zeros(),
        (0.0, 1.0),
        1e-9,
    )
    .unwrap();

    // Balanced motors exert no torque, so the tilt holds for the whole run
    assert_relative_eq!(aircraft.normal, normal, epsilon = 1e-12);
    assert!(position.x > 0.0 && position.y < 0.0);
    assert_abs_diff_eq!(aircraft.velocity(), velocity, epsilon = 1e-2);
    assert_abs_diff_eq!(aircraft.position, position, epsilon = 1e-2);
}
