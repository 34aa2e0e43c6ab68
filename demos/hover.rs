use diffthrust::{Channels, Config, Flight, SimulationConfig};

// Trimmed hover, then a gentle stable-mode lean to the right
fn main() {
    let config = Config {
        simulation: SimulationConfig {
            start_trimmed: true,
            ..SimulationConfig::default()
        },
        ..Config::default()
    };

    let mut flight = match Flight::new(&config) {
        Ok(flight) => flight,
        Err(e) => {
            println!("Invalid config: {}", e);
            return;
        }
    };

    let frame = 1. / 60.; // 60 fps
    let simulation_span = 3.0;
    let mut current_time = 0.0;
    let mut frames = 0;

    while current_time < simulation_span {
        if current_time >= 1.0 {
            flight.set_channels(Channels::from_array([0.0, 0.0, 0.0, 0.2]));
        }
        current_time = flight.advance_by(frame);
        frames += 1;

        if frames % 15 == 0 {
            let t = flight.telemetry();
            println!(
                "t = {:.3} s  position: ({:.4}, {:.4})  angle: {:.4} rad  target: {:.4} rad  thrust: {:?}",
                t.time,
                t.position[0],
                t.position[1],
                t.angle,
                t.target_angle,
                t.current_thrusts
                    .iter()
                    .map(|f| (f * 1000.0).round() / 1000.0)
                    .collect::<Vec<_>>()
            );
        }
    }
}
