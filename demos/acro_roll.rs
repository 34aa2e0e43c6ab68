use std::env;

use diffthrust::{Channels, Config, Flight, FlightMode};

// Full-stick acro roll followed by a release. An optional YAML config path
// overrides the built-in airframe.
fn main() {
    let mut config = match env::args().nth(1) {
        Some(path) => match Config::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                println!("Failed to load {}: {}", path, e);
                return;
            }
        },
        None => Config::default(),
    };
    config.simulation.mode = FlightMode::Acro;
    config.simulation.start_trimmed = true;

    let mut flight = match Flight::new(&config) {
        Ok(flight) => flight,
        Err(e) => {
            println!("Invalid config: {}", e);
            return;
        }
    };

    flight.set_channels(Channels::from_array([0.3, 0.0, 0.0, 1.0]));
    flight.advance_to(0.4);
    flight.set_channels(Channels::from_array([0.3, 0.0, 0.0, 0.0]));

    for step in 1..=8 {
        flight.advance_to(0.4 + step as f64 * 0.1);
        match serde_yaml::to_string(&flight.telemetry()) {
            Ok(yaml) => println!("---\n{}", yaml),
            Err(e) => println!("Telemetry failed: {}", e),
        }
    }
}
