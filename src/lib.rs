//! Planar flight dynamics for differential-thrust aircraft.
//!
//! An [`Aircraft`] carries N motors on a straight beam. An
//! [`AttitudeController`] turns stick input into per-motor thrust fractions and
//! a fixed-step [`Simulator`] advances the rigid body in a [`World`].
//! [`Flight`] bundles them behind a single time cursor.

pub mod aircraft;
pub mod config;
pub mod control;
pub mod dynamics;
pub mod error;
pub mod flight;
pub mod motor;
pub mod reference;
pub mod rng;
pub mod sensors;
pub mod world;

pub use aircraft::{Aircraft, AircraftConfig};
pub use config::{Config, SimulationConfig};
pub use control::{AttitudeController, Channels, FlightMode, PidGains};
pub use dynamics::Simulator;
pub use error::{ConfigError, SimError};
pub use flight::{Flight, Telemetry};
pub use motor::Motor;
pub use sensors::{Sensor, SensorKind};
pub use world::World;
