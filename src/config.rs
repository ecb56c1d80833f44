//! Compile-time configuration for the control loop.

use crate::rate::SamplingRate;

/// 7-bit I2C address of the temperature sensor.
pub const SENSOR_ADDRESS: u8 = 0x4F;

/// Temperature register of the sensor (register pointer 0).
pub const TEMPERATURE_REGISTER: u8 = 0x00;

/// Capacity in bytes of one status line buffer.
pub const MESSAGE_CAPACITY: usize = 100;

/// Line sent once when the controller starts.
pub const START_BANNER: &str = "Start Of Program \r\n";

/// Runtime parameters handed to the [`Controller`](crate::Controller).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// I2C address of the sensor.
    pub sensor_address: u8,
    /// Register pointer written before each 2-byte read.
    pub register: u8,
    /// Sampling rate programmed at start-up.
    pub initial_rate: SamplingRate,
    /// Line queued by `Controller::init`, if any.
    pub banner: Option<&'static str>,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            sensor_address: SENSOR_ADDRESS,
            register: TEMPERATURE_REGISTER,
            initial_rate: SamplingRate::Every500Ms,
            banner: Some(START_BANNER),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
