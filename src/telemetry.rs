//! Values exposed to a host-side monitor.
//!
//! The control loop is the only writer. Readers (a debug probe reading the
//! exported static, or the serial link below) get no consistency guarantee
//! across the two fields beyond "eventually up to date".

use core::sync::atomic::{AtomicU8, Ordering};

use crate::rate::SamplingRate;

/// Latest temperature and sampling-rate index.
#[derive(Debug)]
#[repr(C)]
pub struct Telemetry {
    temperature: AtomicU8,
    rate_index: AtomicU8,
}

/// Point-in-time copy of [`Telemetry`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySnapshot {
    pub temperature: u8,
    pub rate_index: u8,
}

impl Telemetry {
    pub const fn new() -> Self {
        Self {
            temperature: AtomicU8::new(0),
            rate_index: AtomicU8::new(SamplingRate::Every500Ms.index()),
        }
    }

    pub fn publish_temperature(&self, celsius: u8) {
        self.temperature.store(celsius, Ordering::Relaxed);
    }

    pub fn publish_rate(&self, rate: SamplingRate) {
        self.rate_index.store(rate.index(), Ordering::Relaxed);
    }

    pub fn temperature(&self) -> u8 {
        self.temperature.load(Ordering::Relaxed)
    }

    pub fn rate_index(&self) -> u8 {
        self.rate_index.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            temperature: self.temperature(),
            rate_index: self.rate_index(),
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Background service for the telemetry transport.
///
/// Called once at the top of every control loop iteration. Implementations
/// must return promptly and never wait on I/O.
pub trait TelemetryLink {
    fn service(&mut self, telemetry: &Telemetry);
}

/// No transport: values are only readable through memory.
impl TelemetryLink for () {
    fn service(&mut self, _telemetry: &Telemetry) {}
}
