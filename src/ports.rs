//! Hardware collaborators driven by the control loop.
//!
//! Every operation only *starts* the hardware. Completion is reported by the
//! matching interrupt handler through the event flags, never by return value.
//! The indicator LED is any `embedded_hal::digital::StatefulOutputPin`.

use fugit::MillisDurationU32;

use crate::decode::RawSample;

/// Sensor read over a two-wire bus.
pub trait SensorBus {
    /// Starts writing `register` to the device at `address` followed by a
    /// 2-byte read. Returns immediately.
    fn request_read(&mut self, address: u8, register: u8);

    /// Bytes captured by the last successful read. Only meaningful after
    /// `sample_ready` was raised for it.
    fn sample(&mut self) -> RawSample;
}

/// Asynchronous serial transmit (UART fed by DMA).
pub trait SerialChannel {
    /// Starts transmitting `bytes`. Returns immediately.
    ///
    /// Implementations may keep reading `bytes` after returning, until they
    /// raise `transmit_complete`. The caller leaves the buffer untouched
    /// until then.
    fn start_transmit(&mut self, bytes: &[u8]);
}

/// Periodic compare timer pacing the sensor reads.
pub trait PeriodicTimer {
    /// Reprograms the compare period. Takes effect from the next match.
    fn set_period(&mut self, period: MillisDurationU32);
}
