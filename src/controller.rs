//! The main control loop.
//!
//! Single-threaded and non-blocking: each [`Controller::poll`] looks at the
//! event flags once, starts whatever hardware action they call for and
//! returns. Interrupt handlers are the only other writers of shared state, and
//! they only ever set flags.
//!
//! Order of one iteration:
//! 1. Service the telemetry link.
//! 2. `transmit_complete` → free the outbox slot owned by the UART DMA and
//!    send the line that was waiting for it.
//! 3. `timer_expired` → start the sensor read.
//! 4. `sample_ready` → if a rate change is pending, advance the rate FSM
//!    and announce it; otherwise decode, publish and report the temperature
//!    and toggle the LED. Rate changes win over temperature reports for that
//!    sample.
//! 5. Hand the pending status line to the UART if it is idle.
//!
//! A failed sensor read never raises `sample_ready`, so the loop simply waits
//! for the next timer period to try again.

use embedded_hal::digital::StatefulOutputPin;

use crate::config::Config;
use crate::error::Error;
use crate::flags::EventFlags;
use crate::message::{self, Outbox, StatusMessage};
use crate::ports::{PeriodicTimer, SensorBus, SerialChannel};
use crate::rate::{RateMachine, SamplingRate};
use crate::telemetry::{Telemetry, TelemetryLink};

/// The peripherals the controller drives.
#[derive(Debug)]
pub struct Board<B, C, T, L, K> {
    pub bus: B,
    pub channel: C,
    pub timer: T,
    pub indicator: L,
    pub link: K,
}

pub struct Controller<'a, B, C, T, L, K> {
    config: Config,
    flags: &'a EventFlags,
    telemetry: &'a Telemetry,
    board: Board<B, C, T, L, K>,
    rate: RateMachine,
    outbox: Outbox,
}

impl<'a, B, C, T, L, K> Controller<'a, B, C, T, L, K>
where
    B: SensorBus,
    C: SerialChannel,
    T: PeriodicTimer,
    L: StatefulOutputPin,
    K: TelemetryLink,
{
    pub fn new(
        config: Config,
        flags: &'a EventFlags,
        telemetry: &'a Telemetry,
        board: Board<B, C, T, L, K>,
    ) -> Self {
        Self {
            config,
            flags,
            telemetry,
            board,
            rate: RateMachine::new(config.initial_rate),
            outbox: Outbox::new(),
        }
    }

    /// Programs the initial period, publishes the rate and sends the banner.
    ///
    /// Call once, before the peripheral interrupts are unmasked.
    pub fn init(&mut self) {
        let rate = self.rate.rate();
        self.board.timer.set_period(rate.period());
        self.telemetry.publish_rate(rate);

        if let Some(banner) = self.config.banner {
            self.queue(|msg| message::write_line(msg, banner));
        }
        self.flush();

        info!("Sampling every {} ms", rate.period().to_millis());
    }

    /// Polls forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.poll();
        }
    }

    /// One pass over the event flags.
    pub fn poll(&mut self) {
        self.board.link.service(self.telemetry);

        if self.flags.transmit_complete.consume() {
            self.outbox.release();
            // A line queued while the UART was busy goes out before anything new is composed.
            self.flush();
        }

        if self.flags.timer_expired.consume() {
            trace!("Timer expired, reading sensor");
            self.board
                .bus
                .request_read(self.config.sensor_address, self.config.register);
        }

        if self.flags.sample_ready.consume() {
            if self.flags.rate_change_requested.consume() {
                self.change_rate();
            } else {
                self.report_temperature();
            }
        }

        self.flush();
    }

    pub fn rate(&self) -> SamplingRate {
        self.rate.rate()
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn board(&self) -> &Board<B, C, T, L, K> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<B, C, T, L, K> {
        &mut self.board
    }

    fn change_rate(&mut self) {
        let rate = self.rate.advance();
        self.board.timer.set_period(rate.period());
        self.telemetry.publish_rate(rate);
        info!("Sampling rate changed to {} ms", rate.period().to_millis());

        self.queue(|msg| message::write_line(msg, rate.announcement()));
    }

    fn report_temperature(&mut self) {
        let celsius = self.board.bus.sample().celsius();
        self.telemetry.publish_temperature(celsius);
        debug!("Temperature = {} C", celsius);

        self.queue(|msg| message::write_temperature(msg, celsius));

        if self.board.indicator.toggle().is_err() {
            warn!("LED toggle failed: {}", Error::Indicator);
        }
    }

    fn queue<F>(&mut self, write: F)
    where
        F: FnOnce(&mut StatusMessage) -> Result<(), Error>,
    {
        match self.outbox.compose(write) {
            Ok(false) => {}
            Ok(true) => warn!("UART busy, unsent status line replaced"),
            Err(e) => warn!("Status line dropped: {}", e),
        }
    }

    fn flush(&mut self) {
        if let Some(frame) = self.outbox.dispatch() {
            self.board.channel.start_transmit(frame);
        }
    }
}
