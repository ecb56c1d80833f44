//! Mock peripherals and a test rig around the controller.

#![allow(dead_code)]

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use embedded_hal::i2c::ErrorKind;
use fugit::MillisDurationU32;
use temp_monitor::{
    Board, BusHandler, ChannelHandler, Config, Controller, EventFlags, PeriodicTimer, PinHandler,
    RawSample, SensorBus, SerialChannel, Telemetry, TelemetryLink, TelemetrySnapshot, TimerHandler,
    TimerInterrupt, TransferEvent,
};

// ============================================================================
// Mock peripherals
// ============================================================================

#[derive(Debug, Default)]
pub struct MockBus {
    pub requests: Vec<(u8, u8)>,
    pub next_sample: RawSample,
}

impl SensorBus for MockBus {
    fn request_read(&mut self, address: u8, register: u8) {
        self.requests.push((address, register));
    }

    fn sample(&mut self) -> RawSample {
        self.next_sample
    }
}

#[derive(Debug, Default)]
pub struct MockChannel {
    pub sent: Vec<String>,
}

impl SerialChannel for MockChannel {
    fn start_transmit(&mut self, bytes: &[u8]) {
        self.sent.push(String::from_utf8(bytes.to_vec()).unwrap());
    }
}

#[derive(Debug, Default)]
pub struct MockTimer {
    pub periods_ms: Vec<u32>,
}

impl PeriodicTimer for MockTimer {
    fn set_period(&mut self, period: MillisDurationU32) {
        self.periods_ms.push(period.to_millis());
    }
}

#[derive(Debug, Default)]
pub struct MockLed {
    pub high: bool,
    pub toggles: usize,
}

impl ErrorType for MockLed {
    type Error = Infallible;
}

impl OutputPin for MockLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

impl StatefulOutputPin for MockLed {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.toggles += 1;
        self.high = !self.high;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockLink {
    pub services: usize,
    pub last: Option<TelemetrySnapshot>,
}

impl TelemetryLink for MockLink {
    fn service(&mut self, telemetry: &Telemetry) {
        self.services += 1;
        self.last = Some(telemetry.snapshot());
    }
}

pub type TestController =
    Controller<'static, MockBus, MockChannel, MockTimer, MockLed, MockLink>;

// ============================================================================
// Test rig
// ============================================================================

/// Controller plus the interrupt handlers a board would wire to it.
pub struct Rig {
    pub flags: &'static EventFlags,
    pub telemetry: &'static Telemetry,
    pub controller: TestController,
}

impl Rig {
    /// Rig without the start-up banner, already initialized.
    pub fn new() -> Self {
        let config = Config { banner: None, ..Config::default() };
        let mut rig = Self::with_config(config);
        rig.controller.init();
        rig
    }

    /// Rig with `config`, not yet initialized.
    pub fn with_config(config: Config) -> Self {
        let flags: &'static EventFlags = Box::leak(Box::new(EventFlags::new()));
        let telemetry: &'static Telemetry = Box::leak(Box::new(Telemetry::new()));
        let board = Board {
            bus: MockBus::default(),
            channel: MockChannel::default(),
            timer: MockTimer::default(),
            indicator: MockLed::default(),
            link: MockLink::default(),
        };
        let controller = Controller::new(config, flags, telemetry, board);
        Self { flags, telemetry, controller }
    }

    pub fn timer_fires(&self) {
        TimerHandler::new(&self.flags.timer_expired).on_interrupt(TimerInterrupt::COMPARE0);
    }

    pub fn button_pressed(&self) {
        PinHandler::new(&self.flags.rate_change_requested).on_edge();
    }

    pub fn bus_completes(&self, status: Result<(), ErrorKind>) {
        BusHandler::new(&self.flags.sample_ready).on_transfer_complete(status);
    }

    pub fn dma_completes(&self) {
        ChannelHandler::new(&self.flags.transmit_complete).on_transfer_event(TransferEvent::Complete);
    }

    pub fn poll(&mut self) {
        self.controller.poll();
    }

    /// Sets the bytes the sensor will return on the next read.
    pub fn sensor_reads(&mut self, bytes: [u8; 2]) {
        self.controller.board_mut().bus.next_sample = RawSample::new(bytes);
    }

    /// One full timer period with a successful read, UART idle afterwards.
    pub fn sample_cycle(&mut self) {
        self.timer_fires();
        self.poll();
        self.bus_completes(Ok(()));
        self.poll();
        self.dma_completes();
        self.poll();
    }

    pub fn sent(&self) -> &[String] {
        &self.controller.board().channel.sent
    }

    pub fn last_sent(&self) -> Option<&str> {
        self.sent().last().map(String::as_str)
    }

    pub fn bus_requests(&self) -> &[(u8, u8)] {
        &self.controller.board().bus.requests
    }

    pub fn timer_periods(&self) -> &[u32] {
        &self.controller.board().timer.periods_ms
    }

    pub fn led_toggles(&self) -> usize {
        self.controller.board().indicator.toggles
    }
}
