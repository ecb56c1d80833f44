//! SPDX-License-Identifier: MIT OR Apache-2.0
//!
//! # Interrupt-driven Temperature Monitor
//!
//! Samples an I2C temperature sensor at 500 ms / 1 s / 2 s / 4 s, reports
//! each reading over UART (DMA) and cycles the rate on a button press:
//! - **Hardware Module:** HAL bring-up (`hardware.rs`).
//! - **Board Module:** RP2350 drivers for timer, I2C, UART DMA, button (`board.rs`).
//! - **USB Module:** Telemetry over USB Serial (`usb_module.rs`).
//! - **Controller:** Event flags and the polling loop (`temp_monitor` library).
//!
//! Target: Raspberry Pi Pico 2 W (RP2350).

#![no_std]
#![no_main]

// --- Imports ---
use defmt::*;
use defmt_rtt as _;
use panic_probe as _;
use temp_monitor::{
    Board, BusHandler, ChannelHandler, Config, Controller, EventFlags, PinHandler, Telemetry,
    TimerHandler,
};

// --- Modules ---
mod board;
mod hardware;
mod usb_module;

// --- HAL Selection ---
use rp235x_hal as hal;
use hal::entry;

// Select appropriate interrupt macro based on chip architecture
use rp235x_hal::pac::interrupt;

// --- Bootloader Configuration ---

#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: hal::block::ImageDef = hal::block::ImageDef::secure_exe();

// --- Shared State ---

// Event flags: set by the handlers below, consumed by the controller
static FLAGS: EventFlags = EventFlags::new();

/// Latest temperature and rate index, readable by symbol from a debug probe.
#[unsafe(no_mangle)]
#[used]
pub static TELEMETRY: Telemetry = Telemetry::new();

// One handler per interrupt, each holding only its own flag
static TIMER_EVENTS: TimerHandler<'static> = TimerHandler::new(&FLAGS.timer_expired);
static BUTTON_EVENTS: PinHandler<'static> = PinHandler::new(&FLAGS.rate_change_requested);
static SENSOR_EVENTS: BusHandler<'static> = BusHandler::new(&FLAGS.sample_ready);
static UART_EVENTS: ChannelHandler<'static> = ChannelHandler::new(&FLAGS.transmit_complete);

/// Entry point.
#[entry]
fn main() -> ! {
    info!("Program start");

    // 1. Initialize Hardware Stack (Clocks, GPIO, Timer, I2C, UART, DMA, USB)
    let hw = hardware::init();
    board::register_button(hw.button_pin);

    // 2. Initialize Application State (Controller)
    let board = Board {
        bus: board::SensorI2c::new(hw.i2c),
        channel: board::UartDma::new(hw.uart),
        timer: board::AlarmTimer::new(hw.alarm),
        indicator: hw.led_pin,
        link: usb_module::UsbTelemetry::new(),
    };
    let mut controller = Controller::new(Config::default(), &FLAGS, &TELEMETRY, board);
    controller.init();

    // 3. Let the peripherals talk
    hardware::unmask_interrupts();

    // 4. Main Application Loop
    controller.run()
}

// --- Interrupt Handlers ---

#[allow(non_snake_case)]
#[interrupt]
fn TIMER0_IRQ_0() {
    TIMER_EVENTS.on_interrupt(board::alarm_interrupt());
}

#[allow(non_snake_case)]
#[interrupt]
fn I2C0_IRQ() {
    if let Some(status) = board::i2c_interrupt() {
        SENSOR_EVENTS.on_transfer_complete(status);
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn DMA_IRQ_0() {
    if let Some(event) = board::dma_interrupt() {
        UART_EVENTS.on_transfer_event(event);
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn IO_IRQ_BANK0() {
    if board::button_interrupt() {
        BUTTON_EVENTS.on_edge();
    }
}

// --- Metadata ---

#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [hal::binary_info::EntryAddr; 4] = [
    hal::binary_info::rp_cargo_bin_name!(),
    hal::binary_info::rp_cargo_version!(),
    hal::binary_info::rp_program_description!(c"Temperature Monitor"),
    hal::binary_info::rp_program_build_attribute!()
];
