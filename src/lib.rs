//! SPDX-License-Identifier: MIT OR Apache-2.0
//!
//! # Interrupt-driven temperature monitor core
//!
//! Hardware-independent half of the temperature monitor firmware. Four
//! interrupt sources (periodic timer, I2C read completion, UART DMA completion
//! and an external push button) raise single-bit event flags; a busy-polling
//! control loop consumes them and drives the next action:
//!
//! - **Decoder:** raw sensor bytes to degrees Celsius (`decode.rs`).
//! - **Event flags:** the only channel between interrupt and main context (`flags.rs`).
//! - **Handlers:** per-interrupt flag raisers (`handlers.rs`).
//! - **Rate FSM:** 500 ms / 1 s / 2 s / 4 s cyclic sampling rate (`rate.rs`).
//! - **Controller:** the non-blocking main loop (`controller.rs`).
//!
//! The board bring-up for the RP2350 lives in the `temp_monitor` binary and is
//! only built with the `firmware` feature.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to the other modules.
#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod decode;
pub mod error;
pub mod flags;
pub mod handlers;
pub mod message;
pub mod ports;
pub mod rate;
pub mod telemetry;

pub use config::Config;
pub use controller::{Board, Controller};
pub use decode::RawSample;
pub use error::Error;
pub use flags::{EventFlag, EventFlags};
pub use handlers::{BusHandler, ChannelHandler, PinHandler, TimerHandler, TimerInterrupt, TransferEvent};
pub use message::{Outbox, StatusMessage};
pub use ports::{PeriodicTimer, SensorBus, SerialChannel};
pub use rate::{RateMachine, SamplingRate};
pub use telemetry::{Telemetry, TelemetryLink, TelemetrySnapshot};
