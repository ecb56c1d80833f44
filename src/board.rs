//! RP2350 implementations of the controller's hardware ports.
//!
//! Each driver starts its transfer by register access and leaves completion to
//! its interrupt. The `*_interrupt` functions do the peripheral-side
//! acknowledgement for `main`'s interrupt handlers and report what happened.

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use fugit::MillisDurationU32;
use temp_monitor::{PeriodicTimer, RawSample, SensorBus, SerialChannel, TimerInterrupt, TransferEvent};

use rp235x_hal as hal;
use hal::fugit::MicrosDurationU32;
use hal::gpio::bank0::{Gpio0, Gpio1, Gpio14, Gpio15, Gpio4, Gpio5};
use hal::gpio::{FunctionI2C, FunctionSio, FunctionUart, Pin, PullDown, PullUp, SioInput, SioOutput};
use hal::pac;
use hal::timer::{Alarm, Alarm0, CopyableTimer0};

pub type LedPin = Pin<Gpio15, FunctionSio<SioOutput>, PullDown>;

pub type ButtonPin = Pin<Gpio14, FunctionSio<SioInput>, PullUp>;

pub type I2cBus = hal::I2C<
    pac::I2C0,
    (Pin<Gpio4, FunctionI2C, PullUp>, Pin<Gpio5, FunctionI2C, PullUp>),
>;

pub type UartBus = hal::uart::UartPeripheral<
    hal::uart::Enabled,
    pac::UART0,
    (Pin<Gpio0, FunctionUart, PullDown>, Pin<Gpio1, FunctionUart, PullDown>),
>;

// --- Periodic timer (TIMER0 alarm 0) ---

static ALARM: Mutex<RefCell<Option<Alarm0<CopyableTimer0>>>> = Mutex::new(RefCell::new(None));

/// Current period, read by the alarm interrupt when it re-arms.
static PERIOD_US: AtomicU32 = AtomicU32::new(500_000);

pub struct AlarmTimer {
    running: bool,
}

impl AlarmTimer {
    pub fn new(mut alarm: Alarm0<CopyableTimer0>) -> Self {
        alarm.enable_interrupt();
        critical_section::with(|cs| {
            ALARM.borrow_ref_mut(cs).replace(alarm);
        });
        Self { running: false }
    }
}

impl PeriodicTimer for AlarmTimer {
    fn set_period(&mut self, period: MillisDurationU32) {
        PERIOD_US.store(period.to_micros(), Ordering::Relaxed);

        // Later changes are picked up when the interrupt re-arms.
        if !self.running {
            critical_section::with(|cs| {
                if let Some(alarm) = ALARM.borrow_ref_mut(cs).as_mut() {
                    if alarm.schedule(MicrosDurationU32::micros(period.to_micros())).is_err() {
                        defmt::warn!("Sampling alarm not started ({} ms)", period.to_millis());
                    }
                }
            });
            self.running = true;
        }
    }
}

/// Acknowledges and re-arms alarm 0. Returns the pending TIMER0 causes.
pub fn alarm_interrupt() -> TimerInterrupt {
    let pending = unsafe { (*pac::TIMER0::ptr()).ints().read().bits() };

    critical_section::with(|cs| {
        if let Some(alarm) = ALARM.borrow_ref_mut(cs).as_mut() {
            alarm.clear_interrupt();
            let period_us = PERIOD_US.load(Ordering::Relaxed);
            if alarm.schedule(MicrosDurationU32::micros(period_us)).is_err() {
                defmt::warn!("Sampling alarm not re-armed ({} us)", period_us);
            }
        }
    });

    TimerInterrupt::from_bits_truncate(pending)
}

// --- Sensor read (I2C0) ---

static SAMPLE: Mutex<Cell<[u8; 2]>> = Mutex::new(Cell::new([0; 2]));

pub struct SensorI2c {
    _bus: I2cBus,
}

impl SensorI2c {
    /// Takes the HAL-configured bus so pins and clocks stay claimed.
    pub fn new(bus: I2cBus) -> Self {
        Self { _bus: bus }
    }
}

impl SensorBus for SensorI2c {
    fn request_read(&mut self, address: u8, register: u8) {
        unsafe {
            let i2c = &(*pac::I2C0::ptr());

            // Target address can only change while the block is disabled.
            i2c.ic_enable().write(|w| w.enable().clear_bit());
            i2c.ic_tar().write(|w| w.ic_tar().bits(address.into()));
            i2c.ic_enable().write(|w| w.enable().set_bit());

            // Drop anything left behind by an aborted read.
            while i2c.ic_rxflr().read().bits() > 0 {
                let _ = i2c.ic_data_cmd().read();
            }

            // RX_FULL once both bytes are in.
            i2c.ic_rx_tl().write(|w| w.rx_tl().bits(1));

            i2c.ic_data_cmd().write(|w| w.dat().bits(register));
            i2c.ic_data_cmd().write(|w| w.cmd().set_bit().restart().set_bit());
            i2c.ic_data_cmd().write(|w| w.cmd().set_bit().stop().set_bit());

            // Mask bits: 1 = interrupt enabled
            i2c.ic_intr_mask().write(|w| w.m_rx_full().set_bit().m_tx_abrt().set_bit());
        }
    }

    fn sample(&mut self) -> RawSample {
        critical_section::with(|cs| RawSample::new(SAMPLE.borrow(cs).get()))
    }
}

/// Services I2C0: captures the two data bytes or clears an abort.
///
/// Returns `None` for an interrupt that does not end a transfer.
pub fn i2c_interrupt() -> Option<Result<(), ErrorKind>> {
    unsafe {
        let i2c = &(*pac::I2C0::ptr());
        let status = i2c.ic_intr_stat().read();

        if status.r_tx_abrt().bit_is_set() {
            let source = i2c.ic_tx_abrt_source().read();
            let kind = if source.abrt_7b_addr_noack().bit_is_set() {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            } else if source.abrt_txdata_noack().bit_is_set() {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
            } else if source.arb_lost().bit_is_set() {
                ErrorKind::ArbitrationLoss
            } else {
                ErrorKind::Other
            };
            let _ = i2c.ic_clr_tx_abrt().read();
            i2c.ic_intr_mask().write(|w| w.bits(0));
            return Some(Err(kind));
        }

        if status.r_rx_full().bit_is_set() {
            let msb = i2c.ic_data_cmd().read().dat().bits();
            let lsb = i2c.ic_data_cmd().read().dat().bits();
            critical_section::with(|cs| SAMPLE.borrow(cs).set([msb, lsb]));
            i2c.ic_intr_mask().write(|w| w.bits(0));
            return Some(Ok(()));
        }
    }

    None
}

// --- Status line transmit (UART0 fed by DMA channel 0) ---

const DMA_CHANNEL: usize = 0;

/// DREQ number pacing writes to the UART0 TX FIFO.
const DREQ_UART0_TX: u8 = 28;

/// AHB, read and write error bits of a channel's CTRL register.
const DMA_ERROR_BITS: u32 = 0b111 << 29;

pub struct UartDma {
    _uart: UartBus,
}

impl UartDma {
    pub fn new(uart: UartBus) -> Self {
        unsafe {
            let dma = &(*pac::DMA::ptr());
            dma.inte0().modify(|r, w| w.bits(r.bits() | (1 << DMA_CHANNEL)));
        }
        Self { _uart: uart }
    }
}

impl SerialChannel for UartDma {
    fn start_transmit(&mut self, bytes: &[u8]) {
        // The controller keeps `bytes` untouched until DMA_IRQ_0 reports the
        // end of this transfer, so handing the raw address to the DMA is sound.
        unsafe {
            let dma = &(*pac::DMA::ptr());
            let uart = &(*pac::UART0::ptr());
            let ch = dma.ch(DMA_CHANNEL);

            ch.ch_read_addr().write(|w| w.bits(bytes.as_ptr() as u32));
            ch.ch_write_addr().write(|w| w.bits(uart.uartdr().as_ptr() as u32));
            ch.ch_trans_count().write(|w| w.bits(bytes.len() as u32));
            ch.ch_ctrl_trig().write(|w| {
                w.data_size()
                    .size_byte()
                    .incr_read()
                    .set_bit()
                    .incr_write()
                    .clear_bit()
                    .treq_sel()
                    .bits(DREQ_UART0_TX)
                    .chain_to()
                    .bits(DMA_CHANNEL as u8)
                    .en()
                    .set_bit()
            });
        }
    }
}

/// Acknowledges the DMA channel interrupt.
///
/// Returns `None` if channel 0 was not the source.
pub fn dma_interrupt() -> Option<TransferEvent> {
    unsafe {
        let dma = &(*pac::DMA::ptr());
        let mask = 1 << DMA_CHANNEL;

        if dma.ints0().read().bits() & mask == 0 {
            return None;
        }
        dma.ints0().write(|w| w.bits(mask));

        let ch = dma.ch(DMA_CHANNEL);
        if ch.ch_ctrl_trig().read().bits() & DMA_ERROR_BITS != 0 {
            // Error flags are write-one-to-clear; the alias does not retrigger.
            ch.ch_al1_ctrl().modify(|r, w| w.bits(r.bits() | DMA_ERROR_BITS));
            return Some(TransferEvent::Error);
        }
    }

    Some(TransferEvent::Complete)
}

// --- Rate button (GPIO14, falling edge) ---

static BUTTON: Mutex<RefCell<Option<ButtonPin>>> = Mutex::new(RefCell::new(None));

pub fn register_button(pin: ButtonPin) {
    critical_section::with(|cs| {
        BUTTON.borrow_ref_mut(cs).replace(pin);
    });
}

/// Acknowledges a button edge. Returns whether the button was the source.
pub fn button_interrupt() -> bool {
    critical_section::with(|cs| {
        let mut button = BUTTON.borrow_ref_mut(cs);
        match button.as_mut() {
            Some(pin) if pin.interrupt_status(hal::gpio::Interrupt::EdgeLow) => {
                pin.clear_interrupt(hal::gpio::Interrupt::EdgeLow);
                true
            }
            _ => false,
        }
    })
}
