//! Hardware Abstraction Module
//!
//! This module handles the low-level configuration of the RP2350 peripherals.
//! It encapsulates the setup of Clocks, PLLs, Timer alarm, GPIOs, I2C, UART
//! and DMA, exposing a `Hardware` struct to the main application.

use rp235x_hal as hal;
use hal::fugit::RateExtU32;
use hal::gpio::{FunctionI2C, FunctionUart, Pin, PullUp};
use hal::pac;
use hal::uart::{DataBits, StopBits, UartConfig, UartPeripheral};
use hal::Clock;

use crate::board::{ButtonPin, I2cBus, LedPin, UartBus};
use crate::usb_module;

/// External crystal frequency used by the Raspberry Pi Pico 2 W.
const XTAL_FREQ_HZ: u32 = 12_000_000u32;

/// Sensor bus clock.
const I2C_FREQ_HZ: u32 = 100_000;

/// Status line baud rate.
const UART_BAUD: u32 = 115_200;

/// Everything `main` needs after bring-up.
pub struct Hardware {
    pub led_pin: LedPin,
    pub button_pin: ButtonPin,
    pub alarm: hal::timer::Alarm0<hal::timer::CopyableTimer0>,
    pub i2c: I2cBus,
    pub uart: UartBus,
}

/// Initializes the entire hardware stack.
///
/// This function:
/// 1.  Takes ownership of the raw PAC peripherals.
/// 2.  Configures the Watchdog and Clocks (System & USB).
/// 3.  Initializes TIMER0 and claims alarm 0 for the sampling period.
/// 4.  Configures GPIO pins (LED, push button with falling-edge interrupt).
/// 5.  Sets up I2C0 for the temperature sensor.
/// 6.  Sets up UART0 with DMA requests enabled, and resets the DMA block.
/// 7.  Initializes the USB Serial telemetry module.
///
/// Interrupts stay masked in the NVIC; see [`unmask_interrupts`].
pub fn init() -> Hardware {
    // 1. Take ownership of raw peripherals
    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    // 2. Configure Clocks
    let clocks = hal::clocks::init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    // 3. Configure Timer alarm
    let mut timer = hal::Timer::new_timer0(pac.TIMER0, &mut pac.RESETS, &clocks);
    let alarm = timer.alarm_0().unwrap();

    // 4. Configure GPIOs
    let sio = hal::Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let led_pin = pins.gpio15.into_push_pull_output();

    let mut button_pin = pins.gpio14.into_pull_up_input();
    button_pin.set_interrupt_enabled(hal::gpio::Interrupt::EdgeLow, true);

    // 5. Configure I2C0 (GPIO4 = SDA, GPIO5 = SCL)
    let sda_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio4.reconfigure();
    let scl_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio5.reconfigure();
    let i2c = hal::I2C::i2c0(
        pac.I2C0,
        sda_pin,
        scl_pin,
        I2C_FREQ_HZ.Hz(),
        &mut pac.RESETS,
        &clocks.system_clock,
    );

    // 6. Configure UART0 (GPIO0 = TX, GPIO1 = RX) and DMA
    let uart_pins = (
        pins.gpio0.into_function::<FunctionUart>(),
        pins.gpio1.into_function::<FunctionUart>(),
    );
    let uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(UART_BAUD.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();

    unsafe {
        let uart_regs = &(*pac::UART0::ptr());
        // TX DMA request on
        uart_regs.uartdmacr().modify(|_, w| w.txdmae().set_bit());
    }

    // Bring the DMA block out of reset; channels are driven by register access.
    pac.RESETS.reset().modify(|_, w| w.dma().clear_bit());
    while pac.RESETS.reset_done().read().dma().bit_is_clear() {}

    // 7. Configure USB Serial (via module)
    usb_module::init(
        pac.USB,
        pac.USB_DPRAM,
        clocks.usb_clock,
        &mut pac.RESETS,
    );

    // Return ready-to-use hardware
    Hardware { led_pin, button_pin, alarm, i2c, uart }
}

/// Unmasks the four event interrupts in the NVIC.
///
/// Called after the controller has been initialized, so no event can fire
/// before its consumer exists.
pub fn unmask_interrupts() {
    unsafe {
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::TIMER0_IRQ_0);
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::I2C0_IRQ);
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::DMA_IRQ_0);
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
    }
}
